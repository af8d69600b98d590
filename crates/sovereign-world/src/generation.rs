//! Bulk world generation.
//!
//! A world is a `size x size` square of cells. Land forms a rough continent
//! around the centre: each cell's distance from the centre is normalized by
//! the half-diagonal, and the cell becomes ocean when that ratio exceeds a
//! jittered sea threshold. Every generated cell starts unowned.

use rand::Rng;
use sovereign_types::{Cell, CellCoord, CellResource, CellType};

use crate::error::WorldError;

/// Largest supported map edge length.
pub const MAX_WORLD_SIZE: u32 = 200;

/// Normalized distance beyond which cells start turning to ocean.
const SEA_THRESHOLD: f64 = 0.45;

/// Upper bound (exclusive) of the random jitter added to [`SEA_THRESHOLD`].
const SEA_JITTER: f64 = 0.15;

/// Generate every cell of a `size x size` world.
///
/// Cells are returned row by row. Ocean cells carry [`CellResource::None`];
/// land cells are [`CellType::Plains`] with [`CellResource::Food`].
pub fn generate_world(size: u32, rng: &mut impl Rng) -> Result<Vec<Cell>, WorldError> {
    if size == 0 || size > MAX_WORLD_SIZE {
        return Err(WorldError::InvalidSize {
            size,
            max: MAX_WORLD_SIZE,
        });
    }
    let edge = i32::try_from(size).map_err(|_overflow| WorldError::InvalidSize {
        size,
        max: MAX_WORLD_SIZE,
    })?;

    let center = f64::from(size) / 2.0;
    let max_dist = std::f64::consts::SQRT_2 * center;

    let mut cells = Vec::with_capacity(usize::try_from(size.saturating_mul(size)).unwrap_or(0));
    for row in 0..edge {
        for col in 0..edge {
            let dx = f64::from(col) - center;
            let dy = f64::from(row) - center;
            let dist = dx.hypot(dy) / max_dist;
            let threshold = SEA_THRESHOLD + rng.random_range(0.0..SEA_JITTER);

            let coord = CellCoord::new(col, row);
            let cell = if dist > threshold {
                Cell::unowned(coord, CellType::Ocean, CellResource::None)
            } else {
                Cell::unowned(coord, CellType::Plains, CellResource::Food)
            };
            cells.push(cell);
        }
    }

    let land = cells.iter().filter(|c| !c.is_ocean()).count();
    tracing::debug!(size, land, total = cells.len(), "generated world");
    Ok(cells)
}

/// Whether `coord` lies inside a `size x size` world.
pub fn in_bounds(coord: CellCoord, size: u32) -> bool {
    let Ok(edge) = i32::try_from(size) else {
        return false;
    };
    (0..edge).contains(&coord.col) && (0..edge).contains(&coord.row)
}
