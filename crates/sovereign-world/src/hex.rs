//! Offset-coordinate hex geometry.
//!
//! Cells are addressed by `(col, row)` in an "even-r" offset layout: even
//! rows sit half a cell to the right of odd rows. The six neighbors of a cell
//! therefore depend on the parity of its row. Parity uses the Euclidean
//! remainder so negative rows follow the same alternation as positive ones.
//!
//! All functions here are total over every integer coordinate pair.

use sovereign_types::CellCoord;

/// Edge-to-centre radius of a hex, in pixels.
pub const HEX_SIZE: f64 = 28.0;

/// `(dcol, drow)` offsets for cells on even rows.
const EVEN_ROW_OFFSETS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (0, 1), (1, 1)];

/// `(dcol, drow)` offsets for cells on odd rows.
const ODD_ROW_OFFSETS: [(i32, i32); 6] = [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)];

/// Whether a row is even under Euclidean parity.
const fn is_even_row(row: i32) -> bool {
    row.rem_euclid(2) == 0
}

/// The six cells touching `cell`.
///
/// Coordinates wrap at the `i32` boundary instead of overflowing, so the
/// function never panics; the game map is far smaller than that range.
pub fn neighbors(cell: CellCoord) -> [CellCoord; 6] {
    let offsets = if is_even_row(cell.row) {
        EVEN_ROW_OFFSETS
    } else {
        ODD_ROW_OFFSETS
    };
    offsets.map(|(dc, dr)| CellCoord::new(cell.col.wrapping_add(dc), cell.row.wrapping_add(dr)))
}

/// True iff `b` is one of the six neighbors of `a`.
pub fn is_adjacent(a: CellCoord, b: CellCoord) -> bool {
    neighbors(a).contains(&b)
}

/// Centre of `cell` in pixel space, for pointy-top hexes of [`HEX_SIZE`].
///
/// Even rows are shifted half a hex width to the right, matching the
/// neighbor offsets, so adjacent cells touch without gaps.
pub fn to_pixel(cell: CellCoord) -> (f64, f64) {
    let width = HEX_SIZE * 3.0_f64.sqrt();
    let shift = if is_even_row(cell.row) { 0.5 } else { 0.0 };
    let x = width * (f64::from(cell.col) + shift);
    let y = HEX_SIZE * 1.5 * f64::from(cell.row);
    (x, y)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn sample_coords() -> Vec<CellCoord> {
        let mut coords = Vec::new();
        for row in -4..=4 {
            for col in -4..=4 {
                coords.push(CellCoord::new(col, row));
            }
        }
        coords.push(CellCoord::new(i32::MAX, i32::MAX));
        coords.push(CellCoord::new(i32::MIN, i32::MIN));
        coords
    }

    #[test]
    fn six_distinct_neighbors_everywhere() {
        for cell in sample_coords() {
            let set: BTreeSet<_> = neighbors(cell).into_iter().collect();
            assert_eq!(set.len(), 6, "cell {cell}");
            assert!(!set.contains(&cell), "cell {cell} neighbors itself");
        }
    }

    #[test]
    fn parity_changes_the_offset_set() {
        let even = neighbors(CellCoord::new(0, 0));
        let odd = neighbors(CellCoord::new(0, 1));
        let even_offsets: BTreeSet<_> = even.iter().map(|c| (c.col, c.row)).collect();
        let odd_offsets: BTreeSet<_> = odd.iter().map(|c| (c.col, c.row - 1)).collect();
        assert_ne!(even_offsets, odd_offsets);
    }

    #[test]
    fn negative_rows_alternate_like_positive_rows() {
        // Row -1 is odd, so it uses the odd offsets.
        let cell = CellCoord::new(3, -1);
        assert!(is_adjacent(cell, CellCoord::new(2, -2)));
        assert!(!is_adjacent(cell, CellCoord::new(4, -2)));
        // Row -2 is even.
        let cell = CellCoord::new(3, -2);
        assert!(is_adjacent(cell, CellCoord::new(4, -3)));
        assert!(!is_adjacent(cell, CellCoord::new(2, -3)));
    }

    #[test]
    fn adjacency_is_symmetric() {
        let coords = sample_coords();
        for &a in &coords {
            for &b in &coords {
                assert_eq!(is_adjacent(a, b), is_adjacent(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn neighbor_centres_are_one_hex_width_apart() {
        let width = HEX_SIZE * 3.0_f64.sqrt();
        for cell in sample_coords().into_iter().filter(|c| c.row.unsigned_abs() < 100) {
            let (x0, y0) = to_pixel(cell);
            for n in neighbors(cell) {
                let (x1, y1) = to_pixel(n);
                let dist = (x1 - x0).hypot(y1 - y0);
                assert!((dist - width).abs() < 1e-9, "{cell} -> {n}: {dist}");
            }
        }
    }

    #[test]
    fn to_pixel_is_deterministic() {
        let cell = CellCoord::new(5, 2);
        let (x1, y1) = to_pixel(cell);
        let (x2, y2) = to_pixel(cell);
        assert!((x1 - x2).abs() < f64::EPSILON);
        assert!((y1 - y2).abs() < f64::EPSILON);
        assert!((y1 - 84.0).abs() < 1e-9);
    }
}
