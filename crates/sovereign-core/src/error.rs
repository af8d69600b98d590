//! Error taxonomy for engine operations.
//!
//! Four classes reach callers:
//!
//! - [`ConquestError::Validation`] -- malformed input, caught before any
//!   transaction starts.
//! - [`ConquestError::Rejected`] -- the game state does not allow the
//!   action. Expected and user-facing; never an incident.
//! - [`ConquestError::ConflictRetry`] -- the transaction kept losing races
//!   and the retry budget ran out.
//! - [`ConquestError::StoreUnavailable`] -- the store failed. The only
//!   class that is an operational incident.
//!
//! [`ConquestError::Conflict`] is internal to the retry loop and is turned
//! into a retry or into `ConflictRetry` before leaving the engine.

use chrono::{DateTime, Utc};
use sovereign_economy::PolicyError;
use sovereign_world::WorldError;

use crate::store::StoreError;

/// A named game rule that refused an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The acting nation does not exist.
    #[error("nation not found")]
    NationNotFound,

    /// The acting nation has fallen and can no longer act.
    #[error("nation has fallen")]
    NationFallen,

    /// Not enough gold for the action.
    #[error("insufficient gold: need {required}, have {available}")]
    InsufficientGold {
        /// Gold the action costs.
        required: i64,
        /// Gold on hand.
        available: i64,
    },

    /// The target cell does not exist.
    #[error("cell not found")]
    CellNotFound,

    /// Ocean cells cannot be owned.
    #[error("cell is ocean")]
    OceanCell,

    /// The cell already has an owner.
    #[error("cell already owned")]
    AlreadyOwned,

    /// The target does not touch any cell the actor owns.
    #[error("target is not adjacent to the actor's territory")]
    NotAdjacent,

    /// Attacks need an owned target; unowned land must be claimed.
    #[error("target cell is unowned")]
    TargetUnowned,

    /// A nation cannot attack its own cell.
    #[error("target cell is the actor's own territory")]
    OwnTerritory,

    /// Not enough energy or food to launch an attack.
    #[error("insufficient supplies: need {energy_required} energy and {food_required} food")]
    InsufficientSupplies {
        /// Energy the attack costs.
        energy_required: i64,
        /// Food the attack costs.
        food_required: i64,
    },

    /// The defending nation is missing or has already fallen.
    #[error("defender unavailable")]
    DefenderUnavailable,

    /// The defender is protected until the given instant.
    #[error("defender shielded until {until}")]
    ShieldActive {
        /// When the shield expires.
        until: DateTime<Utc>,
    },

    /// The requested policy option does not exist.
    #[error("unknown policy option `{option}` in category `{category}`")]
    UnknownPolicy {
        /// Requested category.
        category: String,
        /// Requested option key.
        option: String,
    },

    /// The player already founded a nation.
    #[error("nation already exists for this player")]
    NationExists,

    /// No free land cell could be found for a new capital.
    #[error("no free capital site found")]
    NoCapitalSite,
}

impl Rejection {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NationNotFound => "nation_not_found",
            Self::NationFallen => "nation_dead",
            Self::InsufficientGold { .. } => "insufficient_gold",
            Self::CellNotFound => "cell_not_found",
            Self::OceanCell => "ocean_cell",
            Self::AlreadyOwned => "already_owned",
            Self::NotAdjacent => "not_adjacent",
            Self::TargetUnowned => "target_unowned",
            Self::OwnTerritory => "own_territory",
            Self::InsufficientSupplies { .. } => "insufficient_resources",
            Self::DefenderUnavailable => "defender_unavailable",
            Self::ShieldActive { .. } => "shield_active",
            Self::UnknownPolicy { .. } => "unknown_policy",
            Self::NationExists => "nation_exists",
            Self::NoCapitalSite => "no_capital_site",
        }
    }

    /// Message shown to the player.
    pub fn user_message(&self) -> String {
        match self {
            Self::NationNotFound => "국가 정보가 없습니다.".to_owned(),
            Self::NationFallen => "이미 멸망한 국가입니다.".to_owned(),
            Self::InsufficientGold { required, .. } => {
                format!("국고가 부족합니다. (필요: {required}G)")
            }
            Self::CellNotFound => "존재하지 않는 타일입니다.".to_owned(),
            Self::OceanCell => "바다는 점유할 수 없습니다.".to_owned(),
            Self::AlreadyOwned => "이미 주인이 있는 영토입니다.".to_owned(),
            Self::NotAdjacent => "인접한 영토를 통해서만 진출할 수 있습니다.".to_owned(),
            Self::TargetUnowned => {
                "주인이 없는 땅입니다. (공격 대신 '개척'을 하세요)".to_owned()
            }
            Self::OwnTerritory => "자신의 땅을 공격할 수 없습니다.".to_owned(),
            Self::InsufficientSupplies { .. } => {
                "공격에 필요한 보급품(에너지/식량)이 부족합니다.".to_owned()
            }
            Self::DefenderUnavailable => "방어자 국가 정보 오류".to_owned(),
            Self::ShieldActive { .. } => {
                "상대 국가가 보호막 가동 중입니다. 다른 영토를 노리세요.".to_owned()
            }
            Self::UnknownPolicy { .. } => "존재하지 않는 정책입니다.".to_owned(),
            Self::NationExists => "이미 건국한 국가가 있습니다.".to_owned(),
            Self::NoCapitalSite => "수도를 세울 빈 땅을 찾지 못했습니다.".to_owned(),
        }
    }
}

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum ConquestError {
    /// The request was malformed.
    #[error("invalid request: {message}")]
    Validation {
        /// What was wrong.
        message: String,
    },

    /// A game rule refused the action. No state changed.
    #[error("rejected: {0}")]
    Rejected(Rejection),

    /// A single attempt lost a race. Retried by the transaction runner.
    #[error("transaction conflict on `{key}`")]
    Conflict {
        /// The document that moved.
        key: String,
    },

    /// Every attempt lost a race.
    #[error("transaction conflicted {attempts} times; try again")]
    ConflictRetry {
        /// Attempts made.
        attempts: u32,
    },

    /// The store could not serve the request.
    #[error("store unavailable: {message}")]
    StoreUnavailable {
        /// Backend description.
        message: String,
    },
}

impl ConquestError {
    /// The rejection, if this is one.
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Rejection> for ConquestError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<StoreError> for ConquestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { key } => Self::Conflict { key },
            other @ (StoreError::Unavailable { .. } | StoreError::Corrupt { .. }) => {
                Self::StoreUnavailable {
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<PolicyError> for ConquestError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::UnknownPolicy { category, option } => {
                Self::Rejected(Rejection::UnknownPolicy { category, option })
            }
        }
    }
}

impl From<WorldError> for ConquestError {
    fn from(err: WorldError) -> Self {
        Self::Validation {
            message: err.to_string(),
        }
    }
}
