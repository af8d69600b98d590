//! Static policy catalog.
//!
//! Each [`PolicyCategory`] offers a fixed set of options. An option carries
//! a list of additive effects on stats or on gold income. The catalog is
//! compiled in and never mutated at runtime.

use std::collections::BTreeMap;

use serde::Serialize;
use sovereign_types::{EffectTarget, PolicyCategory};

use crate::error::PolicyError;

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// One signed modifier applied while an option is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyEffect {
    /// What the effect modifies.
    pub target: EffectTarget,
    /// Signed amount. Percentage points for [`EffectTarget::GoldIncome`].
    pub delta: i64,
}

/// A selectable option within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyOption {
    /// Stored option key.
    pub key: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Modifiers applied while active.
    pub effects: &'static [PolicyEffect],
}

/// A policy category with its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyDefinition {
    /// The category.
    pub category: PolicyCategory,
    /// Display label.
    pub label: &'static str,
    /// Key of the neutral option used for new nations and unknown values.
    pub default_option: &'static str,
    /// Available options.
    pub options: &'static [PolicyOption],
}

impl PolicyDefinition {
    /// Look up an option by key.
    pub fn option(&self, key: &str) -> Option<&'static PolicyOption> {
        self.options.iter().find(|o| o.key == key)
    }
}

const fn effect(target: EffectTarget, delta: i64) -> PolicyEffect {
    PolicyEffect { target, delta }
}

// ---------------------------------------------------------------------------
// Catalog content
// ---------------------------------------------------------------------------

static TAX: PolicyDefinition = PolicyDefinition {
    category: PolicyCategory::Tax,
    label: "조세 정책 (Taxation)",
    default_option: "standard",
    options: &[
        PolicyOption {
            key: "low",
            label: "감세 (Low)",
            description: "민심을 달래고 성장을 촉진합니다.",
            effects: &[
                effect(EffectTarget::Stability, 10),
                effect(EffectTarget::Happiness, 10),
                effect(EffectTarget::GoldIncome, -20),
            ],
        },
        PolicyOption {
            key: "standard",
            label: "표준 (Standard)",
            description: "균형 잡힌 예산 운용입니다.",
            effects: &[],
        },
        PolicyOption {
            key: "heavy",
            label: "중과세 (Heavy)",
            description: "국고를 채우지만 불만이 고조됩니다.",
            effects: &[
                effect(EffectTarget::Stability, -10),
                effect(EffectTarget::GoldIncome, 20),
            ],
        },
        PolicyOption {
            key: "plunder",
            label: "수탈 (Plunder)",
            description: "극한의 징수입니다. 장기적으로 국가를 파괴합니다.",
            effects: &[
                effect(EffectTarget::Stability, -30),
                effect(EffectTarget::Legitimacy, -20),
                effect(EffectTarget::GoldIncome, 50),
            ],
        },
    ],
};

static CONSCRIPTION: PolicyDefinition = PolicyDefinition {
    category: PolicyCategory::Conscription,
    label: "징병 제도 (Conscription)",
    default_option: "volunteer",
    options: &[
        PolicyOption {
            key: "none",
            label: "모병제 (Volunteer)",
            description: "직업 군인 위주입니다. 정예하지만 수가 적습니다.",
            effects: &[
                effect(EffectTarget::Military, 5),
                effect(EffectTarget::Manpower, -20),
            ],
        },
        PolicyOption {
            key: "volunteer",
            label: "민병대 (Militia)",
            description: "지역 방위를 위한 최소한의 무장입니다.",
            effects: &[effect(EffectTarget::AdminCap, 5)],
        },
        PolicyOption {
            key: "conscript",
            label: "징병제 (Conscript)",
            description: "다수의 시민을 군인으로 전환합니다.",
            effects: &[
                effect(EffectTarget::Military, 20),
                effect(EffectTarget::Happiness, -10),
            ],
        },
        PolicyOption {
            key: "total_war",
            label: "총동원령 (Total War)",
            description: "국가의 모든 역량을 전쟁에 쏟습니다.",
            effects: &[
                effect(EffectTarget::Military, 50),
                effect(EffectTarget::Economy, -30),
            ],
        },
    ],
};

static ECONOMY: PolicyDefinition = PolicyDefinition {
    category: PolicyCategory::Economy,
    label: "경제 체제 (Economy)",
    default_option: "mixed",
    options: &[
        PolicyOption {
            key: "planned",
            label: "계획 경제 (Planned)",
            description: "국가가 생산을 통제합니다.",
            effects: &[
                effect(EffectTarget::AdminCap, -10),
                effect(EffectTarget::Stability, 5),
            ],
        },
        PolicyOption {
            key: "mixed",
            label: "혼합 경제 (Mixed)",
            description: "시장과 국가의 조화입니다.",
            effects: &[],
        },
        PolicyOption {
            key: "market",
            label: "자유 시장 (Market)",
            description: "이윤 추구를 장려합니다.",
            effects: &[
                effect(EffectTarget::Economy, 20),
                effect(EffectTarget::Corruption, 10),
            ],
        },
    ],
};

static BORDER: PolicyDefinition = PolicyDefinition {
    category: PolicyCategory::Border,
    label: "국경 정책 (Border)",
    default_option: "regulated",
    options: &[
        PolicyOption {
            key: "open",
            label: "개방 (Open)",
            description: "자유로운 이동을 허용합니다.",
            effects: &[
                effect(EffectTarget::Culture, 10),
                effect(EffectTarget::Security, -10),
            ],
        },
        PolicyOption {
            key: "regulated",
            label: "검문 (Regulated)",
            description: "적절한 통제를 실시합니다.",
            effects: &[],
        },
        PolicyOption {
            key: "closed",
            label: "폐쇄 (Closed)",
            description: "외부와의 접촉을 차단합니다.",
            effects: &[
                effect(EffectTarget::Security, 20),
                effect(EffectTarget::Diplomacy, -20),
            ],
        },
    ],
};

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// The catalog entry for a category.
pub const fn definition(category: PolicyCategory) -> &'static PolicyDefinition {
    match category {
        PolicyCategory::Tax => &TAX,
        PolicyCategory::Conscription => &CONSCRIPTION,
        PolicyCategory::Economy => &ECONOMY,
        PolicyCategory::Border => &BORDER,
    }
}

/// Every catalog entry, in category order.
pub fn catalog() -> [&'static PolicyDefinition; 4] {
    PolicyCategory::ALL.map(definition)
}

/// Effects of one option.
pub fn effects_for(
    category: PolicyCategory,
    option_key: &str,
) -> Result<&'static [PolicyEffect], PolicyError> {
    definition(category)
        .option(option_key)
        .map(|o| o.effects)
        .ok_or_else(|| PolicyError::UnknownPolicy {
            category: category.as_str().to_owned(),
            option: option_key.to_owned(),
        })
}

/// Effects of one option, with the category given by its wire name.
pub fn effects_for_name(
    category: &str,
    option_key: &str,
) -> Result<&'static [PolicyEffect], PolicyError> {
    let parsed = PolicyCategory::parse(category).ok_or_else(|| PolicyError::UnknownPolicy {
        category: category.to_owned(),
        option: option_key.to_owned(),
    })?;
    effects_for(parsed, option_key)
}

/// The neutral option for every category, as stored on a new nation.
pub fn default_policies() -> BTreeMap<PolicyCategory, String> {
    PolicyCategory::ALL
        .into_iter()
        .map(|c| (c, definition(c).default_option.to_owned()))
        .collect()
}

/// Sum the effects of every active option per target.
///
/// Only categories present in `policies` contribute. An unrecognized stored
/// option contributes its category's neutral option instead.
pub fn aggregate_modifiers(
    policies: &BTreeMap<PolicyCategory, String>,
) -> BTreeMap<EffectTarget, i64> {
    let mut totals = BTreeMap::new();
    for (&category, chosen) in policies {
        let effects = effects_for(category, chosen).unwrap_or_else(|err| {
            tracing::debug!(%category, option = %chosen, error = %err, "falling back to default policy");
            let def = definition(category);
            def.option(def.default_option)
                .map(|o| o.effects)
                .unwrap_or_default()
        });
        for e in effects {
            let entry = totals.entry(e.target).or_insert(0_i64);
            *entry = entry.saturating_add(e.delta);
        }
    }
    totals
}
