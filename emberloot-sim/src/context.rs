//! Draft state and the immutable simulation context built from it.
//!
//! [`SimulationDraftState`] belongs to whatever front end edits the form. The
//! engine only accepts [`SimulationContext`], and the only way to obtain one is
//! [`build_simulation_context`].
use serde::{Deserialize, Serialize};

use crate::data::StatGrowth;
use crate::growth::PlayerStatsOverride;

/// Baseline override as edited in the form: one base/adder pair per stat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineOverrideDraft {
    pub hp_base: f64,
    pub hp_adder: f64,
    pub atk_base: f64,
    pub atk_adder: f64,
    pub def_base: f64,
    pub def_adder: f64,
}

impl Default for BaselineOverrideDraft {
    fn default() -> Self {
        Self {
            hp_base: 40.0,
            hp_adder: 12.0,
            atk_base: 8.0,
            atk_adder: 2.0,
            def_base: 2.0,
            def_adder: 1.5,
        }
    }
}

/// Mutable, UI-owned form state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationDraftState {
    pub chapter_id: String,
    pub node_id: String,
    pub player_level: u32,
    pub stats_override: Option<PlayerStatsOverride>,
    pub hp_mult: f64,
    pub atk_mult: f64,
    pub def_mult: f64,
    pub use_baseline_override: bool,
    pub baseline_override: BaselineOverrideDraft,
    pub iterations: u32,
    pub seed: u64,
    pub hard_mode: bool,
    pub stat_variance_pct: f64,
    pub elite_chance_pct: f64,
}

impl Default for SimulationDraftState {
    fn default() -> Self {
        Self {
            chapter_id: String::from("ch1"),
            node_id: String::from("1-1"),
            player_level: 1,
            stats_override: None,
            hp_mult: 1.0,
            atk_mult: 1.0,
            def_mult: 1.0,
            use_baseline_override: false,
            baseline_override: BaselineOverrideDraft::default(),
            iterations: 100,
            seed: 0,
            hard_mode: false,
            stat_variance_pct: 0.0,
            elite_chance_pct: 0.0,
        }
    }
}

/// Player half of the context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSetup {
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_override: Option<PlayerStatsOverride>,
}

/// Multipliers applied to resolved monster stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapScale {
    pub hp_multiplier: f64,
    pub attack_multiplier: f64,
    pub defense_multiplier: f64,
}

impl Default for MapScale {
    fn default() -> Self {
        Self {
            hp_multiplier: 1.0,
            attack_multiplier: 1.0,
            defense_multiplier: 1.0,
        }
    }
}

/// Replacement growth laws for monster base stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaselineOverride {
    pub hp: StatGrowth,
    pub attack: StatGrowth,
    pub defense: StatGrowth,
}

/// Global switches. A zero `deterministic_seed` means "draw fresh entropy".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationFlags {
    pub deterministic_seed: u64,
    pub hard_mode: bool,
}

/// Per-run randomization of spawned monsters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapModifiers {
    /// Each spawned monster's hp/attack/defense is scaled by `1 ± U(0, v)%`.
    pub stat_variance_pct: f64,
    /// Chance that a spawned monster is promoted to an elite.
    pub elite_chance_pct: f64,
}

/// Immutable engine input.
///
/// Fields are private and the type cannot be deserialized, so no caller can
/// assemble one without going through [`build_simulation_context`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationContext {
    chapter_id: String,
    node_id: String,
    player: PlayerSetup,
    map_scale: MapScale,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline_override: Option<BaselineOverride>,
    iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<SimulationFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    map_modifiers: Option<MapModifiers>,
}

impl SimulationContext {
    #[must_use]
    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerSetup {
        &self.player
    }

    #[must_use]
    pub const fn map_scale(&self) -> &MapScale {
        &self.map_scale
    }

    #[must_use]
    pub const fn baseline_override(&self) -> Option<&BaselineOverride> {
        self.baseline_override.as_ref()
    }

    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    #[must_use]
    pub const fn flags(&self) -> Option<&SimulationFlags> {
        self.flags.as_ref()
    }

    #[must_use]
    pub const fn map_modifiers(&self) -> Option<&MapModifiers> {
        self.map_modifiers.as_ref()
    }

    /// The caller's seed, or 0 when the batch should draw its own.
    #[must_use]
    pub fn deterministic_seed(&self) -> u64 {
        self.flags.map_or(0, |flags| flags.deterministic_seed)
    }

    #[must_use]
    pub fn hard_mode(&self) -> bool {
        self.flags.is_some_and(|flags| flags.hard_mode)
    }
}

/// Translate draft state into an engine context. Purely structural: chapter
/// and node existence are checked later by the resolver.
#[must_use]
pub fn build_simulation_context(draft: &SimulationDraftState) -> SimulationContext {
    let baseline_override = draft.use_baseline_override.then(|| {
        let b = &draft.baseline_override;
        BaselineOverride {
            hp: StatGrowth::new(b.hp_base, b.hp_adder),
            attack: StatGrowth::new(b.atk_base, b.atk_adder),
            defense: StatGrowth::new(b.def_base, b.def_adder),
        }
    });

    let flags = (draft.seed != 0 || draft.hard_mode).then_some(SimulationFlags {
        deterministic_seed: draft.seed,
        hard_mode: draft.hard_mode,
    });

    let map_modifiers = (draft.stat_variance_pct != 0.0 || draft.elite_chance_pct != 0.0)
        .then_some(MapModifiers {
            stat_variance_pct: draft.stat_variance_pct,
            elite_chance_pct: draft.elite_chance_pct,
        });

    SimulationContext {
        chapter_id: draft.chapter_id.clone(),
        node_id: draft.node_id.clone(),
        player: PlayerSetup {
            level: draft.player_level,
            stats_override: draft.stats_override,
        },
        map_scale: MapScale {
            hp_multiplier: draft.hp_mult,
            attack_multiplier: draft.atk_mult,
            defense_multiplier: draft.def_mult,
        },
        baseline_override,
        iterations: draft.iterations,
        flags,
        map_modifiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_baseline_override_is_absent() {
        let draft = SimulationDraftState {
            use_baseline_override: false,
            baseline_override: BaselineOverrideDraft {
                hp_base: 1.0,
                ..BaselineOverrideDraft::default()
            },
            ..SimulationDraftState::default()
        };
        let ctx = build_simulation_context(&draft);
        assert!(ctx.baseline_override().is_none());

        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("baselineOverride").is_none());
    }

    #[test]
    fn enabled_baseline_override_maps_pairs() {
        let draft = SimulationDraftState {
            use_baseline_override: true,
            baseline_override: BaselineOverrideDraft {
                hp_base: 1.0,
                hp_adder: 0.5,
                atk_base: 2.0,
                atk_adder: 0.25,
                def_base: 3.0,
                def_adder: 0.0,
            },
            ..SimulationDraftState::default()
        };
        let ctx = build_simulation_context(&draft);
        let over = ctx.baseline_override().copied().unwrap();
        assert_eq!(over.hp, StatGrowth::new(1.0, 0.5));
        assert_eq!(over.attack, StatGrowth::new(2.0, 0.25));
        assert_eq!(over.defense, StatGrowth::new(3.0, 0.0));
    }

    #[test]
    fn multipliers_are_renamed_semantically() {
        let draft = SimulationDraftState {
            hp_mult: 2.0,
            atk_mult: 0.5,
            def_mult: 1.5,
            player_level: 9,
            iterations: 25,
            ..SimulationDraftState::default()
        };
        let ctx = build_simulation_context(&draft);
        assert_eq!(
            *ctx.map_scale(),
            MapScale {
                hp_multiplier: 2.0,
                attack_multiplier: 0.5,
                defense_multiplier: 1.5,
            }
        );
        assert_eq!(ctx.player().level, 9);
        assert_eq!(ctx.iterations(), 25);

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["mapScale"]["hpMultiplier"], 2.0);
        assert!(json.get("hpMult").is_none());
    }

    #[test]
    fn flags_and_modifiers_only_when_set() {
        let ctx = build_simulation_context(&SimulationDraftState::default());
        assert!(ctx.flags().is_none());
        assert!(ctx.map_modifiers().is_none());
        assert_eq!(ctx.deterministic_seed(), 0);
        assert!(!ctx.hard_mode());

        let draft = SimulationDraftState {
            seed: 42,
            elite_chance_pct: 10.0,
            ..SimulationDraftState::default()
        };
        let ctx = build_simulation_context(&draft);
        assert_eq!(ctx.deterministic_seed(), 42);
        assert!(!ctx.hard_mode());
        let modifiers = ctx.map_modifiers().copied().unwrap();
        assert!((modifiers.elite_chance_pct - 10.0).abs() < f64::EPSILON);
        assert!(modifiers.stat_variance_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn builder_is_pure() {
        let draft = SimulationDraftState {
            stats_override: Some(PlayerStatsOverride {
                hp: Some(5.0),
                ..PlayerStatsOverride::default()
            }),
            ..SimulationDraftState::default()
        };
        assert_eq!(
            build_simulation_context(&draft),
            build_simulation_context(&draft)
        );
    }

    #[test]
    fn draft_deserializes_with_defaults() {
        let draft: SimulationDraftState =
            serde_json::from_str(r#"{ "node_id": "1-2", "hp_mult": 2.0 }"#).unwrap();
        assert_eq!(draft.chapter_id, "ch1");
        assert_eq!(draft.node_id, "1-2");
        assert!((draft.hp_mult - 2.0).abs() < f64::EPSILON);
        assert!((draft.atk_mult - 1.0).abs() < f64::EPSILON);
        assert_eq!(draft.iterations, 100);
    }
}
