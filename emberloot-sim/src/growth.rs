//! Player growth formula.
//!
//! This module is the only place the player's level curve is written down.
//! Display code and the battle engine both go through [`calc_display_stats`];
//! nothing else in the crate may rebuild these numbers by hand.

use serde::{Deserialize, Serialize};

use crate::constants::{
    PLAYER_ATTACK_BASE, PLAYER_ATTACK_PER_LEVEL, PLAYER_ATTACK_SPEED_BASE, PLAYER_CRIT_RATE_BASE,
    PLAYER_DEFENSE_BASE, PLAYER_DEFENSE_PER_LEVEL, PLAYER_ELEMENTAL_BASE, PLAYER_HP_BASE,
    PLAYER_HP_PER_LEVEL, PLAYER_LIFESTEAL_BASE, PLAYER_THORNS_BASE,
};
use crate::numbers::count_to_f64;

/// Player attributes derived from level.
///
/// Rate-like stats (`crit_rate`, `lifesteal`, `thorns`) are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBaseStats {
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub crit_rate: f64,
    pub lifesteal: f64,
    pub thorns: f64,
    pub elemental: f64,
    pub attack_speed: f64,
}

/// Partial stat record; any present field replaces the formula value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifesteal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thorns: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elemental: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_speed: Option<f64>,
}

impl PlayerStatsOverride {
    /// Present fields paired with their names, for validation messages.
    #[must_use]
    pub fn present_fields(&self) -> Vec<(&'static str, f64)> {
        [
            ("hp", self.hp),
            ("attack", self.attack),
            ("defense", self.defense),
            ("critRate", self.crit_rate),
            ("lifesteal", self.lifesteal),
            ("thorns", self.thorns),
            ("elemental", self.elemental),
            ("attackSpeed", self.attack_speed),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

fn level_steps(level: u32) -> f64 {
    count_to_f64(level.max(1) - 1)
}

/// Base HP at `level`. Level 0 is treated as level 1.
#[must_use]
pub fn calc_base_hp(level: u32) -> f64 {
    PLAYER_HP_PER_LEVEL.mul_add(level_steps(level), PLAYER_HP_BASE)
}

/// Base attack at `level`.
#[must_use]
pub fn calc_base_attack(level: u32) -> f64 {
    PLAYER_ATTACK_PER_LEVEL.mul_add(level_steps(level), PLAYER_ATTACK_BASE)
}

/// Base defense at `level`.
#[must_use]
pub fn calc_base_defense(level: u32) -> f64 {
    PLAYER_DEFENSE_PER_LEVEL.mul_add(level_steps(level), PLAYER_DEFENSE_BASE)
}

/// Full baseline stat block for `level`.
#[must_use]
pub fn calc_player_base_stats(level: u32) -> PlayerBaseStats {
    PlayerBaseStats {
        hp: calc_base_hp(level),
        attack: calc_base_attack(level),
        defense: calc_base_defense(level),
        crit_rate: PLAYER_CRIT_RATE_BASE,
        lifesteal: PLAYER_LIFESTEAL_BASE,
        thorns: PLAYER_THORNS_BASE,
        elemental: PLAYER_ELEMENTAL_BASE,
        attack_speed: PLAYER_ATTACK_SPEED_BASE,
    }
}

/// Apply an optional override field by field; missing fields pass through.
#[must_use]
pub fn apply_player_override(
    base: PlayerBaseStats,
    stats_override: Option<&PlayerStatsOverride>,
) -> PlayerBaseStats {
    let Some(o) = stats_override else {
        return base;
    };
    PlayerBaseStats {
        hp: o.hp.unwrap_or(base.hp),
        attack: o.attack.unwrap_or(base.attack),
        defense: o.defense.unwrap_or(base.defense),
        crit_rate: o.crit_rate.unwrap_or(base.crit_rate),
        lifesteal: o.lifesteal.unwrap_or(base.lifesteal),
        thorns: o.thorns.unwrap_or(base.thorns),
        elemental: o.elemental.unwrap_or(base.elemental),
        attack_speed: o.attack_speed.unwrap_or(base.attack_speed),
    }
}

/// Stats shown to the player and fed to the battle engine.
#[must_use]
pub fn calc_display_stats(
    level: u32,
    stats_override: Option<&PlayerStatsOverride>,
) -> PlayerBaseStats {
    apply_player_override(calc_player_base_stats(level), stats_override)
}
