//! Centralized balance and tuning constants for the Emberloot battle simulator.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that combat balance can only be adjusted via
//! code changes reviewed in version control, rather than through the JSON
//! catalog.

// Player growth law --------------------------------------------------------
pub(crate) const PLAYER_HP_BASE: f64 = 100.0;
pub(crate) const PLAYER_HP_PER_LEVEL: f64 = 20.0;
pub(crate) const PLAYER_ATTACK_BASE: f64 = 10.0;
pub(crate) const PLAYER_ATTACK_PER_LEVEL: f64 = 3.0;
pub(crate) const PLAYER_DEFENSE_BASE: f64 = 5.0;
pub(crate) const PLAYER_DEFENSE_PER_LEVEL: f64 = 2.0;
pub(crate) const PLAYER_CRIT_RATE_BASE: f64 = 5.0;
pub(crate) const PLAYER_LIFESTEAL_BASE: f64 = 0.0;
pub(crate) const PLAYER_THORNS_BASE: f64 = 0.0;
pub(crate) const PLAYER_ELEMENTAL_BASE: f64 = 0.0;
pub(crate) const PLAYER_ATTACK_SPEED_BASE: f64 = 1.0;

// Damage resolution --------------------------------------------------------
/// Defense needed to halve incoming physical damage.
pub(crate) const MITIGATION_SCALE: f64 = 100.0;
pub(crate) const MIN_PHYSICAL_DAMAGE: f64 = 1.0;
pub(crate) const CRIT_DAMAGE_MULTIPLIER: f64 = 1.5;
pub(crate) const PERCENT_CAP: f64 = 100.0;

// Turn loop ----------------------------------------------------------------
pub(crate) const MAX_TURNS_PER_WAVE: u32 = 1_000;
pub(crate) const MAX_ACTIONS_PER_TURN: u32 = 4;

// Resolver layers ----------------------------------------------------------
pub(crate) const HARD_MODE_HP_MULTIPLIER: f64 = 1.25;
pub(crate) const HARD_MODE_ATTACK_MULTIPLIER: f64 = 1.25;
pub(crate) const ELITE_HP_MULTIPLIER: f64 = 1.5;
pub(crate) const ELITE_ATTACK_MULTIPLIER: f64 = 1.2;
/// Widest spawn jitter band, in percent either side of the resolved stat.
pub(crate) const MAX_STAT_VARIANCE_PCT: f64 = 1_000.0;

// Batch limits -------------------------------------------------------------
pub(crate) const MAX_ITERATIONS: u32 = 100_000;
#[cfg(feature = "async")]
pub(crate) const YIELD_EVERY_RUNS: u32 = 10;
pub(crate) const RUN_SEED_DOMAIN: &[u8] = b"run";
