//! Wave-by-wave battle engine.
//!
//! One call to [`run_battle`] plays a single run of a resolved node. All
//! randomness comes from the run's [`RunRng`], so a run is a pure function of
//! its inputs and its seed.
use rand::Rng;
use smallvec::SmallVec;

use crate::constants::{
    CRIT_DAMAGE_MULTIPLIER, ELITE_ATTACK_MULTIPLIER, ELITE_HP_MULTIPLIER, MAX_ACTIONS_PER_TURN,
    MAX_STAT_VARIANCE_PCT, MAX_TURNS_PER_WAVE, MIN_PHYSICAL_DAMAGE, MITIGATION_SCALE, PERCENT_CAP,
};
use crate::context::MapModifiers;
use crate::data::MonsterTier;
use crate::error::RunAbandoned;
use crate::growth::PlayerBaseStats;
use crate::numbers::clamp_pct;
use crate::report::{SimulationRun, WaveSnapshot};
use crate::resolver::{ResolvedMonster, ResolvedNode, ResolvedWave};
use crate::rng::RunRng;

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    AwaitingWave(u32),
    InWave(u32),
    WaveCleared(u32),
    Cleared,
    Defeated,
}

impl RunPhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cleared | Self::Defeated)
    }
}

/// How a single wave ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaveOutcome {
    Cleared,
    PlayerDied,
    TurnLimit,
}

#[derive(Debug, Clone)]
struct Combatant {
    label: String,
    max_hp: f64,
    hp: f64,
    attack: f64,
    defense: f64,
    crit_rate: f64,
    lifesteal: f64,
    thorns: f64,
    elemental: f64,
    elemental_resist: f64,
    attack_speed: f64,
    gauge: f64,
}

impl Combatant {
    fn player(stats: &PlayerBaseStats) -> Self {
        Self {
            label: String::from("player"),
            max_hp: stats.hp,
            hp: stats.hp,
            attack: stats.attack,
            defense: stats.defense,
            crit_rate: stats.crit_rate,
            lifesteal: stats.lifesteal,
            thorns: stats.thorns,
            elemental: stats.elemental,
            elemental_resist: 0.0,
            attack_speed: stats.attack_speed,
            gauge: 0.0,
        }
    }

    fn alive(&self) -> bool {
        self.hp > 0.0
    }

    fn charge(&mut self) {
        self.gauge += self.attack_speed;
    }

    /// Spend whole gauge points, at most [`MAX_ACTIONS_PER_TURN`] per turn.
    fn take_actions(&mut self) -> u32 {
        let mut actions = 0;
        while self.gauge >= 1.0 && actions < MAX_ACTIONS_PER_TURN {
            self.gauge -= 1.0;
            actions += 1;
        }
        self.gauge = self.gauge.min(f64::from(MAX_ACTIONS_PER_TURN));
        actions
    }

    fn check(&self, run_index: u32) -> Result<(), RunAbandoned> {
        let abandon = |reason: String| RunAbandoned { run_index, reason };
        let stats = [
            self.max_hp,
            self.attack,
            self.defense,
            self.crit_rate,
            self.lifesteal,
            self.thorns,
            self.elemental,
            self.elemental_resist,
            self.attack_speed,
        ];
        if stats.iter().any(|value| !value.is_finite()) {
            return Err(abandon(format!("{} has non-finite stats", self.label)));
        }
        if self.max_hp <= 0.0 {
            return Err(abandon(format!(
                "{} has non-positive max hp ({})",
                self.label, self.max_hp
            )));
        }
        if self.attack < 0.0 || self.defense < 0.0 {
            return Err(abandon(format!(
                "{} has negative attack or defense",
                self.label
            )));
        }
        if self.attack_speed <= 0.0 {
            return Err(abandon(format!(
                "{} has non-positive attack speed ({})",
                self.label, self.attack_speed
            )));
        }
        Ok(())
    }
}

type Pack = SmallVec<[Combatant; 4]>;

/// Physical damage after defense, never below the floor.
#[must_use]
pub fn mitigated_damage(attack: f64, defense: f64) -> f64 {
    (attack * MITIGATION_SCALE / (MITIGATION_SCALE + defense.max(0.0))).max(MIN_PHYSICAL_DAMAGE)
}

/// Elemental damage left after the defender's resistance.
#[must_use]
pub fn resisted_elemental(elemental: f64, resist: f64) -> f64 {
    elemental.max(0.0) * (1.0 - clamp_pct(resist) / PERCENT_CAP)
}

/// One attack from `attacker` to `defender`: damage, then lifesteal, then thorns.
fn strike(attacker: &mut Combatant, defender: &mut Combatant, rng: &mut RunRng) {
    let mut physical = mitigated_damage(attacker.attack, defender.defense);
    let roll = rng.gen_range(0.0..PERCENT_CAP);
    if roll < clamp_pct(attacker.crit_rate) {
        physical *= CRIT_DAMAGE_MULTIPLIER;
    }
    let total = physical + resisted_elemental(attacker.elemental, defender.elemental_resist);

    let applied = total.min(defender.hp).max(0.0);
    defender.hp -= applied;

    let healed = applied * clamp_pct(attacker.lifesteal) / PERCENT_CAP;
    attacker.hp = (attacker.hp + healed).min(attacker.max_hp);

    // Reflected damage skips mitigation and does not chain.
    let reflected = applied * clamp_pct(defender.thorns) / PERCENT_CAP;
    attacker.hp = (attacker.hp - reflected).max(0.0);
}

fn spawn_wave(
    wave: &ResolvedWave,
    modifiers: Option<&MapModifiers>,
    run_index: u32,
    rng: &mut RunRng,
) -> Result<Pack, RunAbandoned> {
    if wave.monsters.is_empty() {
        return Err(RunAbandoned {
            run_index,
            reason: format!("wave '{}' has no monsters", wave.wave_id),
        });
    }
    wave.monsters
        .iter()
        .map(|monster| -> Result<Combatant, RunAbandoned> {
            let spawned = spawn_monster(monster, modifiers, rng);
            spawned.check(run_index)?;
            Ok(spawned)
        })
        .collect()
}

fn spawn_monster(
    monster: &ResolvedMonster,
    modifiers: Option<&MapModifiers>,
    rng: &mut RunRng,
) -> Combatant {
    let mut hp = monster.hp;
    let mut attack = monster.attack;
    let mut defense = monster.defense;

    if let Some(modifiers) = modifiers {
        let promote = rng.gen_bool(clamp_pct(modifiers.elite_chance_pct) / PERCENT_CAP);
        if promote && monster.tier == MonsterTier::Normal {
            hp *= ELITE_HP_MULTIPLIER;
            attack *= ELITE_ATTACK_MULTIPLIER;
        }
        let variance = modifiers.stat_variance_pct;
        if variance > 0.0 && variance.is_finite() {
            hp *= jitter(variance, rng);
            attack *= jitter(variance, rng);
            defense *= jitter(variance, rng);
        }
    }

    Combatant {
        label: format!("monster '{}'", monster.monster_id),
        max_hp: hp,
        hp,
        attack,
        defense,
        crit_rate: monster.traits.crit_rate,
        lifesteal: monster.traits.lifesteal,
        thorns: monster.traits.thorns,
        elemental: monster.traits.elemental,
        elemental_resist: monster.traits.elemental_resist,
        attack_speed: monster.traits.attack_speed,
        gauge: 0.0,
    }
}

fn jitter(variance: f64, rng: &mut RunRng) -> f64 {
    let band = variance.min(MAX_STAT_VARIANCE_PCT);
    1.0 + rng.gen_range(-band..=band) / PERCENT_CAP
}

/// Fight one wave to completion. Returns the outcome and the turns used.
fn fight_wave(player: &mut Combatant, monsters: &mut Pack, rng: &mut RunRng) -> (WaveOutcome, u32) {
    player.gauge = 0.0;
    for turn in 1..=MAX_TURNS_PER_WAVE {
        player.charge();
        for monster in monsters.iter_mut().filter(|m| m.alive()) {
            monster.charge();
        }

        for _ in 0..player.take_actions() {
            let Some(target) = monsters.iter_mut().find(|m| m.alive()) else {
                break;
            };
            strike(player, target, rng);
            if !player.alive() {
                return (WaveOutcome::PlayerDied, turn);
            }
        }
        if monsters.iter().all(|m| !m.alive()) {
            return (WaveOutcome::Cleared, turn);
        }

        for monster in monsters.iter_mut() {
            if !monster.alive() {
                continue;
            }
            for _ in 0..monster.take_actions() {
                strike(monster, player, rng);
                if !player.alive() {
                    return (WaveOutcome::PlayerDied, turn);
                }
                if !monster.alive() {
                    break;
                }
            }
        }
        if monsters.iter().all(|m| !m.alive()) {
            return (WaveOutcome::Cleared, turn);
        }
    }
    (WaveOutcome::TurnLimit, MAX_TURNS_PER_WAVE)
}

/// Play one full run of `node`.
///
/// # Errors
///
/// Returns [`RunAbandoned`] when the player or a spawned monster has unusable
/// stats, or a wave is empty. Waves already fought are discarded with it.
pub fn run_battle(
    node: &ResolvedNode,
    player_stats: &PlayerBaseStats,
    modifiers: Option<&MapModifiers>,
    run_index: u32,
    rng: &mut RunRng,
) -> Result<SimulationRun, RunAbandoned> {
    let mut player = Combatant::player(player_stats);
    player.check(run_index)?;

    let mut waves = Vec::with_capacity(node.waves.len());
    let mut total_turns: u32 = 0;
    let mut phase = RunPhase::AwaitingWave(0);

    while !phase.is_terminal() {
        phase = match phase {
            RunPhase::AwaitingWave(index) => {
                if node.waves.get(index as usize).is_some() {
                    RunPhase::InWave(index)
                } else {
                    RunPhase::Cleared
                }
            }
            RunPhase::InWave(index) => {
                let Some(wave) = node.waves.get(index as usize) else {
                    break;
                };
                let mut monsters = spawn_wave(wave, modifiers, run_index, rng)?;
                let (outcome, turns) = fight_wave(&mut player, &mut monsters, rng);
                total_turns = total_turns.saturating_add(turns);

                let survived = outcome == WaveOutcome::Cleared;
                waves.push(WaveSnapshot {
                    wave_id: wave.wave_id.clone(),
                    wave_label: wave.wave_label.clone(),
                    wave_index: wave.wave_index,
                    player_hp_remaining: if outcome == WaveOutcome::PlayerDied {
                        0.0
                    } else {
                        player.hp
                    },
                    player_hp_max: player.max_hp,
                    survived,
                });
                if survived {
                    RunPhase::WaveCleared(index)
                } else {
                    RunPhase::Defeated
                }
            }
            RunPhase::WaveCleared(index) => RunPhase::AwaitingWave(index + 1),
            RunPhase::Cleared | RunPhase::Defeated => phase,
        };
    }

    Ok(SimulationRun {
        won: phase == RunPhase::Cleared,
        total_turns,
        waves,
    })
}
