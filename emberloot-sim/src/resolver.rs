//! Configuration resolver: catalog + context → per-wave combatant stats.
//!
//! Layer order (low to high priority) is fixed:
//! 1. monster static base + tier growth,
//! 2. baseline override (replaces layer 1 entirely),
//! 3. map scale multipliers,
//! 4. global flags (hard mode).
use serde::Serialize;
use smallvec::SmallVec;

use crate::constants::{
    HARD_MODE_ATTACK_MULTIPLIER, HARD_MODE_HP_MULTIPLIER, MAX_ITERATIONS, MAX_STAT_VARIANCE_PCT,
};
use crate::context::{BaselineOverride, MapScale, SimulationContext};
use crate::data::{GameCatalog, MonsterDef, MonsterTier, MonsterTraits, StatGrowth, WaveDef};
use crate::error::{CatalogEntry, SimError};
use crate::numbers::{count_to_f64, usize_to_u32};

/// Monsters inside a wave are stored inline up to this many.
pub type WaveMonsters = SmallVec<[ResolvedMonster; 4]>;

/// Which stat a layer is being applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
}

/// Effective combat stats for one monster slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMonster {
    pub monster_id: String,
    pub name: String,
    pub tier: MonsterTier,
    pub level: u32,
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub traits: MonsterTraits,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWave {
    pub wave_id: String,
    pub wave_label: String,
    pub wave_index: u32,
    pub monsters: WaveMonsters,
}

/// Ordered waves of one node, ready for the battle engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    pub chapter_id: String,
    pub chapter_name: String,
    pub node_id: String,
    pub node_name: String,
    pub waves: Vec<ResolvedWave>,
}

/// Reject contexts the engine cannot run, before any catalog lookup.
///
/// # Errors
///
/// Returns `SimError::InvalidConfiguration` naming the first offending field.
pub fn validate_context(ctx: &SimulationContext) -> Result<(), SimError> {
    let iterations = ctx.iterations();
    if iterations == 0 {
        return Err(SimError::invalid("iterations", "must be at least 1"));
    }
    if iterations > MAX_ITERATIONS {
        return Err(SimError::invalid(
            "iterations",
            format!("must be at most {MAX_ITERATIONS} (got {iterations})"),
        ));
    }
    if ctx.player().level == 0 {
        return Err(SimError::invalid("player.level", "must be at least 1"));
    }

    let scale = ctx.map_scale();
    ensure_non_negative("mapScale.hpMultiplier", scale.hp_multiplier)?;
    ensure_non_negative("mapScale.attackMultiplier", scale.attack_multiplier)?;
    ensure_non_negative("mapScale.defenseMultiplier", scale.defense_multiplier)?;

    if let Some(stats_override) = ctx.player().stats_override.as_ref() {
        for (name, value) in stats_override.present_fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid(
                    "player.statsOverride",
                    format!("{name} must be a non-negative number (got {value})"),
                ));
            }
        }
    }

    if let Some(over) = ctx.baseline_override() {
        for (field, law) in [
            ("baselineOverride.hp", over.hp),
            ("baselineOverride.attack", over.attack),
            ("baselineOverride.defense", over.defense),
        ] {
            ensure_non_negative(field, law.baseline)?;
            ensure_non_negative(field, law.level_adder)?;
        }
    }

    if let Some(modifiers) = ctx.map_modifiers() {
        ensure_non_negative("mapModifiers.statVariancePct", modifiers.stat_variance_pct)?;
        ensure_non_negative("mapModifiers.eliteChancePct", modifiers.elite_chance_pct)?;
        if modifiers.stat_variance_pct > MAX_STAT_VARIANCE_PCT {
            return Err(SimError::invalid(
                "mapModifiers.statVariancePct",
                format!(
                    "must be at most {MAX_STAT_VARIANCE_PCT} (got {})",
                    modifiers.stat_variance_pct
                ),
            ));
        }
        if modifiers.elite_chance_pct > 100.0 {
            return Err(SimError::invalid(
                "mapModifiers.eliteChancePct",
                format!("must be at most 100 (got {})", modifiers.elite_chance_pct),
            ));
        }
    }
    Ok(())
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(
            field,
            format!("must be a non-negative number (got {value})"),
        ))
    }
}

/// Resolve the node named by `ctx` into engine-ready waves.
///
/// # Errors
///
/// `NotFound` for an unknown chapter or node, `InvalidReference` when a wave
/// cites a monster the catalog does not define.
pub fn resolve_node(catalog: &GameCatalog, ctx: &SimulationContext) -> Result<ResolvedNode, SimError> {
    let chapter = catalog
        .chapter(ctx.chapter_id())
        .ok_or_else(|| SimError::NotFound {
            kind: CatalogEntry::Chapter,
            id: ctx.chapter_id().to_string(),
        })?;
    let node = chapter.node(ctx.node_id()).ok_or_else(|| SimError::NotFound {
        kind: CatalogEntry::Node,
        id: ctx.node_id().to_string(),
    })?;

    let waves = node
        .waves
        .iter()
        .enumerate()
        .map(|(index, wave)| {
            resolve_wave(catalog, ctx, wave, usize_to_u32(index), node.monster_level)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedNode {
        chapter_id: chapter.id.clone(),
        chapter_name: chapter.name.clone(),
        node_id: node.id.clone(),
        node_name: node.name.clone(),
        waves,
    })
}

fn resolve_wave(
    catalog: &GameCatalog,
    ctx: &SimulationContext,
    wave: &WaveDef,
    wave_index: u32,
    node_level: u32,
) -> Result<ResolvedWave, SimError> {
    let monsters = wave
        .monsters
        .iter()
        .map(|slot| -> Result<ResolvedMonster, SimError> {
            let monster =
                catalog
                    .monster(&slot.monster_id)
                    .ok_or_else(|| SimError::InvalidReference {
                        wave_id: wave.id.clone(),
                        monster_id: slot.monster_id.clone(),
                    })?;
            let level = slot.level.unwrap_or(node_level).max(1);
            Ok(resolve_monster(catalog, ctx, monster, level))
        })
        .collect::<Result<WaveMonsters, SimError>>()?;

    Ok(ResolvedWave {
        wave_id: wave.id.clone(),
        wave_label: wave.label.clone(),
        wave_index,
        monsters,
    })
}

fn resolve_monster(
    catalog: &GameCatalog,
    ctx: &SimulationContext,
    monster: &MonsterDef,
    level: u32,
) -> ResolvedMonster {
    let tier = catalog.baselines.for_tier(monster.tier);
    let step = count_to_f64(level - 1);
    let over = ctx.baseline_override();
    let scale = ctx.map_scale();
    let hard_mode = ctx.hard_mode();

    let layer = |kind: StatKind, own_base: Option<f64>, tier_law: StatGrowth| {
        let static_value = own_base.unwrap_or(tier_law.baseline) + step * tier_law.level_adder;
        apply_stat_layers(kind, static_value, step, over, scale, hard_mode)
    };

    ResolvedMonster {
        monster_id: monster.id.clone(),
        name: monster.name.clone(),
        tier: monster.tier,
        level,
        hp: layer(StatKind::Hp, monster.base.hp, tier.hp),
        attack: layer(StatKind::Attack, monster.base.attack, tier.attack),
        defense: layer(StatKind::Defense, monster.base.defense, tier.defense),
        traits: monster.traits,
    }
}

/// Apply layers 2-4 on top of an already computed static value.
#[must_use]
pub fn apply_stat_layers(
    kind: StatKind,
    static_value: f64,
    step: f64,
    baseline_override: Option<&BaselineOverride>,
    scale: &MapScale,
    hard_mode: bool,
) -> f64 {
    let base = match (baseline_override, kind) {
        (Some(over), StatKind::Hp) => over.hp.at_step(step),
        (Some(over), StatKind::Attack) => over.attack.at_step(step),
        (Some(over), StatKind::Defense) => over.defense.at_step(step),
        (None, _) => static_value,
    };

    let scaled = match kind {
        StatKind::Hp => base * scale.hp_multiplier,
        StatKind::Attack => base * scale.attack_multiplier,
        StatKind::Defense => base * scale.defense_multiplier,
    };

    match (hard_mode, kind) {
        (true, StatKind::Hp) => scaled * HARD_MODE_HP_MULTIPLIER,
        (true, StatKind::Attack) => scaled * HARD_MODE_ATTACK_MULTIPLIER,
        _ => scaled,
    }
}
