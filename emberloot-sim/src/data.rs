//! Static chapter, node, wave and monster definitions.
//!
//! The catalog is read-only input to the resolver. Its on-disk format is JSON;
//! the crate bundles a default catalog and callers may supply their own through
//! [`crate::CatalogSource`].
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const DEFAULT_CATALOG_DATA: &str = include_str!("../assets/data/catalog.json");

/// Linear growth law `baseline + n * level_adder` over a zero-based level step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatGrowth {
    pub baseline: f64,
    #[serde(default)]
    pub level_adder: f64,
}

impl StatGrowth {
    #[must_use]
    pub const fn new(baseline: f64, level_adder: f64) -> Self {
        Self {
            baseline,
            level_adder,
        }
    }

    /// Value of the law at zero-based step `n`.
    #[must_use]
    pub fn at_step(&self, n: f64) -> f64 {
        self.level_adder.mul_add(n, self.baseline)
    }
}

/// Monster rank; selects the default growth law from the baseline table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonsterTier {
    Normal,
    Elite,
    Boss,
}

/// Flat base values a monster may declare. Missing fields fall back to the
/// tier baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonsterBase {
    #[serde(default)]
    pub hp: Option<f64>,
    #[serde(default)]
    pub attack: Option<f64>,
    #[serde(default)]
    pub defense: Option<f64>,
}

/// Trait/affix modifiers consumed by damage resolution. Rates are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterTraits {
    #[serde(default)]
    pub crit_rate: f64,
    #[serde(default)]
    pub lifesteal: f64,
    #[serde(default)]
    pub thorns: f64,
    #[serde(default)]
    pub elemental: f64,
    #[serde(default)]
    pub elemental_resist: f64,
    #[serde(default = "MonsterTraits::default_attack_speed")]
    pub attack_speed: f64,
}

impl MonsterTraits {
    const fn default_attack_speed() -> f64 {
        1.0
    }
}

impl Default for MonsterTraits {
    fn default() -> Self {
        Self {
            crit_rate: 0.0,
            lifesteal: 0.0,
            thorns: 0.0,
            elemental: 0.0,
            elemental_resist: 0.0,
            attack_speed: Self::default_attack_speed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDef {
    pub id: String,
    pub name: String,
    pub tier: MonsterTier,
    #[serde(default)]
    pub base: MonsterBase,
    #[serde(default)]
    pub traits: MonsterTraits,
}

/// One monster slot inside a wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveMonster {
    pub monster_id: String,
    /// Overrides the node's monster level for this slot.
    #[serde(default)]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub monsters: Vec<WaveMonster>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
    pub id: String,
    pub name: String,
    #[serde(default = "NodeDef::default_monster_level")]
    pub monster_level: u32,
    #[serde(default)]
    pub waves: Vec<WaveDef>,
}

impl NodeDef {
    const fn default_monster_level() -> u32 {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

impl ChapterDef {
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|node| node.id == node_id)
    }
}

/// Default growth laws for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBaseline {
    pub hp: StatGrowth,
    pub attack: StatGrowth,
    pub defense: StatGrowth,
}

/// Baseline stats table keyed by tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineTable {
    pub normal: TierBaseline,
    pub elite: TierBaseline,
    pub boss: TierBaseline,
}

impl BaselineTable {
    #[must_use]
    pub const fn for_tier(&self, tier: MonsterTier) -> &TierBaseline {
        match tier {
            MonsterTier::Normal => &self.normal,
            MonsterTier::Elite => &self.elite,
            MonsterTier::Boss => &self.boss,
        }
    }
}

/// Container for all static combat data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCatalog {
    pub chapters: Vec<ChapterDef>,
    pub monsters: Vec<MonsterDef>,
    pub baselines: BaselineTable,
}

impl GameCatalog {
    /// Load catalog data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a valid catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The catalog bundled with the crate, parsed once.
    ///
    /// # Panics
    ///
    /// Panics if the bundled JSON is malformed, which the crate's tests rule out.
    #[must_use]
    pub fn embedded() -> &'static Self {
        static CATALOG: OnceLock<GameCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            Self::from_json(DEFAULT_CATALOG_DATA).expect("valid bundled catalog")
        })
    }

    #[must_use]
    pub fn chapter(&self, chapter_id: &str) -> Option<&ChapterDef> {
        self.chapters.iter().find(|chapter| chapter.id == chapter_id)
    }

    #[must_use]
    pub fn node(&self, chapter_id: &str, node_id: &str) -> Option<&NodeDef> {
        self.chapter(chapter_id)?.node(node_id)
    }

    #[must_use]
    pub fn monster(&self, monster_id: &str) -> Option<&MonsterDef> {
        self.monsters.iter().find(|monster| monster.id == monster_id)
    }
}
