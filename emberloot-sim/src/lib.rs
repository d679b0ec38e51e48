//! Emberloot Battle Simulator
//!
//! Platform-agnostic Monte Carlo battle simulation for the Emberloot idle RPG.
//! Given a chapter node, a player configuration and balance knobs, this crate
//! plays the node's waves many times and reports win rates and per-wave HP
//! statistics. It has no UI or platform-specific dependencies.

pub mod constants;
pub mod context;
pub mod data;
pub mod engine;
pub mod error;
pub mod growth;
pub mod numbers;
pub mod report;
pub mod resolver;
pub mod rng;
pub mod runner;

// Re-export commonly used types
pub use context::{
    BaselineOverride, BaselineOverrideDraft, MapModifiers, MapScale, PlayerSetup,
    SimulationContext, SimulationDraftState, SimulationFlags, build_simulation_context,
};
pub use data::{
    BaselineTable, ChapterDef, GameCatalog, MonsterBase, MonsterDef, MonsterTier, MonsterTraits,
    NodeDef, StatGrowth, TierBaseline, WaveDef, WaveMonster,
};
pub use engine::{RunPhase, run_battle};
pub use error::{CatalogEntry, RunAbandoned, SimError};
pub use growth::{
    PlayerBaseStats, PlayerStatsOverride, apply_player_override, calc_base_attack,
    calc_base_defense, calc_base_hp, calc_display_stats, calc_player_base_stats,
};
pub use report::{ReportAggregator, SimulationReport, SimulationRun, WaveSnapshot, WaveStat};
pub use resolver::{ResolvedMonster, ResolvedNode, ResolvedWave, resolve_node, validate_context};
pub use rng::{RunRng, derive_run_seed};
pub use runner::{BatchPlan, CancellationToken, run_simulation};
#[cfg(feature = "async")]
pub use runner::run_simulation_async;

/// Trait for abstracting where the game catalog comes from.
/// Platform-specific front ends provide their own implementations.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the catalog of chapters, monsters and tier baselines.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed.
    fn load_catalog(&self) -> Result<GameCatalog, Self::Error>;
}

/// Catalog compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

impl CatalogSource for EmbeddedCatalog {
    type Error = std::convert::Infallible;

    fn load_catalog(&self) -> Result<GameCatalog, Self::Error> {
        Ok(GameCatalog::embedded().clone())
    }
}

/// Error from [`SimulationEngine`]: either the catalog could not be loaded or
/// the batch itself failed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("failed to load catalog: {0}")]
    Catalog(#[source] E),
    #[error(transparent)]
    Simulation(#[from] SimError),
}

/// Front door for callers: owns a catalog source and runs batches against it.
pub struct SimulationEngine<C>
where
    C: CatalogSource,
{
    catalog_source: C,
}

impl<C> SimulationEngine<C>
where
    C: CatalogSource,
{
    /// Create a new engine over the provided catalog source
    pub const fn new(catalog_source: C) -> Self {
        Self { catalog_source }
    }

    /// Load the catalog through the source.
    ///
    /// # Errors
    ///
    /// Returns the source's error if loading fails.
    pub fn catalog(&self) -> Result<GameCatalog, C::Error> {
        self.catalog_source.load_catalog()
    }

    /// Build a context from `draft` and run the batch synchronously.
    ///
    /// # Errors
    ///
    /// Catalog load failures or any [`SimError`] from the batch.
    pub fn simulate(
        &self,
        draft: &SimulationDraftState,
    ) -> Result<SimulationReport, EngineError<C::Error>> {
        let catalog = self.catalog().map_err(EngineError::Catalog)?;
        let ctx = build_simulation_context(draft);
        Ok(run_simulation(&catalog, &ctx)?)
    }

    /// Build a context from `draft` and run the batch cooperatively.
    ///
    /// # Errors
    ///
    /// Catalog load failures or any [`SimError`] from the batch, including
    /// `Cancelled`.
    #[cfg(feature = "async")]
    pub async fn simulate_async(
        &self,
        draft: &SimulationDraftState,
        cancel: &CancellationToken,
    ) -> Result<SimulationReport, EngineError<C::Error>> {
        let catalog = self.catalog().map_err(EngineError::Catalog)?;
        let ctx = build_simulation_context(draft);
        Ok(run_simulation_async(&catalog, &ctx, cancel).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "catalog unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    struct BrokenSource;

    impl CatalogSource for BrokenSource {
        type Error = Unavailable;

        fn load_catalog(&self) -> Result<GameCatalog, Self::Error> {
            Err(Unavailable)
        }
    }

    #[test]
    fn embedded_engine_runs_a_batch() {
        let engine = SimulationEngine::new(EmbeddedCatalog);
        let draft = SimulationDraftState {
            iterations: 10,
            seed: 17,
            ..SimulationDraftState::default()
        };
        let report = engine.simulate(&draft).unwrap();
        assert_eq!(report.iterations, 10);
        assert_eq!(report.chapter_id, "ch1");
    }

    #[test]
    fn catalog_failures_are_reported() {
        let engine = SimulationEngine::new(BrokenSource);
        let err = engine.simulate(&SimulationDraftState::default()).unwrap_err();
        assert!(matches!(err, EngineError::Catalog(Unavailable)));
        assert_eq!(err.to_string(), "failed to load catalog: catalog unavailable");
    }

    #[test]
    fn simulation_errors_pass_through() {
        let engine = SimulationEngine::new(EmbeddedCatalog);
        let draft = SimulationDraftState {
            iterations: 0,
            ..SimulationDraftState::default()
        };
        assert!(matches!(
            engine.simulate(&draft),
            Err(EngineError::Simulation(SimError::InvalidConfiguration { .. }))
        ));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn async_engine_honours_cancellation() {
        let engine = SimulationEngine::new(EmbeddedCatalog);
        let token = CancellationToken::new();
        token.cancel();
        let err = engine
            .simulate_async(&SimulationDraftState::default(), &token)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Simulation(SimError::Cancelled { completed: 0 })
        ));
    }
}
