//! Batch runner: prepares a node once, plays N runs, folds them into a report.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::context::{MapModifiers, SimulationContext};
use crate::data::GameCatalog;
use crate::engine::run_battle;
use crate::error::{RunAbandoned, SimError};
use crate::growth::{PlayerBaseStats, calc_display_stats};
use crate::report::{ReportAggregator, SimulationReport, SimulationRun};
use crate::resolver::{ResolvedNode, resolve_node, validate_context};
use crate::rng::{RunRng, resolve_base_seed};

/// Shared cancel flag for long batches. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Everything a batch needs, computed once before the first run.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    node: ResolvedNode,
    player: PlayerBaseStats,
    modifiers: Option<MapModifiers>,
    iterations: u32,
    base_seed: u64,
}

impl BatchPlan {
    /// Validate `ctx`, resolve its node and fix the batch seed.
    ///
    /// # Errors
    ///
    /// Any configuration error from validation or resolution.
    pub fn prepare(catalog: &GameCatalog, ctx: &SimulationContext) -> Result<Self, SimError> {
        validate_context(ctx)?;
        let node = resolve_node(catalog, ctx)?;
        let player = calc_display_stats(ctx.player().level, ctx.player().stats_override.as_ref());
        let base_seed = resolve_base_seed(ctx.deterministic_seed());

        log::debug!(
            "prepared batch for {}/{}: {} waves, {} iterations, base seed {base_seed:#018x}",
            node.chapter_id,
            node.node_id,
            node.waves.len(),
            ctx.iterations()
        );

        Ok(Self {
            node,
            player,
            modifiers: ctx.map_modifiers().copied(),
            iterations: ctx.iterations(),
            base_seed,
        })
    }

    #[must_use]
    pub const fn node(&self) -> &ResolvedNode {
        &self.node
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerBaseStats {
        &self.player
    }

    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    #[must_use]
    pub const fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Play run `run_index` with its own derived random stream.
    ///
    /// # Errors
    ///
    /// Returns [`RunAbandoned`] when the run's spawned data is unusable.
    pub fn run(&self, run_index: u32) -> Result<SimulationRun, RunAbandoned> {
        let mut rng = RunRng::for_run(self.base_seed, run_index);
        run_battle(
            &self.node,
            &self.player,
            self.modifiers.as_ref(),
            run_index,
            &mut rng,
        )
    }

    #[must_use]
    pub fn aggregator(&self) -> ReportAggregator {
        ReportAggregator::new(&self.node, self.iterations)
    }

    fn absorb(aggregator: &mut ReportAggregator, outcome: Result<SimulationRun, RunAbandoned>) {
        match outcome {
            Ok(run) => aggregator.ingest(&run),
            Err(abandoned) => {
                log::warn!("{abandoned}");
                aggregator.record_abandoned();
            }
        }
    }

    fn finish(aggregator: ReportAggregator) -> Result<SimulationReport, SimError> {
        let abandoned = aggregator.abandoned_runs();
        let report = aggregator.finish()?;
        log::info!(
            "finished {}/{}: {} runs ({} abandoned), win rate {:.1}%",
            report.chapter_id,
            report.node_id,
            report.actual_runs,
            abandoned,
            report.overall_win_rate
        );
        Ok(report)
    }
}

/// Run a full batch synchronously.
///
/// # Errors
///
/// Configuration errors before any run, or `NoValidRuns` when every run was
/// abandoned.
pub fn run_simulation(
    catalog: &GameCatalog,
    ctx: &SimulationContext,
) -> Result<SimulationReport, SimError> {
    let plan = BatchPlan::prepare(catalog, ctx)?;
    let mut aggregator = plan.aggregator();
    for run_index in 0..plan.iterations {
        BatchPlan::absorb(&mut aggregator, plan.run(run_index));
    }
    BatchPlan::finish(aggregator)
}

/// Cooperative variant of [`run_simulation`].
///
/// Yields to the scheduler every few runs and checks `cancel` before each run.
/// Produces the same report as the synchronous runner for the same seed.
///
/// # Errors
///
/// Everything [`run_simulation`] returns, plus `Cancelled` when the token
/// fires. No partial report is produced.
#[cfg(feature = "async")]
pub async fn run_simulation_async(
    catalog: &GameCatalog,
    ctx: &SimulationContext,
    cancel: &CancellationToken,
) -> Result<SimulationReport, SimError> {
    use crate::constants::YIELD_EVERY_RUNS;

    let plan = BatchPlan::prepare(catalog, ctx)?;
    let mut aggregator = plan.aggregator();
    for run_index in 0..plan.iterations {
        if cancel.is_cancelled() {
            log::debug!(
                "batch for {}/{} cancelled after {run_index} runs",
                plan.node.chapter_id,
                plan.node.node_id
            );
            return Err(SimError::Cancelled {
                completed: run_index,
            });
        }
        BatchPlan::absorb(&mut aggregator, plan.run(run_index));
        if (run_index + 1) % YIELD_EVERY_RUNS == 0 {
            tokio::task::yield_now().await;
        }
    }
    BatchPlan::finish(aggregator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{SimulationDraftState, build_simulation_context};

    fn seeded(seed: u64, iterations: u32) -> SimulationContext {
        build_simulation_context(&SimulationDraftState {
            iterations,
            seed,
            ..SimulationDraftState::default()
        })
    }

    #[test]
    fn plan_keeps_the_callers_seed() {
        let plan = BatchPlan::prepare(GameCatalog::embedded(), &seeded(1234, 5)).unwrap();
        assert_eq!(plan.base_seed(), 1234);
        assert_eq!(plan.iterations(), 5);
        assert_eq!(plan.node().node_id, "1-1");
        assert!((plan.player().hp - 100.0).abs() < 1e-9);
    }

    #[test]
    fn runs_replay_from_the_plan() {
        let plan = BatchPlan::prepare(GameCatalog::embedded(), &seeded(99, 3)).unwrap();
        assert_eq!(plan.run(2), plan.run(2));
    }

    #[test]
    fn config_errors_fail_before_any_run() {
        let ctx = build_simulation_context(&SimulationDraftState {
            node_id: "404".to_string(),
            ..SimulationDraftState::default()
        });
        assert!(matches!(
            run_simulation(GameCatalog::embedded(), &ctx),
            Err(SimError::NotFound { .. })
        ));
    }

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn report_counts_every_run() {
        let report = run_simulation(GameCatalog::embedded(), &seeded(5, 20)).unwrap();
        assert_eq!(report.actual_runs, 20);
        assert!((report.completion_rate - 100.0).abs() < 1e-9);
    }
}
