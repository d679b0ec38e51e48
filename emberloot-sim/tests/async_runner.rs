#![cfg(feature = "async")]

use emberloot_sim::{
    CancellationToken, GameCatalog, SimError, SimulationDraftState, build_simulation_context,
    run_simulation, run_simulation_async,
};

fn seeded_draft() -> SimulationDraftState {
    SimulationDraftState {
        node_id: "1-3".to_string(),
        player_level: 6,
        iterations: 45,
        seed: 4242,
        stat_variance_pct: 10.0,
        elite_chance_pct: 15.0,
        ..SimulationDraftState::default()
    }
}

#[tokio::test]
async fn async_matches_sync_for_the_same_seed() {
    let catalog = GameCatalog::embedded();
    let ctx = build_simulation_context(&seeded_draft());
    let sync_report = run_simulation(catalog, &ctx).unwrap();
    let async_report = run_simulation_async(catalog, &ctx, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(sync_report, async_report);
}

#[tokio::test]
async fn pre_cancelled_token_stops_before_the_first_run() {
    let token = CancellationToken::new();
    token.cancel();
    let ctx = build_simulation_context(&seeded_draft());
    let err = run_simulation_async(GameCatalog::embedded(), &ctx, &token)
        .await
        .unwrap_err();
    assert_eq!(err, SimError::Cancelled { completed: 0 });
}

#[tokio::test(flavor = "current_thread")]
async fn cancelling_mid_batch_stops_between_runs() {
    let token = CancellationToken::new();
    let canceller = token.clone();
    // Only runs once the batch yields the single worker thread.
    tokio::spawn(async move { canceller.cancel() });

    let draft = SimulationDraftState {
        iterations: 200,
        ..seeded_draft()
    };
    let err = run_simulation_async(GameCatalog::embedded(), &build_simulation_context(&draft), &token)
        .await
        .unwrap_err();
    let SimError::Cancelled { completed } = err else {
        panic!("expected cancellation, got {err:?}");
    };
    assert!(completed > 0);
    assert!(completed < draft.iterations);
    assert_eq!(completed % 10, 0);
}

#[tokio::test]
async fn configuration_errors_win_over_cancellation() {
    let token = CancellationToken::new();
    token.cancel();
    let draft = SimulationDraftState {
        iterations: 0,
        ..seeded_draft()
    };
    let err = run_simulation_async(GameCatalog::embedded(), &build_simulation_context(&draft), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidConfiguration { .. }));
}
