mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{build_trove, test_config, video_item};
use trove::{ContentSyncJob, ScoreRecalculationJob};
use trove_core::repository::{ContentMetricsRepository, ContentRepository};
use trove_mock::MockProvider;
use trove_types::{RecalcJobConfig, SyncJobConfig};

fn sync_cfg(interval: Duration) -> SyncJobConfig {
    SyncJobConfig {
        enabled: true,
        interval,
        retry_count: 0,
        retry_delay: Duration::from_millis(10),
    }
}

#[tokio::test(start_paused = true)]
async fn sync_job_fires_immediately_and_then_per_tick() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let (trove, _store) = build_trove(vec![provider.clone()], test_config());

    let interval = Duration::from_secs(3600);
    let handle = ContentSyncJob::new(trove.sync_engine().clone(), sync_cfg(interval))
        .start()
        .expect("enabled job starts");

    // the immediate firing, before any tick
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(provider.fetch_count(), 1);

    tokio::time::sleep(interval + Duration::from_millis(10)).await;
    assert_eq!(provider.fetch_count(), 2);

    handle.stop().await;
}

#[tokio::test]
async fn a_disabled_sync_job_never_starts() {
    let provider = Arc::new(MockProvider::with_items("provider1", Vec::new()));
    let (trove, _store) = build_trove(vec![provider], test_config());

    let cfg = SyncJobConfig {
        enabled: false,
        ..sync_cfg(Duration::from_secs(1))
    };
    assert!(ContentSyncJob::new(trove.sync_engine().clone(), cfg)
        .start()
        .is_none());
}

#[tokio::test(start_paused = true)]
async fn overlapping_firings_are_dropped_not_queued() {
    // Each run holds the gate for half a (virtual) second.
    let provider = Arc::new(
        MockProvider::with_items(
            "provider1",
            vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
        )
        .delayed(Duration::from_millis(500)),
    );
    let (trove, _store) = build_trove(vec![provider.clone()], test_config());

    let job = Arc::new(ContentSyncJob::new(
        trove.sync_engine().clone(),
        sync_cfg(Duration::from_secs(3600)),
    ));

    let first = tokio::spawn({
        let job = job.clone();
        async move { job.run_once().await }
    });
    // Let the first run take the gate and park inside the provider delay.
    tokio::task::yield_now().await;

    // A second firing while the first is in flight must be skipped.
    job.run_once().await;

    first.await.unwrap();
    assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn whole_run_failures_are_retried_with_a_fixed_delay() {
    let provider = Arc::new(MockProvider::failing("provider1", "boom"));
    let (trove, store) = build_trove(vec![provider.clone()], test_config());

    let cfg = SyncJobConfig {
        enabled: true,
        interval: Duration::from_secs(3600),
        retry_count: 2,
        retry_delay: Duration::from_millis(50),
    };
    ContentSyncJob::new(trove.sync_engine().clone(), cfg)
        .run_once()
        .await;

    // initial attempt plus two retries
    assert_eq!(provider.fetch_count(), 3);
    assert_eq!(store.history_rows().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn recalc_job_does_not_fire_immediately() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let (trove, store) = build_trove(vec![provider], test_config());
    trove.sync_engine().sync_provider("provider1").await;

    let id = ContentRepository::list_ids(store.as_ref(), 0, 1).await.unwrap()[0];
    let before = store.get_by_content_id(id).await.unwrap().unwrap();

    let interval = Duration::from_secs(3600);
    let handle = ScoreRecalculationJob::new(
        trove.score_calculator().clone(),
        RecalcJobConfig {
            enabled: true,
            interval,
            batch_size: 10,
        },
    )
    .start()
    .expect("enabled job starts");

    // no immediate firing on start
    tokio::time::sleep(Duration::from_millis(10)).await;
    let unchanged = store.get_by_content_id(id).await.unwrap().unwrap();
    assert_eq!(unchanged.recalculated_at, before.recalculated_at);

    // the first tick walks the corpus
    tokio::time::sleep(interval).await;
    let after = store.get_by_content_id(id).await.unwrap().unwrap();
    assert!(after.recalculated_at > before.recalculated_at);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn app_state_shutdown_stops_tracked_jobs_idempotently() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let (trove, _store) = build_trove(vec![provider.clone()], test_config());

    let state = trove::AppState::new();
    for handle in trove.start_jobs() {
        state.track(handle);
    }

    // let the sync job's immediate run land
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(provider.fetch_count(), 1);

    state.shutdown().await;
    state.shutdown().await;

    // no ticker survives shutdown
    tokio::time::sleep(trove.config().sync.interval * 2).await;
    assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stopping_the_job_drains_the_in_flight_run() {
    let provider = Arc::new(
        MockProvider::with_items(
            "provider1",
            vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
        )
        .delayed(Duration::from_millis(500)),
    );
    let (trove, store) = build_trove(vec![provider.clone()], test_config());

    let handle = ContentSyncJob::new(
        trove.sync_engine().clone(),
        sync_cfg(Duration::from_secs(3600)),
    )
    .start()
    .expect("enabled job starts");

    // let the immediate run enter the provider delay, then stop
    tokio::task::yield_now().await;
    handle.stop().await;

    assert_eq!(provider.fetch_count(), 1);
    // the drained run finished and finalized its audit row
    let history = store.history_rows();
    assert_eq!(history.len(), 1);
    assert!(history[0].completed_at.is_some());
}
