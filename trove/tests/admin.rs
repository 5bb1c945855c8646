mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{build_trove, test_config, text_item, video_item};
use trove::{RecalcDispatch, RecalcScope, SyncDispatch};
use trove_core::repository::{ContentMetricsRepository, ContentRepository};
use trove_core::TroveError;
use trove_mock::MockProvider;
use trove_types::{JobStatus, SyncStatus};

/// Poll the job registry until the job reaches a terminal state.
async fn await_job(trove: &trove::Trove, id: &str) -> trove_types::JobInfo {
    for _ in 0..200 {
        if let Some(job) = trove.admin().job(id) {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {id} did not finish");
}

#[tokio::test]
async fn inline_sync_returns_per_provider_results() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let (trove, _store) = build_trove(vec![provider], test_config());

    let dispatch = trove.admin().trigger_sync(None, Some(false)).await;
    let SyncDispatch::Results(results) = dispatch else {
        panic!("expected inline results");
    };
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].new_contents, 1);
}

#[tokio::test]
async fn async_sync_reports_through_the_job_registry() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let (trove, store) = build_trove(vec![provider], test_config());

    let dispatch = trove.admin().trigger_sync(None, Some(true)).await;
    let SyncDispatch::Job(job_id) = dispatch else {
        panic!("expected a job id");
    };
    assert!(job_id.starts_with("sync-"));

    let job = await_job(&trove, &job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.ended_at.is_some());
    assert_eq!(ContentRepository::count_all(store.as_ref()).await.unwrap(), 1);
}

#[tokio::test]
async fn async_sync_of_a_failing_provider_fails_the_job() {
    let provider = Arc::new(MockProvider::failing("provider1", "status 500 from upstream"));
    let (trove, _store) = build_trove(vec![provider], test_config());

    let dispatch = trove
        .admin()
        .trigger_sync(Some("provider1".to_string()), Some(true))
        .await;
    let SyncDispatch::Job(job_id) = dispatch else {
        panic!("expected a job id");
    };

    let job = await_job(&trove, &job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.as_deref().unwrap().contains("fetch failed"));
}

#[tokio::test]
async fn inline_recalculation_walks_the_whole_corpus() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![
            video_item("provider1", "v1", "Clip One", 1000, 50, 3),
            text_item("provider1", "a1", "Essay", 10, 20, 3),
        ],
    ));
    let (trove, _store) = build_trove(vec![provider], test_config());
    trove.sync_engine().sync_provider("provider1").await;

    let dispatch = trove
        .admin()
        .recalculate(RecalcScope::All, Some(false))
        .await
        .unwrap();
    let RecalcDispatch::Processed(n) = dispatch else {
        panic!("expected inline processing");
    };
    assert_eq!(n, 2);
}

#[tokio::test]
async fn recalculation_by_type_only_touches_that_type() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![
            video_item("provider1", "v1", "Clip One", 1000, 50, 3),
            text_item("provider1", "a1", "Essay", 10, 20, 3),
        ],
    ));
    let (trove, store) = build_trove(vec![provider], test_config());
    trove.sync_engine().sync_provider("provider1").await;

    let dispatch = trove
        .admin()
        .recalculate(
            RecalcScope::from_request(None, Some("video"), false).unwrap(),
            Some(false),
        )
        .await
        .unwrap();
    let RecalcDispatch::Processed(n) = dispatch else {
        panic!("expected inline processing");
    };
    assert_eq!(n, 1);
    // both rows still have exactly one metrics row
    for id in ContentRepository::list_ids(store.as_ref(), 0, 10).await.unwrap() {
        assert!(store.get_by_content_id(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn async_recalculation_of_a_single_content_completes() {
    let provider = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let (trove, store) = build_trove(vec![provider], test_config());
    trove.sync_engine().sync_provider("provider1").await;
    let id = ContentRepository::list_ids(store.as_ref(), 0, 1).await.unwrap()[0];

    let dispatch = trove
        .admin()
        .recalculate(RecalcScope::Content(id), Some(true))
        .await
        .unwrap();
    let RecalcDispatch::Job(job_id) = dispatch else {
        panic!("expected a job id");
    };
    assert!(job_id.starts_with("recalc-"));

    let job = await_job(&trove, &job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn async_recalculation_of_a_missing_content_fails_the_job() {
    let provider = Arc::new(MockProvider::with_items("provider1", Vec::new()));
    let (trove, _store) = build_trove(vec![provider], test_config());

    let dispatch = trove
        .admin()
        .recalculate(RecalcScope::Content(999), Some(true))
        .await
        .unwrap();
    let RecalcDispatch::Job(job_id) = dispatch else {
        panic!("expected a job id");
    };

    let job = await_job(&trove, &job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.as_deref().unwrap().contains("not found"));
}

#[tokio::test]
async fn sync_history_filters_by_provider_and_status() {
    let ok = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let bad = Arc::new(MockProvider::failing("provider2", "down"));
    let (trove, _store) = build_trove(vec![ok, bad], test_config());
    trove.sync_engine().sync_all().await;

    let (rows, total) = trove
        .admin()
        .sync_history(None, Some("success"), 0, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].provider_id, "provider1");
    assert_eq!(rows[0].status, SyncStatus::Success);

    let (rows, total) = trove
        .admin()
        .sync_history(Some("provider2"), None, 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].status, SyncStatus::Failed);

    let err = trove
        .admin()
        .sync_history(None, Some("exploded"), 10, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, TroveError::InvalidArg(_)));
}

#[tokio::test]
async fn providers_overview_reports_counts_scores_and_outcomes() {
    let p1 = Arc::new(MockProvider::with_items(
        "provider1",
        vec![
            video_item("provider1", "v1", "Clip One", 1000, 50, 3),
            video_item("provider1", "v2", "Clip Two", 4000, 200, 3),
        ],
    ));
    let p2 = Arc::new(MockProvider::failing("provider2", "down"));
    let (trove, _store) = build_trove(vec![p1, p2], test_config());
    trove.sync_engine().sync_all().await;

    let overview = trove.admin().providers_overview().await.unwrap();
    // provider2 ingested nothing, so only provider1 has contents
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].provider_id, "provider1");
    assert_eq!(overview[0].content_count, 2);
    assert!(overview[0].average_score > 0.0);
    assert_eq!(overview[0].last_sync_status, Some(SyncStatus::Success));
}

#[tokio::test]
async fn health_check_probes_every_registered_provider() {
    let ok = Arc::new(MockProvider::with_items(
        "provider1",
        vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
    ));
    let bad = Arc::new(MockProvider::failing("provider2", "connection refused"));
    let (trove, _store) = build_trove(vec![ok, bad], test_config());

    let reports = trove.admin().health_check().await;
    assert_eq!(reports.len(), 2);
    assert!(reports[0].healthy);
    assert!(reports[0].error.is_none());
    assert!(!reports[1].healthy);
    assert!(reports[1].error.as_deref().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn delete_content_rejects_non_positive_ids() {
    let provider = Arc::new(MockProvider::with_items("provider1", Vec::new()));
    let (trove, _store) = build_trove(vec![provider], test_config());

    assert!(matches!(
        trove.admin().delete_content(0).await.unwrap_err(),
        TroveError::InvalidArg(_)
    ));
    assert!(matches!(
        trove.admin().delete_content(-3).await.unwrap_err(),
        TroveError::InvalidArg(_)
    ));
}
