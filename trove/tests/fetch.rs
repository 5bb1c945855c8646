mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{build_trove, test_config, text_item, video_item};
use trove_core::TroveError;
use trove_mock::MockProvider;

#[tokio::test]
async fn fan_out_concatenates_successes_and_isolates_failures() {
    let healthy = Arc::new(MockProvider::with_items(
        "provider1",
        vec![
            video_item("provider1", "v1", "Clip One", 1000, 50, 3),
            text_item("provider1", "a1", "Essay", 10, 20, 3),
        ],
    ));
    let failing = Arc::new(MockProvider::failing("provider2", "connection refused"));
    let (trove, _store) = build_trove(vec![healthy, failing], test_config());

    let (items, errors) = trove.coordinator().fetch_all().await;
    assert_eq!(items.len(), 2);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors.get("provider2"),
        Some(TroveError::Provider { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn a_slow_provider_times_out() {
    let slow = Arc::new(
        MockProvider::with_items(
            "provider1",
            vec![video_item("provider1", "v1", "Clip", 1000, 50, 3)],
        )
        .delayed(Duration::from_secs(5)),
    );
    let (trove, _store) = build_trove(vec![slow], test_config());

    let err = trove
        .coordinator()
        .fetch_one("provider1")
        .await
        .unwrap_err();
    assert!(matches!(err, TroveError::ProviderTimeout { .. }), "got {err}");
}

#[tokio::test]
async fn an_unknown_provider_is_not_found() {
    let provider = Arc::new(MockProvider::with_items("provider1", Vec::new()));
    let (trove, _store) = build_trove(vec![provider], test_config());

    let err = trove.coordinator().fetch_one("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}
