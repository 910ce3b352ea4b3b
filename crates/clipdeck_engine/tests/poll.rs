use std::time::Duration;

use clipdeck_core::{ProcessingBatch, ProcessingItem, Stage};
use clipdeck_engine::{
    apply_status, BackgroundTracker, FetchSettings, ProgressDriver, StatusPollDriver, StatusReply,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item(id: u64, stage: Stage, local_progress: f64) -> ProcessingItem {
    ProcessingItem {
        stage,
        local_progress,
        ..ProcessingItem::new(id, format!("video-{id}.mp4"))
    }
}

async fn mount_status(server: &MockServer, id: u64, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/jobs/status/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn polled_status_advances_items_and_failures_stay_local() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount_status(&server, 1, r#"{"stage":"transcribing","progress":40}"#).await;
    mount_status(&server, 2, r#"{"stage":"complete","progress":100}"#).await;
    Mock::given(method("GET"))
        .and(path("/jobs/status/3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let batch = ProcessingBatch::from_items(vec![
        item(1, Stage::Analyzing, 90.0),
        item(2, Stage::Optimizing, 10.0),
        item(3, Stage::Uploading, 5.0),
        item(4, Stage::Complete, 100.0),
    ])
    .unwrap();

    let mut driver =
        StatusPollDriver::new(&format!("{}/jobs", server.uri()), &FetchSettings::default())
            .unwrap();
    let outcome = driver.advance(&batch).await;

    let first = outcome.batch.get(1).unwrap();
    assert_eq!(first.stage, Stage::Transcribing);
    assert_eq!(first.local_progress, 40.0);

    let second = outcome.batch.get(2).unwrap();
    assert_eq!(second.stage, Stage::Complete);
    assert_eq!(second.local_progress, 100.0);

    let third = outcome.batch.get(3).unwrap();
    assert_eq!(third.stage, Stage::Error);
    assert!(third
        .error_message
        .as_deref()
        .unwrap()
        .contains("http status 503"));

    assert_eq!(outcome.batch.get(4), batch.get(4));
    assert_eq!(outcome.transitions.len(), 3);
    assert!(!outcome.all_finished);
}

#[tokio::test]
async fn tracker_runs_on_the_polling_driver() {
    let server = MockServer::start().await;
    mount_status(&server, 7, r#"{"stage":"error","error":"unsupported codec"}"#).await;

    let driver =
        StatusPollDriver::new(&format!("{}/jobs/", server.uri()), &FetchSettings::default())
            .unwrap();
    let tracker = BackgroundTracker::with_driver(Duration::from_millis(20), driver).unwrap();
    let mut watcher = tracker.subscribe();
    tracker
        .start(vec![clipdeck_core::ItemSeed::idle(7, "talk.mp4")])
        .unwrap();

    let view = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            watcher.changed().await.unwrap();
            let view = watcher.borrow_and_update().clone();
            if view.all_finished() {
                break view;
            }
        }
    })
    .await
    .expect("batch finishes");

    assert_eq!(view.items[0].stage, Stage::Error);
    assert_eq!(
        view.items[0].error_message.as_deref(),
        Some("unsupported codec")
    );
    assert_eq!(view.aggregate_progress, 0.0);
    assert!(!tracker.is_ticking());
}

#[test]
fn regressing_replies_are_ignored() {
    let current = item(1, Stage::Merging, 30.0);
    let reply = StatusReply {
        stage: Stage::Analyzing,
        progress: 80.0,
        error: None,
    };
    assert_eq!(apply_status(&current, &reply), current);
}

#[test]
fn same_stage_progress_never_drops() {
    let current = item(1, Stage::Merging, 30.0);
    let reply = StatusReply {
        stage: Stage::Merging,
        progress: 10.0,
        error: None,
    };
    assert_eq!(apply_status(&current, &reply).local_progress, 30.0);
}

#[test]
fn finished_items_ignore_replies() {
    let current = item(1, Stage::Complete, 100.0);
    let reply = StatusReply {
        stage: Stage::Error,
        progress: 0.0,
        error: Some("late failure".into()),
    };
    assert_eq!(apply_status(&current, &reply), current);
}

#[test]
fn out_of_range_progress_is_clamped() {
    let current = item(1, Stage::Merging, 30.0);
    let ahead = StatusReply {
        stage: Stage::Processing,
        progress: 250.0,
        error: None,
    };
    assert_eq!(apply_status(&current, &ahead).local_progress, 100.0);

    let garbage = StatusReply {
        stage: Stage::Processing,
        progress: f64::NAN,
        error: None,
    };
    assert_eq!(apply_status(&current, &garbage).local_progress, 0.0);
}

#[test]
fn failure_without_a_message_gets_one() {
    let current = item(1, Stage::Merging, 30.0);
    let reply = StatusReply {
        stage: Stage::Error,
        progress: 0.0,
        error: None,
    };
    let failed = apply_status(&current, &reply);
    assert_eq!(failed.stage, Stage::Error);
    assert_eq!(
        failed.error_message.as_deref(),
        Some(clipdeck_core::UNKNOWN_FAILURE_MESSAGE)
    );
}
