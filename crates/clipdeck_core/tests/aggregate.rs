use clipdeck_core::{aggregate_progress, ProcessingItem, Stage};

fn item(id: u64, stage: Stage, local_progress: f64) -> ProcessingItem {
    ProcessingItem {
        stage,
        local_progress,
        ..ProcessingItem::new(id, "clip.mp4")
    }
}

#[test]
fn empty_batch_is_zero() {
    assert_eq!(aggregate_progress(&[]), 0.0);
}

#[test]
fn all_complete_is_one_hundred() {
    let items = vec![
        item(1, Stage::Complete, 100.0),
        item(2, Stage::Complete, 100.0),
        item(3, Stage::Complete, 100.0),
    ];
    assert_eq!(aggregate_progress(&items), 100.0);
}

#[test]
fn all_failed_is_zero() {
    let mut items = vec![item(1, Stage::Error, 60.0), item(2, Stage::Error, 10.0)];
    for failed in &mut items {
        failed.error_message = Some("render failed".into());
    }
    assert_eq!(aggregate_progress(&items), 0.0);
}

#[test]
fn one_complete_one_failed_is_half() {
    let items = vec![item(1, Stage::Complete, 100.0), item(2, Stage::Error, 0.0)];
    assert_eq!(aggregate_progress(&items), 50.0);
}

#[test]
fn mixed_batch_is_the_mean_of_item_contributions() {
    // analyzing@0 = 12.5, transcribing@50 = 31.25, complete = 100
    let items = vec![
        item(1, Stage::Analyzing, 0.0),
        item(2, Stage::Transcribing, 50.0),
        item(3, Stage::Complete, 100.0),
    ];
    let expected = (12.5 + 31.25 + 100.0) / 3.0;
    assert!((aggregate_progress(&items) - expected).abs() < 1e-9);
}
