//! Progress event and cancellation token tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use framesnap::{CancellationToken, ProgressCallback, ProgressEvent, ProgressStage};

fn event(stage: ProgressStage, extracted: u64, planned: u64) -> ProgressEvent {
    ProgressEvent {
        stage,
        extracted,
        planned,
        batches_done: 1,
        batch_count: 2,
        batch_error: None,
        percentage: Some(50.0),
        elapsed: Duration::from_millis(10),
        estimated_remaining: Some(Duration::from_millis(10)),
    }
}

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn cancellation_token_default_not_cancelled() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn cancellation_token_cancel() {
    let token = CancellationToken::new();
    token.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_token_across_threads() {
    let token = CancellationToken::default();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel())
        .join()
        .expect("Cancelling thread panicked");
    assert!(token.is_cancelled());
}

// ── ProgressEvent ──────────────────────────────────────────────────

#[test]
fn preparing_message() {
    let preparing = event(ProgressStage::Preparing, 0, 31);
    assert_eq!(preparing.to_string(), "Preparing to extract 31 frames...");
}

#[test]
fn batch_message() {
    let finished = event(ProgressStage::BatchFinished, 12, 31);
    assert_eq!(finished.to_string(), "Extracted 12 / 31 frames...");
}

// ── ProgressCallback ───────────────────────────────────────────────

struct Recorder {
    seen: Mutex<Vec<u64>>,
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, event: &ProgressEvent) {
        self.seen.lock().unwrap().push(event.extracted);
    }
}

#[test]
fn custom_callback_receives_events() {
    let recorder = Recorder {
        seen: Mutex::new(Vec::new()),
    };
    recorder.on_progress(&event(ProgressStage::BatchFinished, 4, 8));
    recorder.on_progress(&event(ProgressStage::BatchFinished, 8, 8));
    assert_eq!(*recorder.seen.lock().unwrap(), vec![4, 8]);
}

#[test]
fn closures_are_callbacks() {
    let count = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&count);
    let callback: Arc<dyn ProgressCallback> = Arc::new(move |_event: &ProgressEvent| {
        *sink.lock().unwrap() += 1;
    });

    callback.on_progress(&event(ProgressStage::Preparing, 0, 3));
    callback.on_progress(&event(ProgressStage::BatchFinished, 3, 3));
    assert_eq!(*count.lock().unwrap(), 2);
}
