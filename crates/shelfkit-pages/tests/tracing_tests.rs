#![forbid(unsafe_code)]

//! Logging contract of the batch close.

use std::sync::{Arc, Mutex};

use shelfkit_pages::{BatchCloser, ChunkSink, ServiceError};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    events.lock().unwrap().clone()
}

struct FailSecond(usize);

impl ChunkSink<u8> for FailSecond {
    fn begin(&mut self, _chunk: &[u8]) {}

    fn close(&mut self, _chunk: &[u8]) -> Result<(), ServiceError> {
        self.0 += 1;
        if self.0 == 2 {
            Err(ServiceError::new("busy"))
        } else {
            Ok(())
        }
    }

    fn closed(&mut self, _chunk: &[u8]) {}

    fn failed(&mut self, _chunk: &[u8], _error: &ServiceError) {}
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn chunk_progress_logged_at_info() {
    let events = capture(|| {
        let report = BatchCloser::new(3).run(&[1, 2, 3, 4], &mut FailSecond(10));
        assert!(report.is_complete());
    });
    let infos: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::INFO)
        .collect();
    assert_eq!(infos.len(), 2);
    assert!(infos.iter().all(|e| e.message == "batch chunk closed"));
}

#[test]
fn failed_chunk_logged_once_at_warn() {
    let events = capture(|| {
        let report = BatchCloser::new(1).run(&[1, 2, 3], &mut FailSecond(0));
        assert_eq!(report.pending, vec![3]);
    });
    let warns: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warns.len(), 1);
    assert!(warns[0].message.contains("remaining chunks skipped"));
    assert_eq!(
        events
            .iter()
            .filter(|e| e.level == tracing::Level::INFO)
            .count(),
        1
    );
}
