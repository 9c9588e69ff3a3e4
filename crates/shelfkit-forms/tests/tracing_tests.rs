#![forbid(unsafe_code)]

//! Logging contract of the form registry.

use std::sync::{Arc, Mutex};

use shelfkit_core::AccessMode;
use shelfkit_forms::entities::physical_inventory::CountLocation;
use shelfkit_forms::{EntityKind, FormGroup, FormOptions, FormRegistry, ModelRef};

use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: Vec<(String, String)>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    spans: Arc<Mutex<Vec<String>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: visitor.0,
        });
    }

    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.spans
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
    }
}

fn capture<F: FnOnce()>(f: F) -> (Vec<CapturedEvent>, Vec<String>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let spans = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
        spans: Arc::clone(&spans),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    let spans = spans.lock().unwrap().clone();
    (events, spans)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn overwrite_logs_warning() {
    let (events, _) = capture(|| {
        let mut registry = FormRegistry::with_defaults();
        registry.register(
            EntityKind::CountLocation,
            |_: &FormRegistry, _: ModelRef<'_>, _: &FormOptions| Ok(FormGroup::new()),
        );
    });
    let warnings: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("re-registered"));
    assert!(
        warnings[0]
            .fields
            .iter()
            .any(|(k, v)| k == "entity" && v.contains("CountLocation"))
    );
}

#[test]
fn first_registration_is_quiet() {
    let (events, _) = capture(|| {
        let _ = FormRegistry::with_defaults();
    });
    assert!(events.iter().all(|e| e.level != tracing::Level::WARN));
    assert_eq!(
        events
            .iter()
            .filter(|e| e.level == tracing::Level::DEBUG)
            .count(),
        EntityKind::ALL.len()
    );
}

#[test]
fn build_runs_inside_span() {
    let (events, spans) = capture(|| {
        let registry = FormRegistry::with_defaults();
        let location = CountLocation::default();
        registry
            .build((&location).into(), &FormOptions::new(AccessMode::View))
            .unwrap();
    });
    assert!(spans.iter().any(|s| s == "form.build"));
    assert!(events.iter().any(|e| e.message.contains("form built")));
}
