use crate::domain::patcher::SkipEvent;
use crate::domain::ports::DiagnosticsSink;

/// Diagnostics sink that forwards skip events to the `tracing` subscriber.
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsSink for TracingDiagnostics {
    fn skip(&self, event: &SkipEvent) {
        tracing::warn!(
            file = %event.file,
            category = %event.category,
            reason = %event.reason,
            "request skipped"
        );
    }
}

/// Sink that records events in memory; used by tests and dry runs.
#[derive(Default)]
pub struct CollectingDiagnostics {
    events: std::sync::Mutex<Vec<SkipEvent>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SkipEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DiagnosticsSink for CollectingDiagnostics {
    fn skip(&self, event: &SkipEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
