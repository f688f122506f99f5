//! Diagnostic trace sink.
//!
//! Recovery paths (local rebracketing, padding escalation) report short
//! messages through this interface instead of reading debug environment
//! variables. The default sink discards everything.

use std::sync::Mutex;

/// Receiver for diagnostic messages from search recovery paths.
pub trait TraceSink {
    fn event(&self, message: &str);
}

/// Default sink: discards all messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn event(&self, _message: &str) {}
}

/// Collecting sink for tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectTrace {
    messages: Mutex<Vec<String>>,
}

impl CollectTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl TraceSink for CollectTrace {
    fn event(&self, message: &str) {
        if let Ok(mut m) = self.messages.lock() {
            m.push(message.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_trace_records_in_order() {
        let t = CollectTrace::new();
        t.event("first");
        t.event("second");
        assert_eq!(t.messages(), vec!["first".to_owned(), "second".to_owned()]);
    }
}
