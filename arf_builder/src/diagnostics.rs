//! Non-fatal diagnostics gathered while composing

use arf_core::config::compile_time::composition::MAX_DIAGNOSTICS;
use arf_core::logging::{self, Code, LogEvent};

/// Ordered list of warnings and recoverable errors; each one is also
/// forwarded to the global logger when it is initialized
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    events: Vec<LogEvent>,
    dropped: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(&mut self, code: Code, message: &str, context: &[(&str, &str)]) {
        self.record(with_context(LogEvent::warning_with_code(code, message), context));
    }

    pub fn error(&mut self, code: Code, message: &str, context: &[(&str, &str)]) {
        self.record(with_context(LogEvent::error(code, message), context));
    }

    pub fn record(&mut self, event: LogEvent) {
        if self.events.len() < MAX_DIAGNOSTICS {
            self.events.push(event.clone());
        } else {
            self.dropped += 1;
        }
        logging::dispatch(event);
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<LogEvent> {
        self.events
    }

    /// Events that did not fit under the diagnostics limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn has_errors(&self) -> bool {
        self.events.iter().any(LogEvent::is_error)
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.events.iter().any(|event| event.code == code)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn with_context(event: LogEvent, context: &[(&str, &str)]) -> LogEvent {
    context
        .iter()
        .fold(event, |event, (key, value)| event.with_context(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arf_core::logging::codes;

    #[test]
    fn test_records_in_order_with_context() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning(
            codes::assets::INVALID_IPV6_ADDRESS,
            "not an IPv6 address",
            &[("address", "zz::1")],
        );
        diagnostics.error(codes::references::MISSING_TARGET_ANCHOR, "no anchor", &[]);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_code(codes::assets::INVALID_IPV6_ADDRESS));
        let first = &diagnostics.events()[0];
        assert!(first.is_warning());
        assert_eq!(first.context.get("address").map(String::as_str), Some("zz::1"));
    }
}
