//! Global logging module for ARF composition
//!
//! Provides thread-safe global logging with per-document diagnostic
//! collection, cargo-style summaries, and a small macro interface.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{DocumentContext, ErrorCollector, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

#[cfg(feature = "logging")]
pub use service::FacadeLogger;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static DOCUMENT_CONTEXT: RefCell<Option<DocumentContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the configured preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    init_global_logging_with_service(Arc::new(service::create_configured_service()))
}

/// Initialize with a custom service (facade bridge, tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// DOCUMENT CONTEXT MANAGEMENT
// ============================================================================

/// Set the document being processed on the current thread
pub fn set_document_context(document_path: PathBuf, role: &'static str) {
    let context = DocumentContext::new(document_path, role);

    if let Some(collector) = try_get_global_error_collector() {
        collector.record_document(&context);
    }

    DOCUMENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_document_context() {
    DOCUMENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with document context, restoring the previous one afterwards
pub fn with_document_context<F, R>(document_path: PathBuf, role: &'static str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_document_context();
    set_document_context(document_path, role);
    let result = f();
    DOCUMENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_document_context() -> Option<DocumentContext> {
    DOCUMENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn enrich(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if config::include_document_context() {
        if let Some(doc_ctx) = get_current_document_context() {
            event = event
                .with_document(&doc_ctx.document_path.display().to_string())
                .with_context("role", doc_ctx.role);
        }
    }

    event
}

/// Send an event to the global logger and the collector
pub fn dispatch(event: LogEvent) {
    if event.is_error() || event.is_warning() {
        if let (Some(collector), Some(doc_ctx)) = (
            try_get_global_error_collector(),
            get_current_document_context(),
        ) {
            collector.record_event(&doc_ctx.document_path, event.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if is_initialized() {
        dispatch(enrich(LogEvent::error(code, message), context));
    }
}

pub fn log_warning_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if is_initialized() {
        dispatch(enrich(LogEvent::warning_with_code(code, message), context));
    }
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if is_initialized() {
        dispatch(enrich(LogEvent::success(code, message), context));
    }
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    if is_initialized() {
        dispatch(enrich(LogEvent::info(message), context));
    }
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    if is_initialized() {
        dispatch(enrich(LogEvent::debug(message), context));
    }
}

// ============================================================================
// SUMMARIES
// ============================================================================

pub fn get_document_errors(document_path: &Path) -> Vec<LogEvent> {
    try_get_global_error_collector()
        .map(|collector| collector.get_document_errors(document_path))
        .unwrap_or_default()
}

/// Cargo-style summary of everything collected so far
pub fn cargo_style_summary() -> Option<String> {
    try_get_global_error_collector().map(collector::format_cargo_style_errors)
}

/// Collected errors that must abort processing, with their documents
pub fn critical_errors() -> Vec<(PathBuf, LogEvent)> {
    try_get_global_error_collector()
        .map(|collector| collector.get_critical_errors())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_context_management() {
        let path = PathBuf::from("results.xml");

        assert!(get_current_document_context().is_none());

        set_document_context(path.clone(), "results");
        let context = get_current_document_context();
        assert_eq!(context.map(|c| c.document_path), Some(path));

        clear_document_context();
        assert!(get_current_document_context().is_none());
    }

    #[test]
    fn test_with_document_context_restores_previous() {
        set_document_context(PathBuf::from("outer.xml"), "datastream");

        let result = with_document_context(PathBuf::from("inner.xml"), "results", || {
            let context = get_current_document_context();
            assert_eq!(context.map(|c| c.role), Some("results"));
            42
        });

        assert_eq!(result, 42);
        let context = get_current_document_context();
        assert_eq!(context.map(|c| c.role), Some("datastream"));
        clear_document_context();
    }

    #[test]
    fn test_logging_before_init_is_silent() {
        log_error_with_context(codes::system::INTERNAL_ERROR, "ignored", vec![]);
    }
}
