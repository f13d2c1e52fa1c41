#![deny(missing_docs)]
//! Shared logging utilities for the feedview workspace.
//!
//! This crate provides the `feed_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! feed_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! feed_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! feed_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! feed_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! feed_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Shortens a URL for log lines so very long data URLs do not flood the output.
pub fn loggable_url(url: &str) -> String {
    const MAX: usize = 120;
    if url.len() <= MAX {
        return url.to_string();
    }
    let mut end = MAX;
    while end > 0 && !url.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...({} bytes)", &url[..end], url.len())
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Trace in debug builds so admission decisions show up in failing tests.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::loggable_url;

    #[test]
    fn short_urls_are_untouched() {
        assert_eq!(loggable_url("https://a.example/x.jpg"), "https://a.example/x.jpg");
    }

    #[test]
    fn long_urls_are_truncated_with_length() {
        let url = format!("data:image/png;base64,{}", "A".repeat(400));
        let logged = loggable_url(&url);
        assert!(logged.starts_with("data:image/png;base64,AAA"));
        assert!(logged.ends_with(&format!("({} bytes)", url.len())));
    }
}
