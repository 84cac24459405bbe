//! Logging utilities
//!
//! Helpers for structured logging with tracing: timing async calls and
//! scrubbing secrets from text before it reaches a log line.

use regex::Regex;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Log execution time of an async operation at debug level.
///
/// # Example
///
/// ```rust,ignore
/// use tooling::logging::timed;
///
/// let response = timed("classify", model.chat(request)).await;
/// ```
pub async fn timed<F, T>(name: &str, future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    debug!(operation = name, "Starting");

    let result = future.await;

    let elapsed = start.elapsed();
    debug!(operation = name, elapsed = %format_duration(elapsed), "Completed");

    result
}

/// Format duration in human-readable form
///
/// # Example
///
/// ```rust
/// use tooling::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_micros(500)), "500μs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1000)
    } else if micros < 60_000_000 {
        format!("{:.2}s", micros as f64 / 1_000_000.0)
    } else {
        let seconds = micros / 1_000_000;
        format!("{}m{}s", seconds / 60, seconds % 60)
    }
}

fn secret_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"(?i)(api[\s_-]?key|apikey)\s*[:=]\s*\S+", "$1: [REDACTED]"),
            (r"(?i)([?&]key=)[^&\s]+", "${1}[REDACTED]"),
            (r"(?i)(password|passwd|pwd)\s*[:=]\s*\S+", "$1: [REDACTED]"),
            (r"(?i)(token)\s*[:=]\s*\S+", "$1: [REDACTED]"),
            (r"(?i)(secret)\s*[:=]\s*\S+", "$1: [REDACTED]"),
            (
                r"(?i)(authorization|auth)\s*:\s*bearer\s+\S+",
                "$1: Bearer [REDACTED]",
            ),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|re| (re, replacement))
        })
        .collect()
    })
}

/// Sanitize string for logging (remove sensitive data)
///
/// # Example
///
/// ```rust
/// use tooling::logging::sanitize_for_logging;
///
/// let sanitized = sanitize_for_logging("API key: sk-abc123");
/// assert!(sanitized.contains("[REDACTED]"));
/// ```
pub fn sanitize_for_logging(input: &str) -> String {
    let mut result = input.to_string();

    for (re, replacement) in secret_patterns() {
        result = re.replace_all(&result, *replacement).into_owned();
    }

    result
}

/// Cut `input` to at most `max_chars` characters, marking the cut.
pub fn truncate_for_logging(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!(
            "{}… ({} chars total)",
            &input[..byte_index],
            input.chars().count()
        ),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(500)), "500μs");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m5s");
    }

    #[test]
    fn test_sanitize_api_key() {
        let sanitized = sanitize_for_logging("api_key=sk-1234567890");
        assert!(sanitized.contains("[REDACTED]"));
        assert!(!sanitized.contains("sk-1234567890"));
    }

    #[test]
    fn test_sanitize_query_key() {
        let url = "https://example.com/models/m:generateContent?key=AIzaSecret&alt=json";
        let sanitized = sanitize_for_logging(url);
        assert!(!sanitized.contains("AIzaSecret"));
        assert!(sanitized.contains("?key=[REDACTED]&alt=json"));
    }

    #[test]
    fn test_sanitize_bearer_token() {
        let sanitized = sanitize_for_logging("Authorization: Bearer abc.def.ghi");
        assert!(sanitized.contains("Bearer [REDACTED]"));
        assert!(!sanitized.contains("abc.def.ghi"));
    }

    #[test]
    fn test_sanitize_preserves_safe_data() {
        let input = r#"{"type": "tool_calling", "function": "createTodo"}"#;
        assert_eq!(sanitize_for_logging(input), input);
    }

    #[test]
    fn test_truncate_for_logging() {
        assert_eq!(truncate_for_logging("short", 10), "short");
        assert_eq!(truncate_for_logging("abcdef", 3), "abc… (6 chars total)");
        assert_eq!(truncate_for_logging("°°°°", 2), "°°… (4 chars total)");
    }

    #[tokio::test]
    async fn test_timed() {
        let result = timed("test_operation", async { 42 }).await;
        assert_eq!(result, 42);
    }
}
