use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used when `RUST_LOG` is not set. Only this crate's events are
/// shown, at `level` and above.
pub fn filter_directive(level: &str) -> String {
    format!("marks_recorder={}", level.to_ascii_lowercase())
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(level)))
}

pub fn init_cli_logger(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // 結構化輸出，方便收集到集中式日誌
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_follows_level() {
        assert_eq!(filter_directive("warn"), "marks_recorder=warn");
        assert_eq!(filter_directive("DEBUG"), "marks_recorder=debug");
        assert!(EnvFilter::try_new(filter_directive("error")).is_ok());
    }
}
