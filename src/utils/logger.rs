use tracing_subscriber::filter::{Directive, EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

/// Environment variable holding the default log level
pub const LOG_ENV: &str = "MEMORY_BOOK_LOG";

/// Targets kept quiet unless RUST_LOG asks for them
const QUIET_TARGETS: [&str; 4] = [
    "wgpu_core=error",
    "wgpu_hal=error",
    "bevy_render=error",
    "naga=warn",
];

/// Timer that prints nothing, keeping log lines short
struct EmptyTime;

impl FormatTime for EmptyTime {
    fn format_time(&self, _: &mut format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

/// Directives for a level string, falling back to `warn` when it does not parse
fn directives(level: &str) -> Vec<Directive> {
    let default = level.parse().unwrap_or_else(|_| {
        eprintln!("Ignoring invalid {LOG_ENV} value '{level}', using warn");
        Directive::from(LevelFilter::WARN)
    });
    std::iter::once(default)
        .chain(QUIET_TARGETS.iter().filter_map(|d| d.parse().ok()))
        .collect()
}

/// Installs a colored logger without timestamps.
///
/// Use MEMORY_BOOK_LOG=info or MEMORY_BOOK_LOG=debug to increase verbosity.
/// `debug` lowers the default to debug as if MEMORY_BOOK_LOG=debug was set.
pub fn init_custom_logger(debug: bool) {
    let default_level = if debug {
        "debug".to_string()
    } else {
        std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_string())
    };

    let format = format()
        .with_timer(EmptyTime)
        .with_level(true)
        .with_target(true)
        .with_ansi(true);

    let filter = directives(&default_level)
        .into_iter()
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_filter(filter),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_levels_fall_back_to_warn() {
        let parsed = directives("memory_book=loud");
        assert_eq!(parsed.len(), 1 + QUIET_TARGETS.len());
        assert_eq!(parsed[0].to_string(), "warn");
    }

    #[test]
    fn quiet_targets_follow_the_default() {
        let parsed: Vec<String> = directives("debug").iter().map(|d| d.to_string()).collect();
        assert_eq!(parsed[0], "debug");
        assert!(parsed.contains(&"wgpu_core=error".to_string()));
    }
}
