use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Output format selected by `logging.format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-line, for local development
    Pretty,
    /// Single-line text
    Full,
}

impl LogFormat {
    pub fn from_setting(format: &str) -> Self {
        match format.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Full,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level when set. `format` picks the
/// formatter: "json", "pretty", or single-line text for anything else.
/// Fails if a global subscriber is already installed.
pub fn init_tracing(
    settings: &LoggingSettings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match LogFormat::from_setting(&settings.format) {
        LogFormat::Json => subscriber.json().try_init(),
        LogFormat::Pretty => subscriber.pretty().try_init(),
        LogFormat::Full => subscriber.try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_selection() {
        assert_eq!(LogFormat::from_setting(&LoggingSettings::default().format), LogFormat::Json);
        assert_eq!(LogFormat::from_setting("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_setting("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_setting("compact"), LogFormat::Full);
        assert_eq!(LogFormat::from_setting(""), LogFormat::Full);
    }

    #[test]
    fn test_second_init_fails() {
        let settings = LoggingSettings {
            level: "not a directive [".to_string(),
            format: "json".to_string(),
        };

        let _ = init_tracing(&settings);
        assert!(init_tracing(&LoggingSettings::default()).is_err());
    }
}
