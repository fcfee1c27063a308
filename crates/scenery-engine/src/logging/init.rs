use std::sync::Once;

/// GPU stack modules that log per-frame detail at info; capped at warn by default.
const GPU_MODULES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "scenery_engine=debug,scenery_world=trace"). When neither it nor
/// `RUST_LOG` is set, `default_level` applies to the scenery crates and the
/// GPU stack is held to warnings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// Filter string for `config`, given the value of `RUST_LOG` (if any).
fn filter_directives(config: &LoggingConfig, rust_log: Option<String>) -> String {
    if let Some(explicit) = config.env_filter.clone().or(rust_log) {
        return explicit;
    }

    let level = config.default_level;
    let gpu_level = level.min(log::LevelFilter::Warn);
    let mut directives = level.as_str().to_ascii_lowercase();
    for module in GPU_MODULES {
        directives.push_str(&format!(",{module}={}", gpu_level.as_str().to_ascii_lowercase()));
    }
    directives
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let directives = filter_directives(&config, std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&directives);
        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized ({directives})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_caps_gpu_modules_at_warn() {
        let directives = filter_directives(&LoggingConfig::default(), None);
        assert_eq!(directives, "info,wgpu_core=warn,wgpu_hal=warn,naga=warn");
    }

    #[test]
    fn quiet_default_level_also_quiets_gpu() {
        let config = LoggingConfig { default_level: log::LevelFilter::Error, ..LoggingConfig::default() };
        assert_eq!(filter_directives(&config, None), "error,wgpu_core=error,wgpu_hal=error,naga=error");
    }

    #[test]
    fn explicit_filter_beats_rust_log() {
        let config = LoggingConfig {
            env_filter: Some("scenery_world=trace".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_directives(&config, Some("warn".to_string())), "scenery_world=trace");
        assert_eq!(filter_directives(&LoggingConfig::default(), Some("warn".to_string())), "warn");
    }
}
