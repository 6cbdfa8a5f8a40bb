use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::RwLock;
use std::time::{Duration, Instant};

static SERVICE_LOGGER: Lazy<ServiceLogger> = Lazy::new(ServiceLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::from_env())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level.to_level_filter();
    SERVICE_LOGGER.update_config(config);

    log::set_logger(&*SERVICE_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }

    pub fn from_log_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// One emitted line, serialized as-is in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl LogLine {
    fn from_record(record: &Record) -> Self {
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        };
        Self {
            timestamp: Utc::now(),
            level: LogLevel::from_log_level(record.level()),
            target: record.target().to_string(),
            message: record.args().to_string(),
            location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_target: bool,
    pub show_file_location: bool,
    pub output_json: bool,
    pub timestamp_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_target: true,
            show_file_location: false,
            output_json: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }

    /// `LOG_FORMAT=json` selects the production layout; `LOG_LEVEL` overrides
    /// the minimum level of either layout.
    pub fn from_env() -> Self {
        let json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let base = if json {
            Self::production()
        } else {
            Self::default()
        };
        match std::env::var("LOG_LEVEL").ok().and_then(|v| v.parse().ok()) {
            Some(level) => base.with_level(level),
            None => base,
        }
    }
}

pub struct ServiceLogger {
    config: RwLock<LoggerConfig>,
}

impl ServiceLogger {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(LoggerConfig::default()),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        if let Ok(mut config) = self.config.write() {
            *config = new_config;
        }
    }

    fn format_line(&self, line: &LogLine, config: &LoggerConfig) -> String {
        let mut output = String::new();

        let timestamp = line.timestamp.format(&config.timestamp_format).to_string();
        let level = if config.show_emojis {
            format!("{} {}", line.level.emoji(), line.level.as_str())
        } else {
            line.level.as_str().to_string()
        };

        if config.show_colors {
            output.push_str(&format!("{} ", timestamp.bright_black()));
            output.push_str(&format!("[{}] ", level.color(line.level.color()).bold()));
        } else {
            output.push_str(&format!("{} [{}] ", timestamp, level));
        }

        if config.show_target && !line.target.is_empty() {
            if config.show_colors {
                output.push_str(&format!("{}: ", line.target.bright_blue()));
            } else {
                output.push_str(&format!("{}: ", line.target));
            }
        }

        output.push_str(&line.message);

        if config.show_file_location {
            if let Some(location) = &line.location {
                if config.show_colors {
                    output.push_str(&format!(" ({})", location.bright_black()));
                } else {
                    output.push_str(&format!(" ({})", location));
                }
            }
        }

        output
    }
}

impl Default for ServiceLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for ServiceLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.read() {
            Ok(config) => LogLevel::from_log_level(metadata.level()) >= config.min_level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = LogLine::from_record(record);
        if let Ok(config) = self.config.read() {
            let rendered = if config.output_json {
                serde_json::to_string(&line).unwrap_or_default()
            } else {
                self.format_line(&line, &config)
            };
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", rendered);
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Logs how long a request stage took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
    request_id: Option<String>,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        Self {
            start: Instant::now(),
            name: name.to_string(),
            request_id: None,
        }
    }

    pub fn for_request(name: &str, request_id: &str) -> Self {
        Self {
            start: Instant::now(),
            name: name.to_string(),
            request_id: Some(request_id.to_string()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let millis = self.elapsed().as_millis();
        match &self.request_id {
            Some(id) => log::info!("⏱️  {} finished in {}ms [req:{}]", self.name, millis, id),
            None => log::info!("⏱️  {} finished in {}ms", self.name, millis),
        }
    }
}

pub fn log_startup_info(app_name: &str, version: &str, host: &str, port: u16) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🌐 Listening on http://{}:{}", host, port);
}

pub fn log_config_info(config: &crate::config::Config) {
    let present = |key: &Option<String>| if key.is_some() { "✅" } else { "❌" };
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Body limit: {} MB", config.body_limit_mb);
    log::info!("   Remote call timeout: {}s", config.request_timeout_secs);
    log::info!(
        "   Prompt model: {} (key {})",
        config.anthropic.model,
        present(&config.anthropic.api_key)
    );
    log::info!(
        "   Image provider: {:?} (key {})",
        config.image_provider,
        present(&config.google.api_key)
    );
}
