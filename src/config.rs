use gate::PolicyConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub batching: PolicyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub output: LoggingOutput,
    pub level: LogLevel,
    pub include_source: bool,
    pub file: FileLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output: LoggingOutput::Stdout,
            level: LogLevel::Info,
            include_source: true,
            file: FileLoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingOutput {
    Stdout,
    File,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub dir: String,
    pub file_name: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dir: "./logs".to_string(),
            file_name: "fluxgate.log".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_required(
        path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("failed to read config file {}: {}", path.display(), err))?;
        let cfg: AppConfig = serde_yaml::from_str(&raw)
            .map_err(|err| format!("failed to parse yaml config {}: {}", path.display(), err))?;
        Ok(cfg)
    }

    pub fn load_optional(
        path: impl AsRef<Path>,
    ) -> Result<Option<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::load_required(path)?))
    }
}
