//! Logging config and utilities
//!
//! Stdout carries the MCP stdio transport, so logs go to stderr unless a
//! file path is configured.

mod defaults;
mod format_style;
mod log_rotation_kind;
mod parsers;

use std::path::PathBuf;

use format_style::FormatStyle;
use log_rotation_kind::LogRotationKind;
use serde::Deserialize;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
#[cfg(test)]
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer as LayerTrait, Registry};

/// Logging related options
#[derive(Debug, Deserialize)]
pub struct Logging {
    /// The log level to use for tracing
    #[serde(
        default = "defaults::log_level",
        deserialize_with = "parsers::from_str"
    )]
    pub level: Level,

    /// The directory to write rolling log files to
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Log file rotation period to use when log file path provided
    #[serde(default = "defaults::default_rotation")]
    pub rotation: LogRotationKind,

    #[serde(default)]
    pub format: FormatStyle,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            path: None,
            rotation: defaults::default_rotation(),
            format: Default::default(),
        }
    }
}

type LoggingLayerResult = (
    Box<dyn LayerTrait<Registry> + Send + Sync>,
    Option<WorkerGuard>,
);

pub struct LoggingLayerBuilder {
    writer: Option<BoxMakeWriter>,
    worker_guard: Option<WorkerGuard>,
    ansi_enabled: bool,
}

impl LoggingLayerBuilder {
    pub fn new() -> Self {
        Self {
            writer: None,
            worker_guard: None,
            ansi_enabled: false,
        }
    }

    #[cfg(test)]
    fn with_writer<W>(mut self, mw: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.writer = Some(BoxMakeWriter::new(mw));
        self
    }

    pub fn build(mut self, logging: &Logging) -> Result<LoggingLayerResult, anyhow::Error> {
        if self.writer.is_none() {
            let (writer, guard, with_ansi) = Self::build_writer(logging);
            self.writer = Some(writer);
            self.worker_guard = guard;
            self.ansi_enabled = with_ansi;
        }

        let Some(writer) = self.writer else {
            return Err(anyhow::Error::msg("No log writer set"));
        };

        let layer = tracing_subscriber::fmt::layer();
        let formatted_layer = match logging.format {
            FormatStyle::Full => layer
                .with_writer(writer)
                .with_ansi(self.ansi_enabled)
                .with_target(false)
                .boxed(),
            FormatStyle::Compact => layer
                .compact()
                .with_writer(writer)
                .with_ansi(self.ansi_enabled)
                .with_target(false)
                .boxed(),
            FormatStyle::Json => layer
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .boxed(),
            FormatStyle::Pretty => layer
                .pretty()
                .with_writer(writer)
                .with_ansi(self.ansi_enabled)
                .with_target(false)
                .boxed(),
        };

        Ok((formatted_layer, self.worker_guard))
    }

    fn build_writer(logging: &Logging) -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
        let Some(path) = logging.path.as_ref() else {
            return (BoxMakeWriter::new(std::io::stderr), None, true);
        };

        let appender = std::fs::create_dir_all(path)
            .map_err(|e| e.to_string())
            .and_then(|_| {
                RollingFileAppender::builder()
                    .rotation(logging.rotation.into())
                    .filename_prefix("graphql_mcp_server")
                    .filename_suffix("log")
                    .build(path)
                    .map_err(|e| e.to_string())
            });

        match appender {
            Ok(appender) => {
                let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);
                (BoxMakeWriter::new(non_blocking_appender), Some(guard), false)
            }
            Err(e) => {
                // No subscriber exists yet to report this through
                eprintln!("Failed to setup logging: {e}. Falling back to stderr");
                (BoxMakeWriter::new(std::io::stderr), None, true)
            }
        }
    }
}

impl Logging {
    pub fn env_filter(logging: &Logging) -> Result<EnvFilter, anyhow::Error> {
        let mut env_filter = EnvFilter::from_default_env().add_directive(logging.level.into());

        if logging.level == Level::INFO {
            env_filter = env_filter.add_directive("rmcp=warn".parse()?);
        }
        Ok(env_filter)
    }
}
