use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use docintel_core::{DocumentId, ExportFormat, Preferences, SummaryLength, SummaryType};
use docintel_engine::{ApiSettings, EngineConfig, PhasePacing, DEFAULT_API_BASE_URL};
use docintel_logging::LogDestination;
use log::LevelFilter;

/// Legacy variable read when `DOCINTEL_API_BASE_URL` is not set.
pub const LEGACY_BASE_URL_ENV: &str = "VITE_API_BASE_URL";

#[derive(Parser, Debug)]
#[command(
    name = "docintel",
    version,
    about = "Upload documents to a document-intelligence backend, then summarize, analyze and export them."
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the backend is reachable.
    Health,
    /// Upload a file, then summarize, analyze and save it.
    Process {
        file: PathBuf,
        /// Also export the result in this format.
        #[arg(long, value_parser = parse_export_format)]
        export: Option<ExportFormat>,
    },
    /// Upload a file and summarize it.
    Summarize { file: PathBuf },
    /// Upload a file and analyze it.
    Analyze { file: PathBuf },
    /// List saved documents, optionally filtered by a search query.
    History { query: Option<String> },
    /// Show a saved document.
    Show { id: DocumentId },
    /// Delete a saved document.
    Delete { id: DocumentId },
    /// Show aggregate statistics.
    Stats,
    /// List documents kept locally after a failed backend save.
    LocalSaves,
    /// Interactive session.
    Shell,
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Backend base url [default: http://127.0.0.1:4000]
    #[arg(long, global = true, env = "DOCINTEL_API_BASE_URL")]
    pub api_base_url: Option<String>,

    #[arg(long, global = true, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    #[arg(long, global = true, default_value_t = 120)]
    pub request_timeout_secs: u64,

    /// Minimum time each processing phase stays visible.
    #[arg(long, global = true, default_value_t = 400)]
    pub phase_delay_ms: u64,

    /// Where exported files are written [default: current directory]
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,

    /// Directory for local state such as the local mirror.
    #[arg(long, global = true, default_value = "./.docintel")]
    pub data_dir: PathBuf,

    /// Keep a local copy of documents the backend failed to save.
    #[arg(long, global = true)]
    pub local_mirror: bool,

    #[arg(long, global = true, default_value = "standard", value_parser = parse_summary_type)]
    pub summary_type: SummaryType,

    #[arg(long, global = true, default_value = "medium", value_parser = parse_length)]
    pub length: SummaryLength,

    /// Do not summarize right after upload.
    #[arg(long, global = true)]
    pub no_auto_summarize: bool,

    /// Do not analyze right after upload or after a summary.
    #[arg(long, global = true)]
    pub no_auto_analyze: bool,

    /// Do not save to the backend at the end of processing.
    #[arg(long, global = true)]
    pub no_auto_save: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[arg(long, global = true, value_enum, default_value_t = LogTarget::File)]
    pub log_to: LogTarget,

    /// Log file path [default: ./docintel.log]
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

impl Settings {
    /// `--api-base-url`, then `DOCINTEL_API_BASE_URL`, then the legacy
    /// variable, then the default.
    pub fn base_url(&self) -> String {
        self.api_base_url
            .clone()
            .or_else(|| std::env::var(LEGACY_BASE_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            auto_summarize: !self.no_auto_summarize,
            auto_analyze: !self.no_auto_analyze,
            analyze_after_summarize: !self.no_auto_analyze,
            auto_save: !self.no_auto_save,
            summary_type: self.summary_type,
            length: self.length,
            local_mirror: self.local_mirror,
        }
    }

    /// Settings for commands that run one manual step after upload. The
    /// manual summarize saves on its own, so processing must not.
    pub fn single_step(&self) -> Self {
        Self {
            no_auto_summarize: true,
            no_auto_analyze: true,
            no_auto_save: true,
            ..self.clone()
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api: ApiSettings {
                base_url: self.base_url(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                ..ApiSettings::default()
            },
            pacing: PhasePacing {
                min_visible: Duration::from_millis(self.phase_delay_ms),
            },
            download_dir: self
                .download_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn parse_summary_type(value: &str) -> Result<SummaryType, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn parse_length(value: &str) -> Result<SummaryLength, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn parse_export_format(value: &str) -> Result<ExportFormat, String> {
    value.parse().map_err(|err| format!("{err}"))
}
