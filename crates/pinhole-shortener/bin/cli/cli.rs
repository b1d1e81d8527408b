use clap::{Parser, Subcommand, ValueEnum};
use pinhole_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATA_FILE_ENV: &str = "PINHOLE_DATA_FILE";
pub const BASE_URL_ENV: &str = "PINHOLE_BASE_URL";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";

pub const DEFAULT_DATA_FILE: &str = "urls.json";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Pretty => write!(f, "pretty"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shorten a URL, reusing the existing code if it was shortened before.
    Shorten { url: String },
    /// Count a visit of a short code and print its target.
    Resolve { short_code: String },
    /// Print the statistics of a short code.
    Stats { short_code: String },
    /// Print every stored link.
    List,
}

#[derive(Debug, Parser)]
#[command(name = "pinhole", about = "Inspect and drive a pinhole link file")]
pub struct CLI {
    #[arg(long, env = DATA_FILE_ENV, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}
