use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FIREBASE_PROJECT: &str = "fgscoretracker";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LocalStoreKind {
    File,
    Sqlite,
    Memory,
}

impl LocalStoreKind {
    #[must_use]
    pub fn default_path(self) -> PathBuf {
        match self {
            LocalStoreKind::File => PathBuf::from("fg-scorecard-data"),
            LocalStoreKind::Sqlite => PathBuf::from("fg-scorecard.sqlite"),
            LocalStoreKind::Memory => PathBuf::new(),
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Disc golf scorecard", long_about = None)]
pub struct Cli {
    /// TOML file with any of the options below. Command-line values win.
    #[arg(long, value_name = "PATH")]
    pub config_toml: Option<PathBuf>,
    /// Course catalog JSON; the built-in catalog is used when absent.
    #[arg(long, value_name = "PATH")]
    pub courses_json: Option<PathBuf>,
    /// Where rounds are kept while signed out.
    #[arg(long, value_enum)]
    pub local_store: Option<LocalStoreKind>,
    /// Directory for `file`, database file for `sqlite`.
    #[arg(long, value_name = "PATH")]
    pub local_path: Option<PathBuf>,
    #[arg(long, value_name = "KEY")]
    pub firebase_api_key: Option<String>,
    #[arg(long, value_name = "PROJECT_ID")]
    pub firebase_project: Option<String>,
    #[arg(long, value_name = "SECONDS")]
    pub remote_timeout_secs: Option<u64>,
    /// Keep accounts and cloud rounds in memory for this run only.
    #[arg(long)]
    pub offline: bool,
    /// Default tracing filter when RUST_LOG is unset.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub courses_json: Option<PathBuf>,
    pub local_store: Option<LocalStoreKind>,
    pub local_path: Option<PathBuf>,
    pub firebase_api_key: Option<String>,
    pub firebase_project: Option<String>,
    pub remote_timeout_secs: Option<u64>,
    pub offline: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub courses_json: Option<PathBuf>,
    pub local_store: LocalStoreKind,
    pub local_path: PathBuf,
    /// `None` means accounts and cloud rounds are kept in memory.
    pub firebase: Option<FirebaseConfig>,
    pub remote_timeout: Duration,
    pub log_level: String,
}

/// # Errors
/// Returns an error if the TOML file cannot be read or parsed.
pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config toml {}", path.display()))?;
    toml::from_str::<FileConfig>(&contents)
        .with_context(|| format!("parse config toml {}", path.display()))
}

/// Merges command line, optional TOML file and defaults, in that order of precedence.
///
/// # Errors
/// Returns an error for an unreadable config file or a zero timeout.
pub fn load_config(cli: Cli) -> Result<AppConfig> {
    let file = match cli.config_toml.as_deref() {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    let local_store = cli
        .local_store
        .or(file.local_store)
        .unwrap_or(LocalStoreKind::File);
    let local_path = cli
        .local_path
        .or(file.local_path)
        .unwrap_or_else(|| local_store.default_path());

    let timeout_secs = cli
        .remote_timeout_secs
        .or(file.remote_timeout_secs)
        .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS);
    if timeout_secs == 0 {
        bail!("remote timeout must be at least one second");
    }

    let offline = cli.offline || file.offline.unwrap_or(false);
    let api_key = cli
        .firebase_api_key
        .or(file.firebase_api_key)
        .filter(|k| !k.trim().is_empty());
    let firebase = match (offline, api_key) {
        (false, Some(api_key)) => Some(FirebaseConfig {
            api_key,
            project_id: cli
                .firebase_project
                .or(file.firebase_project)
                .unwrap_or_else(|| DEFAULT_FIREBASE_PROJECT.to_string()),
        }),
        _ => None,
    };

    Ok(AppConfig {
        courses_json: cli.courses_json.or(file.courses_json),
        local_store,
        local_path,
        firebase,
        remote_timeout: Duration::from_secs(timeout_secs),
        log_level: cli
            .log_level
            .or(file.log_level)
            .unwrap_or_else(|| "warn".to_string()),
    })
}
