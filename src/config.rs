//! Configuration loading.
//!
//! Project settings live in `hourglass.toml` at the repository root and the
//! accounts in `accounts.toml` under the user configuration directory.
//! Both are TOML and both are optional:
//!
//! ```toml
//! [project]
//! name = "acme"
//!
//! [project.issue_tracker]
//! url = "https://acme.atlassian.net/"
//! project_id = "10001"
//! transitions = { in_progress = "21", done = "31" }
//!
//! [settings]
//! enable_git = true
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::task::{
    adapters::git::DEFAULT_GITHUB_API_URL,
    domain::{Accounts, Project},
    services::{Invocation, WorkflowSettings},
};

/// Project configuration file name.
pub const CONFIG_FILE_NAME: &str = "hourglass.toml";
/// Accounts file name.
pub const ACCOUNTS_FILE_NAME: &str = "accounts.toml";
/// Directory name used under the user config and data directories.
pub const APP_DIR_NAME: &str = "hourglass";
/// Overrides the project configuration path.
pub const CONFIG_ENV: &str = "HOURGLASS_CONFIG";
/// Overrides the accounts file path.
pub const ACCOUNTS_ENV: &str = "HOURGLASS_ACCOUNTS";
/// Overrides the task data directory.
pub const DATA_DIR_ENV: &str = "HOURGLASS_DATA_DIR";
/// When set, git operations are disabled.
pub const TEST_ENV: &str = "HOURGLASS_TEST";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("could not read {path}: {source}")]
    Read {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
    /// A configuration file is not valid TOML for its schema.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// A required directory could not be determined.
    #[error("could not determine the {0} directory")]
    MissingDirectory(&'static str),
    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

/// Global settings from the `[settings]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether git operations run.
    pub enable_git: bool,
    /// GitHub REST API root.
    pub github_api_url: String,
    /// Directory holding `tasks.json`.
    pub data_dir: Option<Utf8PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_git: true,
            github_api_url: DEFAULT_GITHUB_API_URL.to_owned(),
            data_dir: None,
        }
    }
}

/// Contents of `hourglass.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Project settings.
    pub project: Project,
    /// Global settings.
    pub settings: Settings,
}

/// Environment values consulted while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    /// Value of [`CONFIG_ENV`].
    pub config: Option<Utf8PathBuf>,
    /// Value of [`ACCOUNTS_ENV`].
    pub accounts: Option<Utf8PathBuf>,
    /// Value of [`DATA_DIR_ENV`].
    pub data_dir: Option<Utf8PathBuf>,
    /// Whether [`TEST_ENV`] is set.
    pub test_mode: bool,
}

impl ConfigEnv {
    /// Reads the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        let path = |name: &str| std::env::var(name).ok().map(Utf8PathBuf::from);
        Self {
            config: path(CONFIG_ENV),
            accounts: path(ACCOUNTS_ENV),
            data_dir: path(DATA_DIR_ENV),
            test_mode: std::env::var_os(TEST_ENV).is_some(),
        }
    }
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Inputs for the lifecycle engine.
    pub invocation: Invocation,
    /// GitHub REST API root.
    pub github_api_url: String,
    /// Directory holding `tasks.json`.
    pub data_dir: Utf8PathBuf,
}

impl Config {
    /// Loads configuration, preferring `explicit` over the environment for
    /// the project file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a file exists but cannot be read or
    /// parsed, or when default directories cannot be determined.
    pub fn load(explicit: Option<&Utf8Path>, env: &ConfigEnv) -> Result<Self, ConfigError> {
        let config_path = match explicit.or(env.config.as_deref()) {
            Some(path) => path.to_owned(),
            None => current_dir()?.join(CONFIG_FILE_NAME),
        };
        let file = match read_optional(&config_path)? {
            Some(contents) => parse_config(&contents, &config_path)?,
            None => ConfigFile::default(),
        };

        let accounts_path = match &env.accounts {
            Some(path) => path.clone(),
            None => app_dir(dirs::config_dir(), "config")?.join(ACCOUNTS_FILE_NAME),
        };
        let accounts = match read_optional(&accounts_path)? {
            Some(contents) => parse_accounts(&contents, &accounts_path)?,
            None => Accounts::default(),
        };

        let data_dir = match env.data_dir.clone().or_else(|| file.settings.data_dir.clone()) {
            Some(path) => path,
            None => app_dir(dirs::data_dir(), "data")?,
        };
        let base_dir = config_path
            .parent()
            .map_or_else(Utf8PathBuf::new, Utf8Path::to_owned);
        Ok(Self::from_parts(file, accounts, &base_dir, data_dir, env.test_mode))
    }

    /// Assembles a configuration from already parsed parts.
    ///
    /// A blank project folder defaults to `base_dir`; `test_mode` forces git
    /// off.
    #[must_use]
    pub fn from_parts(
        file: ConfigFile,
        accounts: Accounts,
        base_dir: &Utf8Path,
        data_dir: Utf8PathBuf,
        test_mode: bool,
    ) -> Self {
        let ConfigFile {
            mut project,
            settings,
        } = file;
        if project.folder_path.as_str().is_empty() {
            base_dir.clone_into(&mut project.folder_path);
        } else if project.folder_path.is_relative() {
            project.folder_path = base_dir.join(&project.folder_path);
        }
        Self {
            invocation: Invocation {
                project,
                accounts,
                settings: WorkflowSettings {
                    enable_git: settings.enable_git && !test_mode,
                },
            },
            github_api_url: settings.github_api_url,
            data_dir,
        }
    }
}

/// Parses `hourglass.toml` contents.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for invalid TOML or schema mismatches.
pub fn parse_config(contents: &str, path: &Utf8Path) -> Result<ConfigFile, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Parses `accounts.toml` contents.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for invalid TOML or schema mismatches.
pub fn parse_accounts(contents: &str, path: &Utf8Path) -> Result<Accounts, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

fn read_optional(path: &Utf8Path) -> Result<Option<String>, ConfigError> {
    let read_error = |source: std::io::Error| ConfigError::Read {
        path: path.to_owned(),
        source: Arc::new(source),
    };
    let Some(file_name) = path.file_name() else {
        return Ok(None);
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(read_error(err)),
    };
    match dir.read_to_string(file_name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(read_error(err)),
    }
}

fn current_dir() -> Result<Utf8PathBuf, ConfigError> {
    let dir = std::env::current_dir().map_err(|_| ConfigError::MissingDirectory("current"))?;
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|path| ConfigError::NonUtf8Path(path.display().to_string()))
}

fn app_dir(
    base: Option<std::path::PathBuf>,
    kind: &'static str,
) -> Result<Utf8PathBuf, ConfigError> {
    let base = base.ok_or(ConfigError::MissingDirectory(kind))?;
    let utf8 = Utf8PathBuf::from_path_buf(base)
        .map_err(|path| ConfigError::NonUtf8Path(path.display().to_string()))?;
    Ok(utf8.join(APP_DIR_NAME))
}
