//! Configuration for dataset refresh paths and step commands.
//!
//! Configuration sources (highest priority first):
//! 1. CLI flags / environment variables (LISTINGS_REFRESH_ROOT, ANTHROPIC_API_KEY)
//! 2. Config file (.listings-refresh/config.yaml)
//! 3. Defaults matching the repository layout (build/ scripts, data/ output)
//!
//! Config file discovery:
//! - With an explicit root, only <root>/.listings-refresh/config.yaml is read
//! - Otherwise searches the current directory and parents
//! - Paths in the config file are relative to the project root, the parent
//!   of the .listings-refresh/ directory

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::DatasetLayout;

/// Directory holding the config file, relative to the project root
pub const CONFIG_DIR: &str = ".listings-refresh";
/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.yaml";
/// Environment variable carrying the scraper credential
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the project root
pub const ROOT_ENV: &str = "LISTINGS_REFRESH_ROOT";

const DEFAULT_DATASET: &str = "data/companies.json";
const DEFAULT_CLEANED_ARTIFACT: &str = "data/companies.json.cleaned";
const DEFAULT_CLEANED_OUTPUT: &str = "data/companies_cleaned.json";
const DEFAULT_PROGRAM: &str = "python3";
const DEFAULT_SCRAPER: &str = "scraper.py";
const DEFAULT_SCRAPER_DIR: &str = "build";
const DEFAULT_CLEANER: &str = "build/clean_data.py";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
    #[serde(default)]
    pub clean: Option<CleanConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Dataset written by the scraper
    pub dataset: Option<String>,
    /// File the cleaner writes its output to
    pub cleaned_artifact: Option<String>,
    /// Where the cleaned artifact is moved after a successful clean
    pub cleaned_output: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    /// Working directory for the scraper (relative to project root)
    pub working_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanConfig {
    pub program: Option<String>,
    /// Cleaner script; its presence decides whether cleaning runs
    pub script: Option<String>,
}

/// A program to run, with absolute working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Project root all relative paths were resolved against
    pub root: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Dataset file locations
    pub layout: DatasetLayout,
    /// Scraper command
    pub fetch: CommandSpec,
    /// Cleaner command (the script path is its last argument)
    pub clean: CommandSpec,
}

/// Scraper credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from a CLI/env value, rejecting empty strings
    pub fn from_option(value: Option<String>) -> Result<Self> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self(key)),
            _ => anyhow::bail!(
                "{} is not set; pass --api-key or export the variable",
                API_KEY_ENV
            ),
        }
    }

    /// The raw key, for handing to the scraper
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if self.0.chars().count() > 8 {
            write!(f, "****{}", tail)
        } else {
            write!(f, "****")
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.is_file() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Project root owning a discovered config file (grandparent of config.yaml)
fn root_of(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Anchor a relative project root at the current directory
fn absolute_root(root: &Path) -> Result<PathBuf> {
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(cwd.join(root))
}

/// Combine a root, an optional parsed config file and the defaults
pub fn resolve(root: &Path, config: Option<&ConfigFile>, config_file: Option<PathBuf>) -> ResolvedConfig {
    let paths = config.map(|c| c.paths.clone()).unwrap_or_default();
    let fetch = config.and_then(|c| c.fetch.as_ref());
    let clean = config.and_then(|c| c.clean.as_ref());

    let path_or = |value: &Option<String>, default: &str| {
        resolve_path(root, value.as_deref().unwrap_or(default))
    };

    let cleaner_script = path_or(&clean.and_then(|c| c.script.clone()), DEFAULT_CLEANER);

    let layout = DatasetLayout {
        dataset: path_or(&paths.dataset, DEFAULT_DATASET),
        cleaner_script: cleaner_script.clone(),
        cleaned_artifact: path_or(&paths.cleaned_artifact, DEFAULT_CLEANED_ARTIFACT),
        cleaned_output: path_or(&paths.cleaned_output, DEFAULT_CLEANED_OUTPUT),
    };

    let fetch = CommandSpec {
        program: fetch
            .and_then(|f| f.program.clone())
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
        args: fetch
            .and_then(|f| f.args.clone())
            .unwrap_or_else(|| vec![DEFAULT_SCRAPER.to_string()]),
        working_dir: path_or(&fetch.and_then(|f| f.working_dir.clone()), DEFAULT_SCRAPER_DIR),
    };

    let clean = CommandSpec {
        program: clean
            .and_then(|c| c.program.clone())
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
        args: vec![cleaner_script.to_string_lossy().into_owned()],
        working_dir: root.to_path_buf(),
    };

    ResolvedConfig {
        root: root.to_path_buf(),
        config_file,
        layout,
        fetch,
        clean,
    }
}

/// Load configuration from all sources.
///
/// `root` is the explicit project root from `--root` or
/// `LISTINGS_REFRESH_ROOT`; without it the config file is discovered from
/// the current directory upwards. A relative root is anchored at the
/// current directory, since step processes run with their own working
/// directories.
pub fn load_config(root: Option<&Path>) -> Result<ResolvedConfig> {
    let (root, config_file) = match root {
        Some(root) => {
            let root = absolute_root(root)?;
            let candidate = root.join(CONFIG_DIR).join(CONFIG_FILE);
            let config_file = candidate.is_file().then_some(candidate);
            (root, config_file)
        }
        None => {
            let cwd = std::env::current_dir().context("Failed to determine current directory")?;
            match find_config_file(&cwd) {
                Some(path) => (root_of(&path), Some(path)),
                None => (cwd, None),
            }
        }
    };

    let config = config_file
        .as_deref()
        .map(load_config_file)
        .transpose()?;

    Ok(resolve(&root, config.as_ref(), config_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(root: &Path, yaml: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", yaml).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let root = PathBuf::from("/project");
        let config = resolve(&root, None, None);

        assert_eq!(config.layout.dataset, root.join("data/companies.json"));
        assert_eq!(
            config.layout.cleaned_artifact,
            root.join("data/companies.json.cleaned")
        );
        assert_eq!(
            config.layout.cleaned_output,
            root.join("data/companies_cleaned.json")
        );
        assert_eq!(config.layout.cleaner_script, root.join("build/clean_data.py"));

        assert_eq!(config.fetch.program, "python3");
        assert_eq!(config.fetch.args, vec!["scraper.py".to_string()]);
        assert_eq!(config.fetch.working_dir, root.join("build"));

        assert_eq!(config.clean.program, "python3");
        assert_eq!(
            config.clean.args,
            vec![root.join("build/clean_data.py").to_string_lossy().into_owned()]
        );
        assert_eq!(config.clean.working_dir, root);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
version: "1"
paths:
  cleaned_output: data/companies.json
fetch:
  program: uv
  args: [run, scraper.py]
clean:
  script: tools/clean.py
"#,
        );

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.paths.cleaned_output.as_deref(), Some("data/companies.json"));
        assert!(config.paths.dataset.is_none());

        let fetch = config.fetch.unwrap();
        assert_eq!(fetch.program.as_deref(), Some("uv"));
        assert_eq!(
            fetch.args,
            Some(vec!["run".to_string(), "scraper.py".to_string()])
        );
        assert!(fetch.working_dir.is_none());
        assert_eq!(config.clean.unwrap().script.as_deref(), Some("tools/clean.py"));
    }

    #[test]
    fn test_file_values_override_defaults() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"
version: "1"
paths:
  cleaned_output: data/companies.json
fetch:
  working_dir: .
clean:
  program: python3.12
  script: tools/clean.py
"#,
        );

        let config = load_config(Some(temp.path())).unwrap();
        let root = temp.path();

        assert_eq!(config.layout.cleaned_output, root.join("data/companies.json"));
        assert_eq!(config.layout.dataset, root.join("data/companies.json"));
        assert_eq!(config.layout.cleaner_script, root.join("tools/clean.py"));
        assert_eq!(config.fetch.working_dir, root.join("."));
        assert_eq!(config.clean.program, "python3.12");
        assert_eq!(
            config.config_file,
            Some(root.join(CONFIG_DIR).join(CONFIG_FILE))
        );
    }

    #[test]
    fn test_explicit_root_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(Some(temp.path())).unwrap();

        assert!(config.config_file.is_none());
        assert_eq!(config.root, temp.path());
        assert_eq!(config.layout.dataset, temp.path().join("data/companies.json"));
    }

    #[test]
    fn test_relative_root_is_anchored_at_cwd() {
        let config = load_config(Some(Path::new("proj"))).unwrap();
        let expected = std::env::current_dir().unwrap().join("proj");

        assert!(config.root.is_absolute());
        assert_eq!(config.root, expected);
        assert_eq!(config.clean.working_dir, expected);

        // The cleaner argument must open from the cleaner's own working dir
        let script = PathBuf::from(&config.clean.args[0]);
        assert!(script.is_absolute());
        assert_eq!(config.clean.working_dir.join(&script), expected.join("build/clean_data.py"));
        assert_eq!(config.layout.cleaner_script, script);
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "paths: [not, a, map]");

        let err = load_config(Some(temp.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "version: \"1\"");
        let nested = temp.path().join("build").join("nested");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, path);
        assert_eq!(root_of(&found), temp.path());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "data/companies.json"),
            PathBuf::from("/home/user/project/data/companies.json")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_api_key_is_redacted() {
        let key = ApiKey::new("sk-ant-1234567890abcd");
        assert_eq!(key.to_string(), "****abcd");
        assert_eq!(format!("{:?}", key), "ApiKey(****abcd)");
        assert_eq!(key.expose(), "sk-ant-1234567890abcd");

        assert_eq!(ApiKey::new("short").to_string(), "****");
    }

    #[test]
    fn test_api_key_required() {
        assert!(ApiKey::from_option(None).is_err());
        assert!(ApiKey::from_option(Some("   ".to_string())).is_err());
        assert!(ApiKey::from_option(Some("key".to_string())).is_ok());
    }
}
