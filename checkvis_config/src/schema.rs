use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Placeholder substituted with the case number in `scraper.url_template`.
pub const CASE_NUMBER_PLACEHOLDER: &str = "{case_number}";

const CONFIG_FILE_NAME: &str = "checkvis.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    /// File whose first line is the bot token.
    #[serde(default = "TelegramConfig::default_token_file")]
    pub token_file: PathBuf,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_file: Self::default_token_file(),
        }
    }
}

impl TelegramConfig {
    fn default_token_file() -> PathBuf {
        PathBuf::from("bot-token.txt")
    }

    /// Read the bot token: first line of `token_file`, surrounding whitespace trimmed.
    pub fn read_token(&self) -> anyhow::Result<String> {
        let content = std::fs::read_to_string(&self.token_file).with_context(|| {
            format!(
                "Cannot read bot token file: {}",
                self.token_file.display()
            )
        })?;

        let token = content.lines().next().unwrap_or_default().trim();
        if token.is_empty() {
            anyhow::bail!("Bot token file is empty: {}", self.token_file.display());
        }

        Ok(token.to_string())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite database file holding the `user_commands` table.
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl DatabaseConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("data.db")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScraperConfig {
    /// Status page URL, with `{case_number}` where the case number goes.
    #[serde(default = "ScraperConfig::default_url_template")]
    pub url_template: String,

    #[serde(default = "ScraperConfig::default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds. Unset means the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url_template: Self::default_url_template(),
            user_agent: Self::default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl ScraperConfig {
    fn default_url_template() -> String {
        "https://infovisa.ibz.be/ResultNl.aspx?place=THR&visumnr={case_number}".to_string()
    }

    fn default_user_agent() -> String {
        format!("checkvis/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl Config {
    /// Directory containing the running executable.
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let exe = std::env::current_exe().context("Cannot locate the running executable")?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow::anyhow!("Executable has no parent directory"))
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(Self::default_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path next to
    /// the executable is read when present, otherwise built-in defaults apply.
    /// Relative paths are resolved against the config file's directory, or the
    /// executable's directory for built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Config file not found at: {}", path.display());
            }
            return Self::from_file(path);
        }

        let default_path = Self::default_path()?;
        if default_path.exists() {
            return Self::from_file(&default_path);
        }

        info!(
            "No config file at {}, using defaults",
            default_path.display()
        );
        Ok(Self::default().resolve_paths(&Self::default_dir()?))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_paths(base))
    }

    #[must_use]
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.telegram.token_file.is_relative() {
            self.telegram.token_file = base.join(&self.telegram.token_file);
        }
        if self.database.path.is_relative() {
            self.database.path = base.join(&self.database.path);
        }
        self
    }

    /// Write a config template to `path`. Never overwrites.
    pub fn create_config(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let config_template = r#"{
  "telegram": {
    "token_file": "bot-token.txt"
  },
  "database": {
    "path": "data.db"
  },
  "scraper": {
    "url_template": "https://infovisa.ibz.be/ResultNl.aspx?place=THR&visumnr={case_number}"
  }
}"#;

        std::fs::write(path, config_template)?;

        println!("✅ Created config file at: {}", path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Put your Telegram bot token on the first line of bot-token.txt");
        println!("   2. Run 'checkvis run' to start the bot");
        println!();
        println!("🔧 Configuration options:");
        println!("   - token_file / path: relative paths are resolved against this file's directory");
        println!("   - scraper.timeout_secs: optional request timeout for the status page");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_point_at_original_file_names() {
        let config = Config::default();
        assert_eq!(config.telegram.token_file, PathBuf::from("bot-token.txt"));
        assert_eq!(config.database.path, PathBuf::from("data.db"));
        assert!(config.scraper.url_template.contains(CASE_NUMBER_PLACEHOLDER));
        assert!(config.scraper.timeout_secs.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults_and_resolves_relative_paths() {
        let Ok(dir) = tempdir() else {
            panic!("Failed to create temp dir");
        };
        let path = dir.path().join("checkvis.json");
        std::fs::write(&path, r#"{ "scraper": { "timeout_secs": 15 } }"#)
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        let config = Config::load(Some(&path)).unwrap_or_else(|e| panic!("load failed: {e}"));
        assert_eq!(config.scraper.timeout_secs, Some(15));
        assert_eq!(config.telegram.token_file, dir.path().join("bot-token.txt"));
        assert_eq!(config.database.path, dir.path().join("data.db"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let config = Config {
            database: DatabaseConfig {
                path: PathBuf::from("/var/lib/checkvis/data.db"),
            },
            ..Config::default()
        }
        .resolve_paths(Path::new("/opt/checkvis"));
        assert_eq!(
            config.database.path,
            PathBuf::from("/var/lib/checkvis/data.db")
        );
        assert_eq!(
            config.telegram.token_file,
            PathBuf::from("/opt/checkvis/bot-token.txt")
        );
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let Ok(dir) = tempdir() else {
            panic!("Failed to create temp dir");
        };
        let result = Config::load(Some(&dir.path().join("missing.json")));
        assert!(result.is_err());
    }

    #[test]
    fn read_token_takes_trimmed_first_line() {
        let Ok(dir) = tempdir() else {
            panic!("Failed to create temp dir");
        };
        let token_file = dir.path().join("bot-token.txt");
        std::fs::write(&token_file, "  123:abc \nignored\n")
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        let telegram = TelegramConfig { token_file };
        assert_eq!(telegram.read_token().ok().as_deref(), Some("123:abc"));
    }

    #[test]
    fn read_token_fails_on_missing_or_empty_file() {
        let Ok(dir) = tempdir() else {
            panic!("Failed to create temp dir");
        };
        let missing = TelegramConfig {
            token_file: dir.path().join("nope.txt"),
        };
        assert!(missing.read_token().is_err());

        let empty_file = dir.path().join("empty.txt");
        std::fs::write(&empty_file, "   \n").unwrap_or_else(|e| panic!("write failed: {e}"));
        let empty = TelegramConfig {
            token_file: empty_file,
        };
        assert!(empty.read_token().is_err());
    }

    #[test]
    fn create_config_writes_loadable_template_once() {
        let Ok(dir) = tempdir() else {
            panic!("Failed to create temp dir");
        };
        let path = dir.path().join("conf").join("checkvis.json");

        assert!(Config::create_config(&path).is_ok());
        assert!(Config::create_config(&path).is_err());

        let config = Config::load(Some(&path)).unwrap_or_else(|e| panic!("load failed: {e}"));
        assert_eq!(
            config.telegram.token_file,
            dir.path().join("conf").join("bot-token.txt")
        );
    }
}
