use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application configuration, read from `~/.lms/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmsConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub uploads: UploadsSection,
    pub session: SessionSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<BootstrapSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsSection {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub cookie_name: String,
    pub ttl_minutes: u64,
}

/// Credentials for the first administrator, created when the user table is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSection {
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5003)),
            request_timeout_secs: 30,
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://${HOME}/.lms/lms.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for UploadsSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("${HOME}/.lms/uploads"),
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie_name: "lms_session".to_string(),
            ttl_minutes: 12 * 60,
        }
    }
}

impl LmsConfig {
    /// Load config from `$LMS_CONFIG` or `~/.lms/config.toml`.
    ///
    /// A missing file is not an error: defaults apply, then environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.expand_variables();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file (invalid TOML)")
    }

    /// Get config file path: `$LMS_CONFIG` or `~/.lms/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var("LMS_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lms/config.toml")
    }

    /// Apply environment overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("LMS_BIND") {
            self.server.bind = bind
                .parse()
                .context(format!("LMS_BIND is not a socket address: {}", bind))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(dir) = lookup("LMS_UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(dir);
        }

        match (lookup("LMS_ADMIN_USERNAME"), lookup("LMS_ADMIN_PASSWORD")) {
            (Some(admin_username), Some(admin_password)) => {
                self.bootstrap = Some(BootstrapSection {
                    admin_username,
                    admin_password,
                });
            }
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("LMS_ADMIN_USERNAME and LMS_ADMIN_PASSWORD must be set together");
            }
            (None, None) => {}
        }

        Ok(())
    }

    /// Expand `${VAR}` references in the database URL and upload directory
    pub fn expand_variables(&mut self) {
        let mut vars = HashMap::new();
        let home = dirs::home_dir()
            .map(|h| h.display().to_string())
            .or_else(|| env::var("HOME").ok())
            .unwrap_or_else(|| ".".to_string());
        vars.insert("HOME".to_string(), home);

        self.database.url = Self::expand_string(&self.database.url, &vars);
        self.uploads.dir = PathBuf::from(Self::expand_string(
            &self.uploads.dir.display().to_string(),
            &vars,
        ));

        // Anything left is looked up in the environment.
        self.database.url = Self::expand_env(&self.database.url);
        self.uploads.dir = PathBuf::from(Self::expand_env(&self.uploads.dir.display().to_string()));
    }

    /// Expand ${var} references in a string
    fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
        let mut result = s.to_string();

        for (key, value) in vars {
            let pattern = format!("${{{}}}", key);
            result = result.replace(&pattern, value);
        }

        result
    }

    fn expand_env(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    result.push_str(&env::var(name).unwrap_or_default());
                    rest = &after[end + 1..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.database.url.trim().is_empty() {
            errors.push("  ✗ database.url is empty".to_string());
        }
        if self.database.max_connections == 0 {
            errors.push("  ✗ database.max_connections must be at least 1".to_string());
        }
        if self.uploads.max_bytes == 0 {
            errors.push("  ✗ uploads.max_bytes must be at least 1".to_string());
        }
        if self.session.ttl_minutes == 0 {
            errors.push("  ✗ session.ttl_minutes must be at least 1".to_string());
        }
        if self.session.cookie_name.trim().is_empty() {
            errors.push("  ✗ session.cookie_name is empty".to_string());
        }
        if self.server.request_timeout_secs == 0 {
            errors.push("  ✗ server.request_timeout_secs must be at least 1".to_string());
        }
        if let Some(bootstrap) = &self.bootstrap {
            if bootstrap.admin_username.trim().is_empty() || bootstrap.admin_password.is_empty() {
                errors.push("  ✗ bootstrap admin credentials are incomplete".to_string());
            }
        }

        if !errors.is_empty() {
            anyhow::bail!("Config validation failed:\n{}", errors.join("\n"));
        }

        Ok(())
    }

    /// Render the effective config as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)
            .context(format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_are_valid() {
        let config = LmsConfig::default();
        assert_eq!(config.server.bind.port(), 5003);
        assert_eq!(config.session.cookie_name, "lms_session");
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config = LmsConfig::from_toml(
            r#"
            [uploads]
            max_bytes = 2048
            "#,
        )
        .unwrap();
        assert_eq!(config.uploads.max_bytes, 2048);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn env_overrides_win() {
        let mut config = LmsConfig::default();
        config
            .apply_overrides(|key| match key {
                "LMS_BIND" => Some("0.0.0.0:8080".to_string()),
                "DATABASE_URL" => Some("sqlite::memory:".to_string()),
                "LMS_ADMIN_USERNAME" => Some("root".to_string()),
                "LMS_ADMIN_PASSWORD" => Some("secret".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.bootstrap.unwrap().admin_username, "root");
    }

    #[test]
    fn half_bootstrap_is_rejected() {
        let mut config = LmsConfig::default();
        let err = config
            .apply_overrides(|key| (key == "LMS_ADMIN_USERNAME").then(|| "root".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn bad_bind_is_rejected() {
        let mut config = LmsConfig::default();
        assert!(config
            .apply_overrides(|key| (key == "LMS_BIND").then(|| "nope".to_string()))
            .is_err());
        config.apply_overrides(no_env).unwrap();
    }

    #[test]
    fn home_is_expanded() {
        let mut config = LmsConfig::default();
        config.expand_variables();
        assert!(!config.database.url.contains("${HOME}"));
        assert!(!config.uploads.dir.display().to_string().contains("${HOME}"));
    }

    #[test]
    fn validation_collects_all_errors() {
        let mut config = LmsConfig::default();
        config.uploads.max_bytes = 0;
        config.session.ttl_minutes = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("uploads.max_bytes"));
        assert!(err.contains("session.ttl_minutes"));
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = LmsConfig::default();
        config.bootstrap = Some(BootstrapSection {
            admin_username: "admin".into(),
            admin_password: "admin".into(),
        });
        config.save_to(&path).unwrap();

        let loaded = LmsConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
