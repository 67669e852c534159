//! Configuration types for zbx.
//! Parsed from ~/.config/zbx/config.toml. Command line flags and environment
//! variables take precedence over every value here.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use zabbix_rpc::{LoginRule, LoginRules};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZbxConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub login: LoginSection,
    #[serde(default)]
    pub log: LogSection,
    #[serde(default)]
    pub wait: WaitSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Frontend base URL, e.g. http://example.com/zabbix
    pub url: Option<String>,
    /// Host header to send instead of the URL's host.
    pub virtual_host: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            url: None,
            virtual_host: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSection {
    pub username: Option<String>,
    /// API token. When set, user.login is never called.
    pub token: Option<String>,
}

/// `user.login` field selection. Empty means the built-in rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginSection {
    #[serde(default)]
    pub rules: Vec<LoginRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WaitSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_log_filter() -> String {
    "zbx=info,zabbix_api=info".into()
}
fn default_interval_secs() -> u64 {
    30
}

impl ZbxConfig {
    /// Load config from file, or use defaults if missing.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: ZbxConfig = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn login_rules(&self) -> LoginRules {
        if self.login.rules.is_empty() {
            LoginRules::default()
        } else {
            LoginRules::new(self.login.rules.clone())
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait.interval_secs)
    }
}

impl LogSection {
    /// Filter directives, with wire tracing enabled when `debug` is set.
    pub fn directives(&self, debug: bool) -> String {
        if debug {
            format!("{},zabbix_rpc=debug", self.filter)
        } else {
            self.filter.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zabbix_rpc::{ApiVersion, LoginField};

    #[test]
    fn test_default_config() {
        let cfg = ZbxConfig::default();
        assert_eq!(cfg.server.url, None);
        assert_eq!(cfg.server.timeout_secs, 30);
        assert_eq!(cfg.wait.interval_secs, 30);
        assert_eq!(cfg.log.filter, "zbx=info,zabbix_api=info");
        assert_eq!(cfg.login_rules(), LoginRules::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
url = "http://example.com/zabbix"
virtual_host = "zabbix.internal"

[auth]
username = "Admin"

[[login.rules]]
since = "5.4.0"
field = "username"

[log]
json = true

[wait]
interval_secs = 10
"#;

        let cfg: ZbxConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.server.url.as_deref(), Some("http://example.com/zabbix"));
        assert_eq!(cfg.server.virtual_host.as_deref(), Some("zabbix.internal"));
        assert_eq!(cfg.server.timeout_secs, 30);
        assert_eq!(cfg.auth.username.as_deref(), Some("Admin"));
        assert!(cfg.auth.token.is_none());
        assert!(cfg.log.json);
        assert_eq!(cfg.log.filter, "zbx=info,zabbix_api=info");
        assert_eq!(cfg.wait_interval(), Duration::from_secs(10));

        let rules = cfg.login_rules();
        assert_eq!(
            rules.field_for(&ApiVersion::new(6, 0, 0)),
            LoginField::Username
        );
        assert_eq!(rules.field_for(&ApiVersion::new(5, 2, 0)), LoginField::User);
    }

    #[test]
    fn test_debug_directives() {
        let log = LogSection::default();
        assert_eq!(log.directives(false), "zbx=info,zabbix_api=info");
        assert_eq!(
            log.directives(true),
            "zbx=info,zabbix_api=info,zabbix_rpc=debug"
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\ntoken = \"e2a1f3c9\"").unwrap();
        let cfg = ZbxConfig::load_or_default(file.path()).unwrap();
        assert_eq!(cfg.auth.token.as_deref(), Some("e2a1f3c9"));

        let dir = tempfile::tempdir().unwrap();
        let missing = ZbxConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing, ZbxConfig::default());
    }

    #[test]
    fn test_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[login.rules]]\nsince = \"six\"\nfield = \"user\"").unwrap();
        let err = ZbxConfig::load_or_default(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_serialise_default() {
        let cfg = ZbxConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("interval_secs"));
    }
}
