//! Connection settings and authentication.

use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context};
use zabbix_api::Api;
use zabbix_rpc::{tracing_hook, Client, ClientBuilder, HttpTransport, LoginRules};

use crate::config::ZbxConfig;

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub virtual_host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub debug: bool,
}

/// Effective connection settings.
#[derive(Clone)]
pub struct Settings {
    pub url: String,
    pub virtual_host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
    pub debug: bool,
    pub login_rules: LoginRules,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("url", &self.url)
            .field("virtual_host", &self.virtual_host)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<set>"))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

impl Settings {
    /// Overrides win over the config file. Empty values count as unset.
    pub fn resolve(overrides: Overrides, cfg: &ZbxConfig) -> anyhow::Result<Self> {
        let url = non_empty(overrides.url)
            .or_else(|| non_empty(cfg.server.url.clone()))
            .context(r#"Zabbix URL must be set with "--url", ZBX_URL or [server] url"#)?;
        Ok(Self {
            url,
            virtual_host: non_empty(overrides.virtual_host)
                .or_else(|| non_empty(cfg.server.virtual_host.clone())),
            username: non_empty(overrides.username)
                .or_else(|| non_empty(cfg.auth.username.clone())),
            password: non_empty(overrides.password),
            token: non_empty(overrides.token).or_else(|| non_empty(cfg.auth.token.clone())),
            timeout: cfg.timeout(),
            debug: overrides.debug,
            login_rules: cfg.login_rules(),
        })
    }

    pub fn client_builder(&self) -> ClientBuilder {
        let mut builder = ClientBuilder::new(&self.url).login_rules(self.login_rules.clone());
        if let Some(host) = &self.virtual_host {
            builder = builder.virtual_host(host);
        }
        if let Some(token) = &self.token {
            builder = builder.api_token(token);
        }
        if self.debug {
            builder = builder.debug_hook(tracing_hook());
        }
        builder
    }

    /// Client over reqwest with the configured timeout. Not yet logged in.
    pub fn client(&self) -> anyhow::Result<Client> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(self.client_builder().http_client(http).build()?)
    }
}

/// Log in unless an API token is configured. A missing password is asked for.
pub async fn authenticate<T, P>(
    client: &Client<T>,
    settings: &Settings,
    prompt: P,
) -> anyhow::Result<()>
where
    T: HttpTransport,
    P: FnOnce() -> std::io::Result<String>,
{
    if settings.token.is_some() {
        return Ok(());
    }
    let Some(username) = &settings.username else {
        bail!(r#""--token" or "--username" must be set"#);
    };
    let password = match &settings.password {
        Some(p) => p.clone(),
        None => prompt().context("failed to read password")?,
    };
    client.login(username, &password).await?;
    tracing::debug!(%username, "logged in");
    Ok(())
}

/// Connected and authenticated API for the binary.
pub async fn connect(settings: &Settings) -> anyhow::Result<Api> {
    let client = settings.client()?;
    authenticate(&client, settings, prompt_password).await?;
    Ok(Api::new(client))
}

/// Ask on stderr, read one line from stdin.
pub fn prompt_password() -> std::io::Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "Enter password for Zabbix: ")?;
    stderr.flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use zabbix_rpc::mock::{self, MockTransport};

    fn settings(overrides: Overrides) -> Settings {
        let mut cfg = ZbxConfig::default();
        cfg.server.url = Some("http://config.example.com/zabbix".into());
        cfg.auth.username = Some("from-config".into());
        Settings::resolve(overrides, &cfg).unwrap()
    }

    fn mock_client(s: &Settings) -> Client<MockTransport> {
        s.client_builder()
            .build_with_transport(MockTransport::zabbix("6.4.3", "session", |req| {
                Ok(mock::ok(req, Value::Null))
            }))
            .unwrap()
    }

    #[test]
    fn test_overrides_win() {
        let s = settings(Overrides {
            url: Some("http://flag.example.com/".into()),
            username: Some("Admin".into()),
            virtual_host: Some(String::new()),
            ..Overrides::default()
        });
        assert_eq!(s.url, "http://flag.example.com/");
        assert_eq!(s.username.as_deref(), Some("Admin"));
        assert_eq!(s.virtual_host, None);
        assert_eq!(s.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_url_required() {
        let err = Settings::resolve(Overrides::default(), &ZbxConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--url"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let s = settings(Overrides {
            password: Some("hunter2".into()),
            token: Some("e2a1f3c9".into()),
            ..Overrides::default()
        });
        let text = format!("{s:?}");
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("e2a1f3c9"));
    }

    #[tokio::test]
    async fn test_token_skips_login() {
        let s = settings(Overrides {
            token: Some("e2a1f3c9".into()),
            ..Overrides::default()
        });
        let client = mock_client(&s);
        authenticate(&client, &s, || panic!("no prompt expected"))
            .await
            .unwrap();
        assert_eq!(client.transport().call_count(), 0);
        assert_eq!(client.token().await.as_deref(), Some("e2a1f3c9"));
    }

    #[tokio::test]
    async fn test_prompts_for_missing_password() {
        let s = settings(Overrides::default());
        let client = mock_client(&s);
        authenticate(&client, &s, || Ok("typed".to_string()))
            .await
            .unwrap();
        let login = &client.transport().requests_for("user.login")[0];
        assert_eq!(login.body["params"]["username"], "from-config");
        assert_eq!(login.body["params"]["password"], "typed");
        assert_eq!(client.token().await.as_deref(), Some("session"));
    }

    #[tokio::test]
    async fn test_username_required_without_token() {
        let mut cfg = ZbxConfig::default();
        cfg.server.url = Some("http://example.com/".into());
        let s = Settings::resolve(Overrides::default(), &cfg).unwrap();
        let client = mock_client(&s);
        let err = authenticate(&client, &s, || Ok(String::new()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--username"));
    }
}
