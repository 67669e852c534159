//! Version-gated shape of `user.login` parameters.
//!
//! Zabbix renamed the login field from `user` to `username`. Where the cutoff
//! lies has moved between releases, so the choice is an ordered rule list
//! rather than a single comparison.

use serde::{Deserialize, Serialize};

use crate::version::{ApiVersion, PreRelease};

/// Name of the field that carries the login name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginField {
    User,
    Username,
}

impl LoginField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Username => "username",
        }
    }
}

/// Servers at or above `since` expect `field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRule {
    pub since: ApiVersion,
    pub field: LoginField,
}

/// `username` is required from 6.4.0beta5 on (ZBXNEXT-8085).
pub const USERNAME_SINCE: ApiVersion = ApiVersion::pre(6, 4, 0, PreRelease::Beta, 5);

/// Ordered rules, highest threshold first. Versions below every threshold
/// get [`LoginField::User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRules {
    rules: Vec<LoginRule>,
}

impl LoginRules {
    pub fn new(mut rules: Vec<LoginRule>) -> Self {
        rules.sort_by(|a, b| b.since.cmp(&a.since));
        Self { rules }
    }

    pub fn rules(&self) -> &[LoginRule] {
        &self.rules
    }

    /// Field to use against a server reporting `version`.
    pub fn field_for(&self, version: &ApiVersion) -> LoginField {
        self.rules
            .iter()
            .find(|rule| *version >= rule.since)
            .map_or(LoginField::User, |rule| rule.field)
    }

    /// `user.login` parameters for `version`.
    pub fn params(
        &self,
        version: &ApiVersion,
        username: &str,
        password: &str,
    ) -> serde_json::Value {
        let mut params = serde_json::Map::new();
        params.insert(self.field_for(version).as_str().to_string(), username.into());
        params.insert("password".to_string(), password.into());
        params.into()
    }
}

impl Default for LoginRules {
    fn default() -> Self {
        Self::new(vec![LoginRule {
            since: USERNAME_SINCE,
            field: LoginField::Username,
        }])
    }
}
