use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use zabbix_rpc::{HttpTransport, Id};

use crate::error::{missing, Error, Result};
use crate::Api;

pub const SELECT_GROUPS: &[&str] = &["groupid", "name"];

/// Nested groups are named `<parent>/<child>`.
pub const NESTING_SEPARATOR: char = '/';

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroup {
    #[serde(rename = "groupid")]
    pub id: Id,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl HostGroup {
    pub fn with_id(id: Id) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }

    pub fn reference(&self) -> Self {
        Self::with_id(self.id)
    }

    /// True if this group is `ancestor` or nested below it.
    pub fn is_within(&self, ancestor: &str) -> bool {
        self.name == ancestor
            || self
                .name
                .strip_prefix(ancestor)
                .is_some_and(|rest| rest.starts_with(NESTING_SEPARATOR))
    }
}

impl<T: HttpTransport> Api<T> {
    /// Groups whose name equals one of `names`. Every name must match.
    pub async fn host_groups_by_names(&self, names: &[String]) -> Result<Vec<HostGroup>> {
        let params = json!({
            "output": SELECT_GROUPS,
            "filter": { "name": names },
        });
        let groups: Vec<HostGroup> = self.rpc().call("hostgroup.get", &params).await?;

        let found: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        let missing = missing(names.iter().map(String::as_str), &found);
        if !missing.is_empty() {
            return Err(Error::NotFound {
                kind: "host groups",
                missing,
            });
        }
        Ok(groups)
    }

    /// Groups named as one of `names` plus every group nested below them,
    /// sorted by name. Every name must match a group itself.
    pub async fn nested_host_groups_by_ancestor_names(
        &self,
        names: &[String],
    ) -> Result<Vec<HostGroup>> {
        let ancestors = self.host_groups_by_names(names).await?;

        let prefixes: Vec<String> = names
            .iter()
            .map(|n| format!("{n}{NESTING_SEPARATOR}"))
            .collect();
        let params = json!({
            "output": SELECT_GROUPS,
            "search": { "name": prefixes },
            "searchByAny": true,
            "startSearch": true,
        });
        let candidates: Vec<HostGroup> = self.rpc().call("hostgroup.get", &params).await?;

        // Server-side search is case-insensitive; keep exact prefixes only.
        let mut by_id = BTreeMap::new();
        for group in ancestors.into_iter().chain(
            candidates
                .into_iter()
                .filter(|g| names.iter().any(|n| g.is_within(n))),
        ) {
            by_id.entry(group.id).or_insert(group);
        }
        let mut groups: Vec<HostGroup> = by_id.into_values().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            groups = ?groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            "expanded nested host groups"
        );
        Ok(groups)
    }
}
