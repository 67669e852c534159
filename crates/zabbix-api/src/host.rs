//! Hosts and their maintenance state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;
use zabbix_rpc::{HttpTransport, Id, Timestamp};

use crate::error::{missing, Error, Result};
use crate::maintenance::MaintenanceType;
use crate::Api;

/// Host properties selected by every host query.
pub const SELECT_HOSTS: &[&str] = &[
    "hostid",
    "name",
    "maintenance_from",
    "maintenance_status",
    "maintenance_type",
    "maintenanceid",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    #[serde(rename = "0")]
    NoMaintenance,
    #[serde(rename = "1")]
    InEffect,
}

/// Host object. Read-only properties are skipped when unset so that a host
/// reference (`{"hostid": ..}`) can be sent back in create/update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Host {
    #[serde(rename = "hostid")]
    pub id: Id,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_from: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_status: Option<MaintenanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_type: Option<MaintenanceType>,
    #[serde(rename = "maintenanceid", default, skip_serializing_if = "Option::is_none")]
    pub maintenance_id: Option<Id>,
}

impl Host {
    /// Reference to an existing host.
    pub fn with_id(id: Id) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn reference(&self) -> Self {
        Self::with_id(self.id)
    }
}

impl<T: HttpTransport> Api<T> {
    /// Hosts whose visible name equals one of `names`. Every name must match.
    pub async fn hosts_by_names(&self, names: &[String]) -> Result<Vec<Host>> {
        let params = json!({
            "output": SELECT_HOSTS,
            "filter": { "name": names },
        });
        let hosts: Vec<Host> = self.rpc().call("host.get", &params).await?;

        let found: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
        let missing = missing(names.iter().map(String::as_str), &found);
        if !missing.is_empty() {
            return Err(Error::NotFound {
                kind: "hosts",
                missing,
            });
        }
        Ok(hosts)
    }

    /// Hosts with the given ids. Every id must exist.
    pub async fn hosts_by_ids(&self, ids: &[Id]) -> Result<Vec<Host>> {
        let params = json!({
            "output": SELECT_HOSTS,
            "hostids": ids,
        });
        let hosts: Vec<Host> = self.rpc().call("host.get", &params).await?;

        let found: HashSet<Id> = hosts.iter().map(|h| h.id).collect();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(Id::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(Error::NotFound {
                kind: "host ids",
                missing,
            });
        }
        Ok(hosts)
    }

    /// Hosts belonging to any of the given groups.
    pub async fn hosts_by_group_ids(&self, group_ids: &[Id]) -> Result<Vec<Host>> {
        let params = json!({
            "output": SELECT_HOSTS,
            "groupids": group_ids,
        });
        Ok(self.rpc().call("host.get", &params).await?)
    }
}

/// Concatenate host lists, keeping the first host of each name.
pub fn merge_hosts_dedup(lists: &[&[Host]]) -> Vec<Host> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|l| l.iter())
        .filter(|h| seen.insert(h.name.clone()))
        .cloned()
        .collect()
}

pub fn sort_hosts(hosts: &mut [Host]) {
    hosts.sort_by(|a, b| a.name.cmp(&b.name));
}

/// True if every host reports `status`. Vacuously true for no hosts.
pub fn all_in_status(hosts: &[Host], status: MaintenanceStatus) -> bool {
    hosts.iter().all(|h| h.maintenance_status == Some(status))
}
