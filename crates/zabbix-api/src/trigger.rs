use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use zabbix_rpc::{HttpTransport, Id, Timestamp};

use crate::error::{Error, Result};
use crate::host::{Host, SELECT_HOSTS};
use crate::hostgroup::{HostGroup, SELECT_GROUPS};
use crate::item::{Item, SELECT_ITEMS};
use crate::Api;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerStatus {
    #[serde(rename = "0")]
    Enabled,
    #[serde(rename = "1")]
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "triggerid")]
    pub id: Id,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub error: String,
    #[serde(rename = "lastchange", default)]
    pub last_change: Option<Timestamp>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub status: Option<TriggerStatus>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub groups: Vec<HostGroup>,
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Trigger selection. Empty criteria are not applied; names are resolved to
/// ids first and must all exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerQuery {
    pub trigger_ids: Vec<Id>,
    pub host_names: Vec<String>,
    pub group_names: Vec<String>,
    pub descriptions: Vec<String>,
}

impl<T: HttpTransport> Api<T> {
    pub async fn triggers(&self, query: &TriggerQuery) -> Result<Vec<Trigger>> {
        let mut params = Map::new();
        params.insert("output".into(), json!("extend"));
        params.insert("selectGroups".into(), json!(SELECT_GROUPS));
        params.insert("selectHosts".into(), json!(SELECT_HOSTS));
        params.insert("selectItems".into(), json!(SELECT_ITEMS));
        if !query.trigger_ids.is_empty() {
            params.insert("triggerids".into(), json!(query.trigger_ids));
        }
        if !query.host_names.is_empty() {
            let hosts = self.hosts_by_names(&query.host_names).await?;
            let ids: Vec<Id> = hosts.iter().map(|h| h.id).collect();
            params.insert("hostids".into(), json!(ids));
        }
        if !query.group_names.is_empty() {
            let groups = self.host_groups_by_names(&query.group_names).await?;
            let ids: Vec<Id> = groups.iter().map(|g| g.id).collect();
            params.insert("groupids".into(), json!(ids));
        }
        if !query.descriptions.is_empty() {
            params.insert(
                "filter".into(),
                json!({ "description": query.descriptions }),
            );
        }
        Ok(self.rpc().call("trigger.get", &Value::Object(params)).await?)
    }

    pub async fn trigger_ids(&self, query: &TriggerQuery) -> Result<Vec<Id>> {
        Ok(self.triggers(query).await?.iter().map(|t| t.id).collect())
    }

    /// Set `status` on each trigger, one `trigger.update` per id.
    ///
    /// On failure the error carries the ids updated before it.
    pub async fn set_trigger_status(&self, ids: &[Id], status: TriggerStatus) -> Result<Vec<Id>> {
        #[derive(Deserialize)]
        struct TriggerIds {
            triggerids: Vec<Id>,
        }

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let params = json!({ "triggerid": id, "status": status });
            match self.rpc().call::<_, TriggerIds>("trigger.update", &params).await {
                Ok(result) => updated.extend(result.triggerids),
                Err(source) => return Err(Error::PartialUpdate { updated, source }),
            }
        }
        Ok(updated)
    }
}
