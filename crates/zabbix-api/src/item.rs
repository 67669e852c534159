use serde::{Deserialize, Serialize};
use zabbix_rpc::Id;

pub const SELECT_ITEMS: &[&str] = &["itemid", "hostid", "key_", "name", "type"];

/// Item object, as selected alongside triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "itemid")]
    pub id: Id,
    #[serde(rename = "hostid", default)]
    pub host_id: Id,
    #[serde(rename = "key_", default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    /// Item type code, e.g. `"0"` for a Zabbix agent item.
    #[serde(rename = "type", default)]
    pub item_type: String,
}
