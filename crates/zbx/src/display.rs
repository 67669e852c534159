//! Output documents. Times are shown in the local zone as `YYYY-MM-DDTHH:MM`
//! and periods as `1h30m`.

use chrono::Local;
use serde::Serialize;
use zabbix_api::{
    Host, HostGroup, Item, Maintenance, MaintenanceStatus, MaintenanceType, TimePeriod, Trigger,
    TriggerStatus,
};
use zabbix_rpc::{Id, Timestamp};

use crate::args::{format_duration, LOCAL_MINUTE_FORMAT};

pub fn local_minute(ts: &Timestamp) -> String {
    ts.0.with_timezone(&Local)
        .format(LOCAL_MINUTE_FORMAT)
        .to_string()
}

/// Like [`local_minute`], but empty for unset (epoch) timestamps.
fn optional_local_minute(ts: Option<&Timestamp>) -> String {
    match ts {
        Some(ts) if !ts.is_epoch() => local_minute(ts),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayMaintenance {
    pub maintenanceid: Option<Id>,
    pub name: String,
    pub active_since: String,
    pub active_till: String,
    pub description: String,
    pub groups: Vec<HostGroup>,
    pub hosts: Vec<DisplayHost>,
    pub timeperiods: Vec<DisplayTimePeriod>,
}

impl From<&Maintenance> for DisplayMaintenance {
    fn from(m: &Maintenance) -> Self {
        Self {
            maintenanceid: m.id,
            name: m.name.clone(),
            active_since: local_minute(&m.active_since),
            active_till: local_minute(&m.active_till),
            description: m.description.clone(),
            groups: m.groups.clone(),
            hosts: m.hosts.iter().map(DisplayHost::from).collect(),
            timeperiods: m.time_periods.iter().map(DisplayTimePeriod::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayHost {
    pub hostid: Id,
    pub name: String,
    pub maintenance_from: String,
    pub maintenance_status: Option<MaintenanceStatus>,
    pub maintenance_type: Option<MaintenanceType>,
    pub maintenanceid: Option<Id>,
}

impl From<&Host> for DisplayHost {
    fn from(h: &Host) -> Self {
        Self {
            hostid: h.id,
            name: h.name.clone(),
            maintenance_from: optional_local_minute(h.maintenance_from.as_ref()),
            maintenance_status: h.maintenance_status,
            maintenance_type: h.maintenance_type,
            maintenanceid: h.maintenance_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTimePeriod {
    pub period: String,
    pub start_date: String,
}

impl From<&TimePeriod> for DisplayTimePeriod {
    fn from(p: &TimePeriod) -> Self {
        Self {
            period: format_duration(p.period),
            start_date: local_minute(&p.start_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTrigger {
    pub triggerid: Id,
    pub description: String,
    pub expression: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub lastchange: String,
    pub state: String,
    pub status: Option<TriggerStatus>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    pub value: String,
    pub groups: Vec<HostGroup>,
    pub hosts: Vec<DisplayHost>,
    pub items: Vec<Item>,
}

impl From<&Trigger> for DisplayTrigger {
    fn from(t: &Trigger) -> Self {
        Self {
            triggerid: t.id,
            description: t.description.clone(),
            expression: t.expression.clone(),
            event_name: t.event_name.clone(),
            comments: t.comments.clone(),
            error: t.error.clone(),
            lastchange: optional_local_minute(t.last_change.as_ref()),
            state: t.state.clone(),
            status: t.status,
            url: t.url.clone(),
            value: t.value.clone(),
            groups: t.groups.clone(),
            hosts: t.hosts.iter().map(DisplayHost::from).collect(),
            items: t.items.clone(),
        }
    }
}

/// One compact JSON document per line.
pub fn to_line<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string(value)?)
}
