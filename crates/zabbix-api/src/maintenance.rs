//! Maintenance windows.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use zabbix_rpc::scalar::seconds;
use zabbix_rpc::{HttpTransport, Id, Timestamp};

use crate::error::{Error, Result};
use crate::host::{Host, SELECT_HOSTS};
use crate::hostgroup::{HostGroup, SELECT_GROUPS};
use crate::Api;

pub const SELECT_TIME_PERIODS: &[&str] =
    &["timeperiodid", "period", "timeperiod_type", "start_date"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceType {
    #[default]
    #[serde(rename = "0")]
    WithData,
    #[serde(rename = "1")]
    NoData,
}

/// How problem tags are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagsEvalType {
    #[default]
    #[serde(rename = "0")]
    AndOr,
    #[serde(rename = "2")]
    Or,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriodType {
    #[default]
    #[serde(rename = "0")]
    OneTimeOnly,
    #[serde(rename = "2")]
    Daily,
    #[serde(rename = "3")]
    Weekly,
    #[serde(rename = "4")]
    Monthly,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    #[serde(rename = "timeperiodid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(with = "seconds")]
    pub period: Duration,
    #[serde(default)]
    pub timeperiod_type: TimePeriodType,
    #[serde(default)]
    pub start_date: Timestamp,
}

impl TimePeriod {
    pub fn one_time(start_date: Timestamp, period: Duration) -> Self {
        Self {
            id: None,
            period,
            timeperiod_type: TimePeriodType::OneTimeOnly,
            start_date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Maintenance {
    #[serde(rename = "maintenanceid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    pub active_since: Timestamp,
    pub active_till: Timestamp,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub maintenance_type: MaintenanceType,
    #[serde(default)]
    pub tags_evaltype: TagsEvalType,
    #[serde(default)]
    pub groups: Vec<HostGroup>,
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(rename = "timeperiods", default)]
    pub time_periods: Vec<TimePeriod>,
}

impl Maintenance {
    /// Copy suitable as `maintenance.create`/`maintenance.update` params:
    /// hosts and groups reduced to references, period ids dropped.
    pub fn to_write(&self) -> Self {
        Self {
            hosts: self.hosts.iter().map(Host::reference).collect(),
            groups: self.groups.iter().map(HostGroup::reference).collect(),
            time_periods: self
                .time_periods
                .iter()
                .map(|p| TimePeriod { id: None, ..p.clone() })
                .collect(),
            ..self.clone()
        }
    }

    /// The only time period, for maintenances this tool can edit.
    pub fn single_time_period_mut(&mut self) -> Result<&mut TimePeriod> {
        match self.time_periods.as_mut_slice() {
            [period] => Ok(period),
            other => Err(Error::UnsupportedTimePeriods(other.len())),
        }
    }
}

#[derive(Deserialize)]
struct MaintenanceIds {
    #[serde(rename = "maintenanceids")]
    ids: Vec<Id>,
}

fn get_params(filter: serde_json::Value) -> serde_json::Value {
    json!({
        "output": "extend",
        "selectGroups": SELECT_GROUPS,
        "selectHosts": SELECT_HOSTS,
        "selectTimeperiods": SELECT_TIME_PERIODS,
        "filter": filter,
    })
}

fn exactly_one(mut found: Vec<Maintenance>) -> Result<Maintenance> {
    match found.len() {
        1 => Ok(found.remove(0)),
        got => Err(Error::UnexpectedCount {
            what: "maintenance",
            got,
            want: 1,
        }),
    }
}

impl<T: HttpTransport> Api<T> {
    pub async fn maintenances(&self) -> Result<Vec<Maintenance>> {
        let params = get_params(json!({}));
        Ok(self.rpc().call("maintenance.get", &params).await?)
    }

    pub async fn maintenance_by_id(&self, id: Id) -> Result<Maintenance> {
        let params = get_params(json!({ "maintenanceid": [id] }));
        exactly_one(self.rpc().call("maintenance.get", &params).await?)
    }

    pub async fn maintenance_by_name(&self, name: &str) -> Result<Maintenance> {
        let params = get_params(json!({ "name": [name] }));
        exactly_one(self.rpc().call("maintenance.get", &params).await?)
    }

    /// Create `m` and store the new id in it.
    pub async fn create_maintenance(&self, m: &mut Maintenance) -> Result<Id> {
        let params = Maintenance { id: None, ..m.to_write() };
        let id = self.write_maintenance("maintenance.create", &params).await?;
        m.id = Some(id);
        Ok(id)
    }

    pub async fn update_maintenance(&self, m: &Maintenance) -> Result<Id> {
        self.write_maintenance("maintenance.update", &m.to_write())
            .await
    }

    async fn write_maintenance(&self, method: &str, params: &Maintenance) -> Result<Id> {
        let result: MaintenanceIds = self.rpc().call(method, params).await?;
        match result.ids.as_slice() {
            [id] => Ok(*id),
            ids => Err(Error::UnexpectedCount {
                what: "maintenance id",
                got: ids.len(),
                want: 1,
            }),
        }
    }

    /// Ids of existing maintenances among `ids`. All must exist.
    pub async fn maintenance_ids_by_ids(&self, ids: &[Id]) -> Result<Vec<Id>> {
        self.maintenance_ids(json!({ "maintenanceid": ids }), ids.len())
            .await
    }

    /// Ids of the maintenances named exactly `names`. All must exist.
    pub async fn maintenance_ids_by_names(&self, names: &[String]) -> Result<Vec<Id>> {
        self.maintenance_ids(json!({ "name": names }), names.len())
            .await
    }

    async fn maintenance_ids(&self, filter: serde_json::Value, want: usize) -> Result<Vec<Id>> {
        let params = json!({ "output": "maintenanceid", "filter": filter });
        let found: Vec<MaintenanceRef> = self.rpc().call("maintenance.get", &params).await?;
        if found.len() != want {
            return Err(Error::UnexpectedCount {
                what: "maintenance",
                got: found.len(),
                want,
            });
        }
        Ok(found.into_iter().map(|m| m.id).collect())
    }

    /// Delete maintenances, returning the ids the server reports deleted.
    pub async fn delete_maintenances(&self, ids: &[Id]) -> Result<Vec<Id>> {
        let result: MaintenanceIds = self.rpc().call("maintenance.delete", ids).await?;
        Ok(result.ids)
    }
}

#[derive(Deserialize)]
struct MaintenanceRef {
    #[serde(rename = "maintenanceid")]
    id: Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{api, sent};
    use zabbix_rpc::mock;

    fn sample() -> serde_json::Value {
        json!({
            "maintenanceid": "3",
            "name": "Sunday maintenance",
            "maintenance_type": "0",
            "description": "",
            "active_since": "1358844540",
            "active_till": "1390466940",
            "tags_evaltype": "0",
            "groups": [{ "groupid": "4", "name": "Zabbix servers" }],
            "hosts": [{ "hostid": "10084", "name": "Zabbix server", "maintenance_status": "1" }],
            "timeperiods": [{
                "timeperiodid": "4",
                "timeperiod_type": "0",
                "period": "3600",
                "start_date": "1358844540",
                "every": "1",
                "dayofweek": "0"
            }]
        })
    }

    #[test]
    fn test_decode() {
        let m: Maintenance = serde_json::from_value(sample()).unwrap();
        assert_eq!(m.id, Some(Id(3)));
        assert_eq!(m.active_since.unix(), 1358844540);
        assert_eq!(m.groups[0].name, "Zabbix servers");
        assert_eq!(m.time_periods[0].period, Duration::from_secs(3600));
        assert_eq!(m.time_periods[0].timeperiod_type, TimePeriodType::OneTimeOnly);
    }

    #[test]
    fn test_to_write_strips_read_only_parts() {
        let m: Maintenance = serde_json::from_value(sample()).unwrap();
        let value = serde_json::to_value(m.to_write()).unwrap();
        assert_eq!(value["maintenanceid"], "3");
        assert_eq!(value["hosts"], json!([{ "hostid": "10084" }]));
        assert_eq!(value["groups"], json!([{ "groupid": "4" }]));
        assert_eq!(
            value["timeperiods"],
            json!([{ "period": "3600", "timeperiod_type": "0", "start_date": "1358844540" }])
        );
    }

    #[test]
    fn test_single_time_period() {
        let mut m: Maintenance = serde_json::from_value(sample()).unwrap();
        m.single_time_period_mut().unwrap().period = Duration::from_secs(60);
        assert_eq!(m.time_periods[0].period.as_secs(), 60);

        m.time_periods.push(TimePeriod::default());
        assert!(matches!(
            m.single_time_period_mut(),
            Err(Error::UnsupportedTimePeriods(2))
        ));
    }

    #[tokio::test]
    async fn test_create_sets_id() {
        let api = api(|req| Ok(mock::ok(req, json!({ "maintenanceids": ["12"] }))));
        let mut m = Maintenance {
            name: "deploy".into(),
            active_since: Timestamp::from_unix(1_700_000_000).unwrap(),
            active_till: Timestamp::from_unix(1_700_003_600).unwrap(),
            hosts: vec![Host::with_id(Id(10084))],
            time_periods: vec![TimePeriod::one_time(
                Timestamp::from_unix(1_700_000_000).unwrap(),
                Duration::from_secs(3600),
            )],
            ..Maintenance::default()
        };
        assert_eq!(api.create_maintenance(&mut m).await.unwrap(), Id(12));
        assert_eq!(m.id, Some(Id(12)));

        let params = &sent(&api, "maintenance.create")[0];
        assert!(params.get("maintenanceid").is_none());
        assert_eq!(params["active_since"], "1700000000");
        assert_eq!(params["tags_evaltype"], "0");
        assert_eq!(params["timeperiods"][0]["period"], "3600");
    }

    #[tokio::test]
    async fn test_by_name_requires_exactly_one() {
        let api = api(|req| Ok(mock::ok(req, json!([]))));
        let err = api.maintenance_by_name("nope").await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedCount { got: 0, want: 1, .. }
        ));
        let params = &sent(&api, "maintenance.get")[0];
        assert_eq!(params["filter"], json!({ "name": ["nope"] }));
        assert_eq!(params["selectTimeperiods"][0], "timeperiodid");
    }

    #[tokio::test]
    async fn test_by_id() {
        let api = api(|req| Ok(mock::ok(req, json!([sample()]))));
        let m = api.maintenance_by_id(Id(3)).await.unwrap();
        assert_eq!(m.name, "Sunday maintenance");
        assert_eq!(
            sent(&api, "maintenance.get")[0]["filter"],
            json!({ "maintenanceid": ["3"] })
        );
    }

    #[tokio::test]
    async fn test_ids_by_names_count_must_match() {
        let api = api(|req| Ok(mock::ok(req, json!([{ "maintenanceid": "3" }]))));
        let ids = api.maintenance_ids_by_names(&["a".into()]).await.unwrap();
        assert_eq!(ids, vec![Id(3)]);

        let err = api
            .maintenance_ids_by_names(&["a".into(), "b".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedCount { got: 1, want: 2, .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let api = api(|req| Ok(mock::ok(req, json!({ "maintenanceids": ["3", "5"] }))));
        let deleted = api.delete_maintenances(&[Id(3), Id(5)]).await.unwrap();
        assert_eq!(deleted, vec![Id(3), Id(5)]);
        assert_eq!(sent(&api, "maintenance.delete")[0], json!(["3", "5"]));
    }
}
