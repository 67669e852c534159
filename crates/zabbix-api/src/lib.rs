//! Zabbix API -- typed helpers over [`zabbix_rpc::Client`].
//!
//! Object types mirror the Zabbix 6.0 API reference. Ids are decimal
//! strings on the wire and timestamps are strings of Unix seconds; both are
//! handled by the [`zabbix_rpc::Id`] and [`zabbix_rpc::Timestamp`] scalars.

pub mod error;
pub mod host;
pub mod hostgroup;
pub mod item;
pub mod maintenance;
pub mod trigger;

pub use error::{Error, Result};
pub use host::{all_in_status, merge_hosts_dedup, sort_hosts, Host, MaintenanceStatus};
pub use hostgroup::HostGroup;
pub use item::Item;
pub use maintenance::{Maintenance, MaintenanceType, TagsEvalType, TimePeriod, TimePeriodType};
pub use trigger::{Trigger, TriggerQuery, TriggerStatus};

use zabbix_rpc::{Client, HttpTransport, ReqwestTransport};

/// Domain operations on top of a connected client.
pub struct Api<T = ReqwestTransport> {
    client: Client<T>,
}

impl<T> std::fmt::Debug for Api<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Api").field(&self.client).finish()
    }
}

impl<T: HttpTransport> Api<T> {
    pub fn new(client: Client<T>) -> Self {
        Self { client }
    }

    /// The underlying RPC client, for login and raw calls.
    pub fn rpc(&self) -> &Client<T> {
        &self.client
    }
}

/// Concatenate, sort and deduplicate.
pub fn dedup_sorted<T: Ord + Clone>(lists: &[&[T]]) -> Vec<T> {
    let mut all: Vec<T> = lists.iter().flat_map(|l| l.iter().cloned()).collect();
    all.sort();
    all.dedup();
    all
}

/// True if any value appears more than once.
pub fn contains_dup<T: Eq + std::hash::Hash>(values: &[T]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(values.len());
    values.iter().any(|v| !seen.insert(v))
}


#[cfg(test)]
mod tests {
    use super::*;
    use zabbix_rpc::Id;

    #[test]
    fn test_dedup_sorted() {
        let a = [Id(5), Id(3)];
        let b = [Id(3), Id(1)];
        assert_eq!(dedup_sorted(&[&a[..], &b[..]]), vec![Id(1), Id(3), Id(5)]);
        assert!(dedup_sorted::<Id>(&[]).is_empty());
    }

    #[test]
    fn test_contains_dup() {
        assert!(!contains_dup::<String>(&[]));
        assert!(!contains_dup(&["a", "b"]));
        assert!(contains_dup(&["a", "b", "a"]));
    }
}
