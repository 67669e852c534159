use zabbix_rpc::Id;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Rpc(#[from] zabbix_rpc::Error),
    #[error("{kind} not found: {}", .missing.join(", "))]
    NotFound {
        kind: &'static str,
        missing: Vec<String>,
    },
    #[error("unexpected {what} count: got={got}, want={want}")]
    UnexpectedCount {
        what: &'static str,
        got: usize,
        want: usize,
    },
    #[error("unsupported time period count: got={0}, want=1")]
    UnsupportedTimePeriods(usize),
    /// A multi-object update stopped part way.
    #[error("update failed after {} of the objects were updated: {source}", .updated.len())]
    PartialUpdate {
        updated: Vec<Id>,
        #[source]
        source: zabbix_rpc::Error,
    },
}

impl Error {
    /// Server error code, if the failure came from an API error object.
    pub fn code(&self) -> zabbix_rpc::ErrorCode {
        match self {
            Self::Rpc(e) | Self::PartialUpdate { source: e, .. } => e.code(),
            _ => zabbix_rpc::ErrorCode::None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Names in `wanted` that `found` does not contain, in request order.
pub(crate) fn missing<'a, I>(wanted: I, found: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    wanted
        .into_iter()
        .filter(|w| !found.contains(w))
        .map(str::to_string)
        .collect()
}
