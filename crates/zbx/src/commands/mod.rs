pub mod maintenance;
pub mod trigger;

use anyhow::Context as _;
use reqwest::Url;
use zabbix_rpc::Id;

/// Per-invocation options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Frontend base URL, used to build web UI links.
    pub base_url: String,
    /// Skip calls that change server state.
    pub dry_run: bool,
}

impl Context {
    /// Web UI form of a maintenance.
    pub fn maintenance_url(&self, id: Id) -> anyhow::Result<Url> {
        let mut base = Url::parse(&self.base_url)
            .with_context(|| format!("invalid server url {:?}", self.base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut url = base.join("maintenance.php")?;
        url.query_pairs_mut()
            .append_pair("form", "update")
            .append_pair("maintenanceid", &id.to_string());
        Ok(url)
    }
}
