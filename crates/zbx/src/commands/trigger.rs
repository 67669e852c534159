//! `zbx trigger ...`

use anyhow::bail;
use clap::Args;
use zabbix_api::{Api, TriggerQuery, TriggerStatus};
use zabbix_rpc::{HttpTransport, Id};

use super::Context;
use crate::display::DisplayTrigger;

#[derive(Debug, Clone, Default, Args)]
pub struct TriggerArgs {
    /// Trigger ids
    #[arg(short, long)]
    pub id: Vec<Id>,
    /// Host names
    #[arg(short = 'H', long)]
    pub host: Vec<String>,
    /// Host group names
    #[arg(short, long)]
    pub group: Vec<String>,
    /// Trigger descriptions (exact match)
    #[arg(short, long)]
    pub desc: Vec<String>,
}

impl TriggerArgs {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.host.is_empty() && self.group.is_empty() && self.desc.is_empty()
    }

    /// Enabling or disabling needs a criterion, so an empty query never
    /// matches every trigger.
    pub fn require_criteria(&self) -> anyhow::Result<()> {
        if self.is_empty() {
            bail!(r#"at least one of "--id", "--host", "--group" or "--desc" must be set"#);
        }
        Ok(())
    }

    pub fn query(&self) -> TriggerQuery {
        TriggerQuery {
            trigger_ids: self.id.clone(),
            host_names: self.host.clone(),
            group_names: self.group.clone(),
            descriptions: self.desc.clone(),
        }
    }
}

pub async fn get<T: HttpTransport>(
    api: &Api<T>,
    args: &TriggerArgs,
) -> anyhow::Result<Vec<DisplayTrigger>> {
    let triggers = api.triggers(&args.query()).await?;
    tracing::info!(count = triggers.len(), "triggers");
    Ok(triggers.iter().map(DisplayTrigger::from).collect())
}

/// Enable or disable the matching triggers. Returns the ids changed, or
/// `None` on dry run.
pub async fn set_status<T: HttpTransport>(
    api: &Api<T>,
    args: &TriggerArgs,
    status: TriggerStatus,
    ctx: &Context,
) -> anyhow::Result<Option<Vec<Id>>> {
    args.require_criteria()?;
    let ids = api.trigger_ids(&args.query()).await?;
    if ids.is_empty() {
        tracing::warn!("no triggers matched");
        return Ok(Some(Vec::new()));
    }
    if ctx.dry_run {
        tracing::info!(?ids, ?status, "skip changing trigger status due to dry run");
        return Ok(None);
    }
    let updated = api.set_trigger_status(&ids, status).await?;
    tracing::info!(?updated, ?status, "changed trigger status");
    Ok(Some(updated))
}
