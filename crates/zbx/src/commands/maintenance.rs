//! `zbx mainte ...`

use std::future::Future;
use std::time::Duration;

use anyhow::bail;
use chrono::{DateTime, Local};
use clap::Args;
use zabbix_api::{
    all_in_status, contains_dup, dedup_sorted, merge_hosts_dedup, sort_hosts, Api, Host,
    HostGroup, Maintenance, MaintenanceStatus, MaintenanceType, TagsEvalType, TimePeriod,
};
use zabbix_rpc::{HttpTransport, Id, Timestamp};

use super::Context;
use crate::args::{now_minute, parse_duration, parse_local_time};
use crate::display::{DisplayHost, DisplayMaintenance};

#[derive(Debug, Clone, Default, Args)]
pub struct CreateArgs {
    /// Name of maintenance to create
    #[arg(short, long)]
    pub name: String,
    /// Description of maintenance
    #[arg(short, long, default_value = "")]
    pub desc: String,
    /// Host group names
    #[arg(short, long)]
    pub group: Vec<String>,
    /// Host names
    #[arg(short = 'H', long)]
    pub host: Vec<String>,
    /// Include groups named "<group>/..." below each --group
    #[arg(long)]
    pub include_nested: bool,
    /// Active start time (default: same as --start-date)
    #[arg(long, value_parser = parse_local_time)]
    pub active_since: Option<DateTime<Local>>,
    /// Active end time (default: --start-date + --period)
    #[arg(long, value_parser = parse_local_time)]
    pub active_till: Option<DateTime<Local>>,
    /// Start time of the period (default: now)
    #[arg(long, value_parser = parse_local_time)]
    pub start_date: Option<DateTime<Local>>,
    /// Length of maintenance, e.g. 90m or 1h30m
    #[arg(short, long, value_parser = parse_duration)]
    pub period: Duration,
    #[command(flatten)]
    pub wait: WaitArgs,
}

impl CreateArgs {
    /// Flag checks that need no server.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() && self.group.is_empty() {
            bail!(r#"at least "--host" or "--group" must be set"#);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Rename maintenance to this name
    #[arg(long)]
    pub new_name: Option<String>,
    /// Description of maintenance
    #[arg(short, long)]
    pub desc: Option<String>,
    /// Host group names (a single empty value clears the groups)
    #[arg(short, long)]
    pub group: Vec<String>,
    /// Host names (a single empty value clears the hosts)
    #[arg(short = 'H', long)]
    pub host: Vec<String>,
    /// Include groups named "<group>/..." below each --group
    #[arg(long)]
    pub include_nested: bool,
    #[arg(long, value_parser = parse_local_time)]
    pub active_since: Option<DateTime<Local>>,
    #[arg(long, value_parser = parse_local_time)]
    pub active_till: Option<DateTime<Local>>,
    #[arg(long, value_parser = parse_local_time)]
    pub start_date: Option<DateTime<Local>>,
    #[arg(short, long, value_parser = parse_duration)]
    pub period: Option<Duration>,
    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DeleteArgs {
    /// Maintenance ids (can be mixed with --name)
    #[arg(short, long)]
    pub id: Vec<Id>,
    /// Maintenance names (can be mixed with --id)
    #[arg(short, long)]
    pub name: Vec<String>,
}

impl DeleteArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.is_empty() && self.name.is_empty() {
            bail!(r#"at least one "--name" or "--id" must be set"#);
        }
        if contains_dup(&self.id) {
            bail!(r#"duplicated IDs are set with "--id""#);
        }
        if contains_dup(&self.name) {
            bail!(r#"duplicated names are set with "--name""#);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub wait: WaitArgs,
}

/// Exactly one of `--id` or `--name`.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Target maintenance id
    #[arg(short, long)]
    pub id: Option<Id>,
    /// Target maintenance name, used when --id is not set
    #[arg(short, long)]
    pub name: Option<String>,
}

enum Target<'a> {
    Id(Id),
    Name(&'a str),
}

impl TargetArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.selected().map(|_| ())
    }

    fn selected(&self) -> anyhow::Result<Target<'_>> {
        match (self.id, self.name.as_deref().filter(|n| !n.is_empty())) {
            (Some(id), None) => Ok(Target::Id(id)),
            (None, Some(name)) => Ok(Target::Name(name)),
            _ => bail!(r#"just one of "--name" or "--id" must be set"#),
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct WaitArgs {
    /// Wait until all hosts are in maintenance
    #[arg(short, long)]
    pub wait: bool,
    /// Polling interval while waiting (default: [wait] interval_secs)
    #[arg(long, value_parser = parse_duration)]
    pub interval: Option<Duration>,
}

/// Outcome of a wait.
#[derive(Debug)]
pub enum WaitOutcome {
    InEffect(Vec<Host>),
    Interrupted,
}

async fn target<T: HttpTransport>(
    api: &Api<T>,
    target: &TargetArgs,
) -> anyhow::Result<Maintenance> {
    let maintenance = match target.selected()? {
        Target::Id(id) => api.maintenance_by_id(id).await?,
        Target::Name(name) => api.maintenance_by_name(name).await?,
    };
    Ok(maintenance)
}

async fn host_refs<T: HttpTransport>(
    api: &Api<T>,
    names: &[String],
) -> anyhow::Result<Vec<Host>> {
    let hosts = api.hosts_by_names(names).await?;
    Ok(hosts.iter().map(Host::reference).collect())
}

async fn group_refs<T: HttpTransport>(
    api: &Api<T>,
    names: &[String],
    include_nested: bool,
) -> anyhow::Result<Vec<HostGroup>> {
    let groups = if include_nested {
        let groups = api.nested_host_groups_by_ancestor_names(names).await?;
        tracing::info!(
            groups = ?groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            "expanded nested host groups"
        );
        groups
    } else {
        api.host_groups_by_names(names).await?
    };
    Ok(groups.iter().map(HostGroup::reference).collect())
}

fn is_clear(values: &[String]) -> bool {
    matches!(values, [only] if only.is_empty())
}

fn end_of(start: DateTime<Local>, period: Duration) -> anyhow::Result<DateTime<Local>> {
    let delta = chrono::Duration::from_std(period)?;
    match start.checked_add_signed(delta) {
        Some(end) => Ok(end),
        None => bail!("period {period:?} is too long"),
    }
}

/// Create a maintenance. Returns it with its new id, or `None` on dry run.
pub async fn create<T: HttpTransport>(
    api: &Api<T>,
    args: &CreateArgs,
    ctx: &Context,
) -> anyhow::Result<Option<Maintenance>> {
    args.validate()?;

    let hosts = if args.host.is_empty() {
        Vec::new()
    } else {
        host_refs(api, &args.host).await?
    };
    let groups = if args.group.is_empty() {
        Vec::new()
    } else {
        group_refs(api, &args.group, args.include_nested).await?
    };

    let start = args.start_date.unwrap_or_else(now_minute);
    let since = args.active_since.unwrap_or(start);
    let till = match args.active_till {
        Some(t) => t,
        None => end_of(start, args.period)?,
    };

    let mut maintenance = Maintenance {
        id: None,
        name: args.name.clone(),
        active_since: Timestamp::from(since),
        active_till: Timestamp::from(till),
        description: args.desc.clone(),
        maintenance_type: MaintenanceType::WithData,
        tags_evaltype: TagsEvalType::AndOr,
        groups,
        hosts,
        time_periods: vec![TimePeriod::one_time(Timestamp::from(start), args.period)],
    };

    if ctx.dry_run {
        tracing::info!(name = %args.name, "skip creating maintenance due to dry run");
        return Ok(None);
    }
    let id = api.create_maintenance(&mut maintenance).await?;
    tracing::info!(url = %ctx.maintenance_url(id)?, "created maintenance");
    Ok(Some(maintenance))
}

/// Update a single-period maintenance. Returns `None` on dry run.
pub async fn update<T: HttpTransport>(
    api: &Api<T>,
    args: &UpdateArgs,
    ctx: &Context,
) -> anyhow::Result<Option<Maintenance>> {
    let mut maintenance = target(api, &args.target).await?;
    let period = maintenance.single_time_period_mut()?;
    if let Some(start) = args.start_date {
        period.start_date = Timestamp::from(start);
    }
    if let Some(length) = args.period {
        period.period = length;
    }

    if is_clear(&args.host) {
        maintenance.hosts.clear();
    } else if !args.host.is_empty() {
        maintenance.hosts = host_refs(api, &args.host).await?;
    }
    if is_clear(&args.group) {
        maintenance.groups.clear();
    } else if !args.group.is_empty() {
        maintenance.groups = group_refs(api, &args.group, args.include_nested).await?;
    }

    if let Some(name) = args.new_name.as_ref().filter(|s| !s.is_empty()) {
        maintenance.name = name.clone();
    }
    if let Some(desc) = args.desc.as_ref().filter(|s| !s.is_empty()) {
        maintenance.description = desc.clone();
    }
    if let Some(t) = args.active_since {
        maintenance.active_since = Timestamp::from(t);
    }
    if let Some(t) = args.active_till {
        maintenance.active_till = Timestamp::from(t);
    }

    let id = maintenance.id.unwrap_or_default();
    if ctx.dry_run {
        tracing::info!(name = %maintenance.name, %id, "skip updating maintenance due to dry run");
        return Ok(None);
    }
    let id = api.update_maintenance(&maintenance).await?;
    tracing::info!(url = %ctx.maintenance_url(id)?, "updated maintenance");
    Ok(Some(maintenance))
}

/// All maintenances, sorted by id.
pub async fn get<T: HttpTransport>(api: &Api<T>) -> anyhow::Result<Vec<DisplayMaintenance>> {
    let mut maintenances = api.maintenances().await?;
    maintenances.sort_by_key(|m| m.id);
    tracing::info!(count = maintenances.len(), "maintenances");
    Ok(maintenances.iter().map(DisplayMaintenance::from).collect())
}

/// Delete by ids and names. Returns the ids deleted, or `None` on dry run.
pub async fn delete<T: HttpTransport>(
    api: &Api<T>,
    args: &DeleteArgs,
    ctx: &Context,
) -> anyhow::Result<Option<Vec<Id>>> {
    args.validate()?;

    let by_ids = if args.id.is_empty() {
        Vec::new()
    } else {
        api.maintenance_ids_by_ids(&args.id).await?
    };
    let by_names = if args.name.is_empty() {
        Vec::new()
    } else {
        api.maintenance_ids_by_names(&args.name).await?
    };
    let targets = dedup_sorted(&[&by_ids[..], &by_names[..]]);

    if ctx.dry_run {
        tracing::info!(
            ids = ?args.id,
            names = ?args.name,
            "skip deleting maintenance due to dry run"
        );
        return Ok(None);
    }
    let deleted = api.delete_maintenances(&targets).await?;
    tracing::info!(targets = ?targets, deleted = ?deleted, "deleted maintenances");
    Ok(Some(deleted))
}

/// Hosts covered by a maintenance: its own hosts plus the hosts of its
/// groups, one per name, sorted by name.
pub async fn effective_hosts<T: HttpTransport>(
    api: &Api<T>,
    maintenance: &Maintenance,
) -> anyhow::Result<Vec<Host>> {
    let mut hosts = if maintenance.groups.is_empty() {
        merge_hosts_dedup(&[&maintenance.hosts[..]])
    } else {
        let group_ids: Vec<Id> = maintenance.groups.iter().map(|g| g.id).collect();
        let in_groups = api.hosts_by_group_ids(&group_ids).await?;
        merge_hosts_dedup(&[&maintenance.hosts[..], &in_groups[..]])
    };
    sort_hosts(&mut hosts);
    Ok(hosts)
}

pub async fn status<T: HttpTransport>(
    api: &Api<T>,
    args: &StatusArgs,
) -> anyhow::Result<(DisplayMaintenance, Vec<DisplayHost>)> {
    let maintenance = target(api, &args.target).await?;
    let hosts = effective_hosts(api, &maintenance).await?;
    Ok((
        DisplayMaintenance::from(&maintenance),
        hosts.iter().map(DisplayHost::from).collect(),
    ))
}

/// Poll until every host of the maintenance is in effect, or `shutdown`
/// completes.
pub async fn wait_in_effect<T, S>(
    api: &Api<T>,
    id: Id,
    interval: Duration,
    shutdown: S,
) -> anyhow::Result<WaitOutcome>
where
    T: HttpTransport,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let maintenance = api.maintenance_by_id(id).await?;
        let hosts = effective_hosts(api, &maintenance).await?;
        if all_in_status(&hosts, MaintenanceStatus::InEffect) {
            tracing::info!(%id, hosts = hosts.len(), "all hosts in maintenance are in effect");
            return Ok(WaitOutcome::InEffect(hosts));
        }

        tracing::info!(%id, ?interval, "waiting for maintenance status change in all hosts");
        tokio::select! {
            _ = &mut shutdown => return Ok(WaitOutcome::Interrupted),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
