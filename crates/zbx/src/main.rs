//! zbx -- manage Zabbix maintenances and triggers from the command line.
//!
//! Usage:
//!   zbx -l http://zabbix.example.com/zabbix -u Admin mainte get
//!   zbx mainte create -n deploy -H web01 -p 1h --wait
//!   zbx trigger disable -H web01 -d "Disk full"
//!   zbx api-version

use zbx::commands::maintenance::{
    self, CreateArgs, DeleteArgs, StatusArgs, UpdateArgs, WaitArgs, WaitOutcome,
};
use zbx::commands::trigger::{self, TriggerArgs};
use zbx::commands::Context;
use zbx::config::{LogSection, ZbxConfig};
use zbx::display::{to_line, DisplayHost, DisplayMaintenance};
use zbx::session::{connect, Overrides, Settings};
use zbx::{expand_tilde, DEFAULT_CONFIG_PATH};

use clap::{Parser, Subcommand};
use serde::Serialize;
use zabbix_api::{Api, TriggerStatus};
use zabbix_rpc::{HttpTransport, Id};

#[derive(Parser)]
#[command(name = "zbx", version, about = "Zabbix maintenance and trigger tool")]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "ZBX_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Zabbix frontend URL, e.g. http://example.com/zabbix
    #[arg(short = 'l', long, env = "ZBX_URL")]
    url: Option<String>,

    /// Host header to send instead of the URL's host
    #[arg(long, env = "ZBX_VIRTUAL_HOST")]
    virtual_host: Option<String>,

    #[arg(short, long, env = "ZBX_USERNAME")]
    username: Option<String>,

    /// Prompted for when neither this nor a token is set
    #[arg(short, long, env = "ZBX_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// API token, used instead of username and password
    #[arg(long, env = "ZBX_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log request and response bodies
    #[arg(long)]
    debug: bool,

    /// Do not change anything on the server
    #[arg(long)]
    dry_run: bool,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage maintenances
    Mainte {
        #[command(subcommand)]
        action: MainteAction,
    },
    /// Show, enable or disable triggers
    Trigger {
        #[command(subcommand)]
        action: TriggerAction,
    },
    /// Show the server's API version
    ApiVersion,
}

#[derive(Subcommand)]
enum MainteAction {
    /// Create a one-time maintenance
    Create(CreateArgs),
    /// List all maintenances
    Get,
    /// Update a maintenance with a single time period
    Update(UpdateArgs),
    /// Delete maintenances
    Delete(DeleteArgs),
    /// Show a maintenance and the state of its hosts
    Status(StatusArgs),
}

impl MainteAction {
    /// Reject bad flags before connecting, which may prompt for a password.
    fn validate(&self) -> anyhow::Result<()> {
        match self {
            Self::Create(args) => args.validate(),
            Self::Get => Ok(()),
            Self::Update(args) => args.target.validate(),
            Self::Delete(args) => args.validate(),
            Self::Status(args) => args.target.validate(),
        }
    }
}

#[derive(Subcommand)]
enum TriggerAction {
    Get(TriggerArgs),
    Enable(TriggerArgs),
    Disable(TriggerArgs),
}

impl TriggerAction {
    fn validate(&self) -> anyhow::Result<()> {
        match self {
            Self::Get(_) => Ok(()),
            Self::Enable(args) | Self::Disable(args) => args.require_criteria(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let cfg = match ZbxConfig::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    init_tracing(&cfg.log, cli.debug, cli.log_json);

    if let Err(e) = run(cli, cfg).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(log: &LogSection, debug: bool, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log.directives(debug)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json || log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_line<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", to_line(value)?);
    Ok(())
}

async fn run(cli: Cli, cfg: ZbxConfig) -> anyhow::Result<()> {
    let overrides = Overrides {
        url: cli.url,
        virtual_host: cli.virtual_host,
        username: cli.username,
        password: cli.password,
        token: cli.token,
        debug: cli.debug,
    };
    let settings = Settings::resolve(overrides, &cfg)?;
    tracing::debug!(?settings, "resolved settings");
    let ctx = Context {
        base_url: settings.url.clone(),
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::ApiVersion => {
            let version = settings.client()?.api_version().await?;
            print_line(&serde_json::json!({ "version": version }))?;
        }
        Commands::Mainte { action } => {
            action.validate()?;
            let api = connect(&settings).await?;
            match action {
                MainteAction::Create(args) => {
                    if let Some(m) = maintenance::create(&api, &args, &ctx).await? {
                        print_line(&DisplayMaintenance::from(&m))?;
                        if let Some(id) = m.id {
                            wait_if_asked(&api, id, &args.wait, &cfg).await?;
                        }
                    }
                }
                MainteAction::Get => {
                    for doc in maintenance::get(&api).await? {
                        print_line(&doc)?;
                    }
                }
                MainteAction::Update(args) => {
                    if let Some(m) = maintenance::update(&api, &args, &ctx).await? {
                        print_line(&DisplayMaintenance::from(&m))?;
                        if let Some(id) = m.id {
                            wait_if_asked(&api, id, &args.wait, &cfg).await?;
                        }
                    }
                }
                MainteAction::Delete(args) => {
                    if let Some(ids) = maintenance::delete(&api, &args, &ctx).await? {
                        print_line(&serde_json::json!({ "maintenanceids": ids }))?;
                    }
                }
                MainteAction::Status(args) => {
                    let (doc, hosts) = maintenance::status(&api, &args).await?;
                    print_line(&doc)?;
                    for host in &hosts {
                        print_line(host)?;
                    }
                    if let Some(id) = doc.maintenanceid {
                        wait_if_asked(&api, id, &args.wait, &cfg).await?;
                    }
                }
            }
        }
        Commands::Trigger { action } => {
            action.validate()?;
            let api = connect(&settings).await?;
            let (args, status) = match action {
                TriggerAction::Get(args) => {
                    for doc in trigger::get(&api, &args).await? {
                        print_line(&doc)?;
                    }
                    return Ok(());
                }
                TriggerAction::Enable(args) => (args, TriggerStatus::Enabled),
                TriggerAction::Disable(args) => (args, TriggerStatus::Disabled),
            };
            if let Some(ids) = trigger::set_status(&api, &args, status, &ctx).await? {
                print_line(&serde_json::json!({ "triggerids": ids }))?;
            }
        }
    }

    Ok(())
}

/// With `--wait`, poll until the maintenance is in effect on every host or
/// Ctrl-C is pressed.
async fn wait_if_asked<T: HttpTransport>(
    api: &Api<T>,
    id: Id,
    args: &WaitArgs,
    cfg: &ZbxConfig,
) -> anyhow::Result<()> {
    if !args.wait {
        return Ok(());
    }
    let interval = args.interval.unwrap_or_else(|| cfg.wait_interval());
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    match maintenance::wait_in_effect(api, id, interval, shutdown).await? {
        WaitOutcome::InEffect(hosts) => {
            for host in &hosts {
                print_line(&DisplayHost::from(host))?;
            }
        }
        WaitOutcome::Interrupted => tracing::info!(%id, "stopped waiting"),
    }
    Ok(())
}
