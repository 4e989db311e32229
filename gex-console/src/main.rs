/**
 * GEX CONSOLE - Point d'entrée CLI
 *
 * RÔLE : Pilote les contrôleurs de la bibliothèque depuis le terminal :
 * stats temps réel, logs, configuration, règles, fichiers de règles, services.
 *
 * FONCTIONNEMENT : config YAML + .env + options globales (--url, --locale),
 * une page terminal par commande, confirmation interactive sauf --yes.
 */

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gex_console::config::{load_config, ConsoleConfig};
use gex_console::confirm::{AutoConfirm, Confirm, StdinConfirm};
use gex_console::controllers::{
    ConfigController, Context, LogsController, RuleFilesController, RulesController, StatsController,
};
use gex_console::documents::SaveOutcome;
use gex_console::locale::Locale;
use gex_console::page::{ids, Page, PageKind};
use gex_console::terminal::{rule_line, TerminalPage};
use gex_console::{ApiClient, Console};

#[derive(Parser)]
#[command(name = "gex-console", version, about = "Administration console for the GEX firewall dashboard")]
struct Cli {
    /// URL du backend (prioritaire sur la config et GEX_CONSOLE_URL)
    #[arg(long, global = true)]
    url: Option<String>,
    /// Fichier de configuration YAML
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    locale: Option<Locale>,
    /// Répond oui à toutes les confirmations
    #[arg(short, long, global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Statistiques système et compteurs de paquets
    Stats {
        #[arg(long)]
        once: bool,
    },
    Logs {
        /// Suivi en direct via /ws/logs
        #[arg(long)]
        follow: bool,
    },
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
    Rules {
        #[command(subcommand)]
        action: RulesCmd,
    },
    /// Fichiers de règles JSON bruts
    Files {
        #[command(subcommand)]
        action: FilesCmd,
    },
    /// Redémarre un service (web, nfq)
    Restart { service: String },
}

#[derive(Subcommand)]
enum ConfigCmd {
    Show,
    /// Remplace la configuration par le contenu de FILE (`-` = stdin)
    Set { input: String },
}

#[derive(Subcommand)]
enum RulesCmd {
    List,
    Show { id: String },
    Create { input: String },
    Edit { id: String, input: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum FilesCmd {
    List,
    Show { name: String },
    Create { name: String, input: String },
    Edit { name: String, input: String },
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gex_console=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref()).await;
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    let confirm: Arc<dyn Confirm> = if cli.yes { Arc::new(AutoConfirm::new(true)) } else { Arc::new(StdinConfirm) };
    let api = ApiClient::new(&config.base_url, config.request_timeout()).context("invalid backend url")?;
    info!("using backend {}", config.base_url);

    match cli.command {
        Command::Stats { once } => stats(api, config, confirm, once).await,
        Command::Logs { follow } => logs(api, config, confirm, follow).await,
        Command::Config { action } => config_cmd(api, config, confirm, action).await,
        Command::Rules { action } => rules(api, config, confirm, action).await,
        Command::Files { action } => files(api, config, confirm, action).await,
        Command::Restart { service } => {
            let ctx = context(api, config, confirm, PageKind::Dashboard);
            match StatsController::new(ctx).restart_service(&service).await? {
                Some(_) => Ok(()),
                None => cancelled(),
            }
        }
    }
}

fn context(api: ApiClient, config: ConsoleConfig, confirm: Arc<dyn Confirm>, kind: PageKind) -> Context {
    let page: Arc<dyn Page> = Arc::new(TerminalPage::new(&[kind]));
    Context::new(api, page, config, confirm)
}

async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await.context("reading stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(input).await.with_context(|| format!("reading {input}"))
}

fn cancelled() -> Result<()> {
    println!("Cancelled");
    Ok(())
}

fn saved(outcome: SaveOutcome) -> Result<()> {
    match outcome {
        SaveOutcome::Saved { .. } => Ok(()),
        SaveOutcome::Cancelled => cancelled(),
    }
}

/// Bloque jusqu'à Ctrl+C puis démonte la page
async fn live(mut console: Console, kind: PageKind) -> Result<()> {
    console.open(kind).await;
    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    console.close();
    Ok(())
}

async fn stats(api: ApiClient, config: ConsoleConfig, confirm: Arc<dyn Confirm>, once: bool) -> Result<()> {
    let ctx = context(api, config, confirm, PageKind::Dashboard);
    if !once {
        return live(Console::new(ctx), PageKind::Dashboard).await;
    }
    let stats = StatsController::new(ctx);
    stats.refresh_stats().await.context("fetching /api/stats")?;
    stats.refresh_packets().await.context("fetching /api/packet-stats")?;
    Ok(())
}

async fn logs(api: ApiClient, mut config: ConsoleConfig, confirm: Arc<dyn Confirm>, follow: bool) -> Result<()> {
    if follow {
        config.logs_follow = true;
        let ctx = context(api, config, confirm, PageKind::Logs);
        return live(Console::new(ctx), PageKind::Logs).await;
    }
    let ctx = context(api, config, confirm, PageKind::Logs);
    LogsController::new(ctx).refresh().await.context("fetching /api/logs")?;
    Ok(())
}

async fn config_cmd(api: ApiClient, config: ConsoleConfig, confirm: Arc<dyn Confirm>, action: ConfigCmd) -> Result<()> {
    let ctx = context(api, config, confirm, PageKind::Config);
    let controller = ConfigController::new(ctx);
    controller.load().await.context("loading configuration")?;
    match action {
        ConfigCmd::Show => println!("{}", controller.text().await),
        ConfigCmd::Set { input } => {
            controller.set_text(&read_input(&input).await?).await;
            controller.submit().await.context("saving configuration")?;
        }
    }
    Ok(())
}

async fn rules(api: ApiClient, config: ConsoleConfig, confirm: Arc<dyn Confirm>, action: RulesCmd) -> Result<()> {
    let labels = config.locale.labels();
    let controller = RulesController::new(context(api, config, confirm, PageKind::Rules));
    match action {
        RulesCmd::List => {
            let rules = controller.refresh().await.context("loading rules")?;
            if rules.is_empty() {
                println!("{}", labels.no_rules);
            }
            for rule in &rules {
                println!("{}", rule_line(rule, labels));
            }
            Ok(())
        }
        RulesCmd::Show { id } => {
            controller.edit(&id).await.with_context(|| format!("loading rule {id}"))?;
            println!("{}", controller.text().await);
            Ok(())
        }
        RulesCmd::Create { input } => {
            let text = read_input(&input).await?;
            controller.new_rule().await;
            controller.set_text(&text).await;
            saved(controller.save().await.context("creating rule")?)
        }
        RulesCmd::Edit { id, input } => {
            let text = read_input(&input).await?;
            controller.edit(&id).await.with_context(|| format!("loading rule {id}"))?;
            controller.set_text(&text).await;
            saved(controller.save().await.with_context(|| format!("updating rule {id}"))?)
        }
        RulesCmd::Delete { id } => match controller.delete(&id).await? {
            true => Ok(()),
            false => cancelled(),
        },
    }
}

async fn files(api: ApiClient, config: ConsoleConfig, confirm: Arc<dyn Confirm>, action: FilesCmd) -> Result<()> {
    let labels = config.locale.labels();
    let ctx = context(api, config, confirm, PageKind::RuleFiles);
    let page = ctx.page.clone();
    let controller = RuleFilesController::new(ctx);
    match action {
        FilesCmd::List => {
            let files = controller.refresh().await.context("loading rule files")?;
            if files.is_empty() {
                println!("{}", labels.no_files);
            }
            for name in &files {
                println!("{name}.json");
            }
            Ok(())
        }
        FilesCmd::Show { name } => {
            controller.edit(&name).await.with_context(|| format!("loading {name}.json"))?;
            println!("{}", controller.text().await);
            Ok(())
        }
        FilesCmd::Create { name, input } => {
            let text = read_input(&input).await?;
            controller.create_new().await;
            page.set_text(ids::RULE_FILENAME, &name);
            controller.set_text(&text).await;
            saved(controller.save().await.with_context(|| format!("creating {name}.json"))?)
        }
        FilesCmd::Edit { name, input } => {
            let text = read_input(&input).await?;
            controller.edit(&name).await.with_context(|| format!("loading {name}.json"))?;
            controller.set_text(&text).await;
            saved(controller.save().await.with_context(|| format!("saving {name}.json"))?)
        }
        FilesCmd::Delete { name } => match controller.delete(&name).await? {
            true => Ok(()),
            false => cancelled(),
        },
    }
}
