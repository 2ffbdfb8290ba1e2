use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use svc_router_common::SystemConfig;
use svc_router_engine::OrchestratorSession;
use tracing::warn;

mod display;
mod interactive;
mod logging;
mod oneshot;
mod seed;

#[derive(Parser)]
#[command(name = "svc-router")]
#[command(about = "Agentic orchestration over a registry of REST services")]
struct Cli {
    /// Config file (TOML); defaults are used when it does not exist
    #[arg(long, default_value = "svc-router.toml")]
    config: String,

    /// Log filter, e.g. "info" or "svc_router_engine=debug"
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Query (one-shot ReAct mode)
    query: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan, execute, and summarize one query in batch mode
    Plan { query: String },

    /// Manage the service registry file
    Services {
        #[command(subcommand)]
        command: ServicesCommand,
    },
}

#[derive(Subcommand)]
enum ServicesCommand {
    /// List registered services
    List,

    /// Write the built-in sample services to the registry file
    Seed,

    /// Remove a service by id
    Remove { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log)?;

    let config = load_config(&cli.config);
    let registry_path = registry_path(&config);

    let mut session = OrchestratorSession::new(&config)
        .context("Failed to create orchestration session")?;

    if let Err(e) = session.registry_mut().load_json(&registry_path) {
        // a broken registry file must not take the process down
        warn!("Could not load registry {}: {}", registry_path.display(), e);
    }

    match cli.command {
        Some(Commands::Plan { query }) => {
            oneshot::execute_plan(&session, &query).await;
        }
        Some(Commands::Services { command }) => {
            run_services_command(&mut session, &registry_path, command)?;
        }
        None => match cli.query {
            Some(query) => oneshot::execute_react(&session, &query).await,
            None => interactive::run(&session).await?,
        },
    }

    Ok(())
}

fn load_config(path: &str) -> SystemConfig {
    match SystemConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            if std::path::Path::new(path).exists() {
                warn!("Could not read config {}: {}. Using defaults.", path, e);
            }
            let mut config = SystemConfig::default();
            config.apply_env();
            config
        }
    }
}

fn registry_path(config: &SystemConfig) -> PathBuf {
    config
        .registry
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from("services.json"))
}

fn run_services_command(
    session: &mut OrchestratorSession,
    registry_path: &std::path::Path,
    command: ServicesCommand,
) -> anyhow::Result<()> {
    match command {
        ServicesCommand::List => {
            let mut services = session.registry().list();
            services.sort_by(|a, b| a.name.cmp(&b.name));
            if services.is_empty() {
                println!("No services registered.");
            }
            for service in services {
                println!(
                    "{:<24} {:<7} {}  ({})",
                    service.id, service.method, service.url, service.name
                );
            }
        }
        ServicesCommand::Seed => {
            for service in seed::sample_services() {
                session.registry_mut().add(service);
            }
            session
                .registry()
                .save_json(registry_path)
                .context("Failed to write registry file")?;
            println!(
                "Seeded {} services into {}",
                session.registry().len(),
                registry_path.display()
            );
        }
        ServicesCommand::Remove { id } => {
            if session.registry_mut().remove(&id) {
                session
                    .registry()
                    .save_json(registry_path)
                    .context("Failed to write registry file")?;
                println!("Removed '{}'.", id);
            } else {
                println!("No service with id '{}'.", id);
            }
        }
    }
    Ok(())
}
