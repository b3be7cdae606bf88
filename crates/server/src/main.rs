// xss-collector main.rs
// HTTP collector for blind XSS callbacks, plus the operator console

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use xss_core::DataUri;
use xss_server::console::{AutoConfirm, Confirm, StdinConfirm, SystemClipboard};
use xss_server::logging::init_logging;
use xss_server::{
    build_router, store, AdminConsole, AppState, CollectorConfig, PurgeOutcome, StoreConfig,
};

/// Blind XSS callback collector
#[derive(Parser, Debug)]
#[command(name = "xss-collector", version)]
#[command(about = "Collects blind XSS callbacks and manages the collected records")]
struct Cli {
    /// YAML configuration file
    #[arg(long, short, global = true, env = "XSS_COLLECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the configured store)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP collector
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,

        /// Public base URL embedded in the payload
        #[arg(long)]
        public_url: Option<String>,
    },

    /// Print every collected record
    List {
        /// Show full url and cookie instead of truncating
        #[arg(long)]
        full: bool,
    },

    /// Delete one record
    Delete { id: i64 },

    /// Delete every record
    Purge {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Print the injection snippet
    Payload {
        /// Also copy it to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Write a record's screenshot to a file
    Screenshot { id: i64, out: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CollectorConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(path) = cli.db {
        config.store = StoreConfig::Sqlite { path };
    }

    let _guard = init_logging(config.log_dir.as_deref());

    match cli.command {
        Command::Serve {
            bind,
            port,
            public_url,
        } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(url) = public_url {
                config.public_url = url;
            }
            serve(config).await
        }
        Command::List { full } => {
            let mut console = open_console(&config).await?;
            if full {
                console.expand_all();
            }
            print!("{}", console.render_table());
            Ok(())
        }
        Command::Delete { id } => {
            let mut console = open_console(&config).await?;
            if console.delete_one(id).await.context("delete failed")? {
                println!("Deleted record {id}");
            } else {
                println!("No record with id {id}");
            }
            Ok(())
        }
        Command::Purge { yes } => {
            let mut console = open_console(&config).await?;
            let mut confirm: Box<dyn Confirm> = if yes {
                Box::new(AutoConfirm(true))
            } else {
                Box::new(StdinConfirm)
            };
            match console
                .delete_all(confirm.as_mut())
                .await
                .context("delete all failed")?
            {
                PurgeOutcome::Cancelled => println!("Cancelled"),
                PurgeOutcome::Purged(count) => println!("Deleted {count} records"),
            }
            Ok(())
        }
        Command::Payload { copy } => {
            let payload = config.payload_settings();
            if copy {
                let mut clipboard = SystemClipboard::open()?;
                let text = AdminConsole::copy_payload(&payload, &mut clipboard)?;
                println!("{text}");
                eprintln!("Copied to clipboard");
            } else {
                println!("{}", payload.snippet());
            }
            Ok(())
        }
        Command::Screenshot { id, out } => {
            let console = open_console(&config).await?;
            let Some(row) = console.rows().iter().find(|r| r.record.id == id) else {
                bail!("no record with id {id}");
            };
            let Some(shot) = row.record.screenshot.as_deref().filter(|s| !s.is_empty()) else {
                bail!("record {id} has no screenshot");
            };
            let image = DataUri::parse(shot).context("decoding screenshot")?;
            std::fs::write(&out, &image.bytes)
                .with_context(|| format!("writing {}", out.display()))?;
            println!(
                "Wrote {} ({}, {} bytes)",
                out.display(),
                image.mime,
                image.bytes.len()
            );
            Ok(())
        }
    }
}

async fn open_console(config: &CollectorConfig) -> Result<AdminConsole> {
    let store = store::open(&config.store).context("opening record store")?;
    Ok(AdminConsole::load(store).await?)
}

async fn serve(config: CollectorConfig) -> Result<()> {
    let store = store::open(&config.store).context("opening record store")?;
    let state = Arc::new(AppState::from_config(store, &config)?);
    let cors = config.cors.layer()?;

    if config.cors.allows_any() {
        tracing::info!("CORS: any origin");
    } else {
        tracing::info!("CORS: {}", config.cors.allowed_origins.join(", "));
    }
    tracing::info!("Trigger time offset: {}", config.utc_offset);
    tracing::info!("Payload: {}", state.payload.snippet());

    let app = build_router(state, cors);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Collector listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
