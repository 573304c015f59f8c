//! kasir - serve the Kasir point-of-sale API
//!
//! Loads configuration from the environment (and `.env`), connects to
//! PostgreSQL, then serves the HTTP API until Ctrl+C or SIGTERM.

use std::net::IpAddr;

use anyhow::{Context, Result};
use clap::Parser;
use kasir_db::Db;
use kasir_server::{run_server, AppState, Config, ServerConfig};
use tracing::info;

mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

const BANNER: &str = r#"
 _  __          _            _    ____ ___
| |/ /__ _ ___(_)_ __      / \  |  _ \_ _|
| ' // _` / __| | '__|    / _ \ | |_) | |
| . \ (_| \__ \ | |      / ___ \|  __/| |
|_|\_\__,_|___/_|_|     /_/   \_\_|  |___|
"#;

#[derive(Parser, Debug)]
#[command(
    name = "kasir",
    author,
    version,
    about = "Kasir API - products and categories for a point of sale",
    long_about = "Serve the Kasir API over HTTP. Database settings come from DATABASE_* \
                  environment variables, read from a .env file when one is present."
)]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Address to listen on (overrides HOST)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Allow cross-origin requests from any origin
    #[arg(long)]
    cors_permissive: bool,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(long, env = "KASIR_DEBUG")]
    debug: bool,
}

impl Cli {
    /// Flags override whatever the environment configured
    fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if self.cors_permissive {
            config.cors_permissive = true;
        }
    }
}

fn print_banner() {
    println!("{BANNER}");
    println!("{}", "=".repeat(44));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).context("failed to initialize tracing")?;

    print_banner();

    let mut config = Config::from_env().context("failed to load configuration")?;
    cli.apply(&mut config);

    let database = &config.database;
    let db = Db::connect(&database.url(), &database.pool_options())
        .await
        .with_context(|| {
            format!(
                "failed to connect to database {} at {}:{}",
                database.name, database.host, database.port
            )
        })?
        .with_logging(database.logging);
    db.ping().await.context("database did not answer ping")?;
    info!(
        host = %database.host,
        name = %database.name,
        max_open = database.max_open,
        "database connected"
    );

    let server = ServerConfig {
        bind_addr: config.bind_addr(),
        cors_permissive: config.cors_permissive,
    };
    let result = run_server(AppState::from_db(db.clone()), server).await;
    db.close().await;
    result.context("server failed")?;

    Ok(())
}
