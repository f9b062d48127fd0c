//! Signpost command-line entry point.
//!
//! ```text
//! signpost routes --config routes.toml      print the compiled table
//! signpost serve  --config routes.toml      serve it over HTTP
//! ```
//!
//! The binary ships a single endpoint, `Echo`, which answers with the
//! request method, path and route params as JSON. Embedders register their
//! own endpoints and call [`signpost::config::compile`] directly.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use signpost::config::{compile, load_config};
use signpost::http::{shutdown_signal, HttpServer};
use signpost::observability::logging::init_logging;
use signpost::observability::metrics::init_metrics;
use signpost::{EndpointRegistry, RequestContext, Response};

#[derive(Parser)]
#[command(name = "signpost")]
#[command(about = "Declarative HTTP request router", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled routing table
    Routes {
        /// Route file (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Serve the routes over HTTP
    Serve {
        /// Route file (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Override the listener address from the route file
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Routes { config } => {
            init_logging("warn");
            let config = load_config(&config)?;
            let router = compile(&config, Arc::new(builtin_registry()))?;

            for line in router.listing() {
                println!("{line}");
            }
            let names = router.named_routes();
            if !names.is_empty() {
                let mut names: Vec<&str> = names.names().collect();
                names.sort_unstable();
                println!();
                println!("Named routes: {}", names.join(", "));
            }
        }
        Commands::Serve { config: path, bind } => {
            let config = load_config(&path)?;
            init_logging(&config.observability.log_level);

            tracing::info!(version = env!("CARGO_PKG_VERSION"), "signpost starting");
            tracing::info!(
                config = %path.display(),
                routes = config.routes.len(),
                redirects = config.redirects.len(),
                mounts = config.mounts.len(),
                "Configuration loaded"
            );

            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => init_metrics(addr),
                    Err(_) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    ),
                }
            }

            let router = compile(&config, Arc::new(builtin_registry()))?;

            let address = bind.unwrap_or_else(|| config.listener.bind_address.clone());
            let listener = TcpListener::bind(&address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");

            HttpServer::new(Arc::new(router))
                .run(listener, shutdown_signal())
                .await?;

            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}

fn builtin_registry() -> EndpointRegistry {
    EndpointRegistry::new().with("Echo", echo)
}

fn echo(ctx: &mut RequestContext) -> signpost::Outcome {
    let body = serde_json::json!({
        "method": ctx.method().as_str(),
        "path": ctx.path(),
        "params": ctx.route_params(),
    });

    match serde_json::to_vec(&body) {
        Ok(bytes) => Response::ok(bytes)
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .into(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode echo response");
            Response::new(StatusCode::INTERNAL_SERVER_ERROR).into()
        }
    }
}
