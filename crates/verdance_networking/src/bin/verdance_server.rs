//! # VERDANCE Server
//!
//! Generates a world, starts the simulation, and serves it over WebSocket.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin verdance_server -- --config config/verdance.toml
//! RUST_LOG=verdance_networking=debug cargo run --bin verdance_server -- --seed 42
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use verdance_networking::{spawn_simulation, CliArgs, ServerConfig, SyncHub, VerdanceServer};

fn print_usage() {
    println!("Usage: verdance_server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        TOML config file");
    println!("  -b, --bind <ADDR>          Listen address (default: 0.0.0.0:8152)");
    println!("      --width <TILES>        World width (default: 240)");
    println!("      --height <TILES>       World height (default: 135)");
    println!("      --seed <N>             World seed (default: from the clock)");
    println!("  -h, --help                 Show this help");
    println!();
    println!("Log level is read from RUST_LOG (default: info).");
}

fn print_banner(config: &ServerConfig) {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         VERDANCE SERVER                                          ║");
    println!("║         ONE WORLD, EVERY VIEWER                                  ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Bind Address:       {}", config.bind_address);
    println!("│ World:              {} x {}", config.width, config.height);
    match config.seed {
        Some(seed) => println!("│ Seed:               {seed}"),
        None => println!("│ Seed:               from clock"),
    }
    println!("│ Tick Interval:      {} ms", config.tick_interval_ms);
    println!("│ Broadcast Interval: {} ms", config.broadcast_interval_ms);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return ExitCode::from(2);
        }
    };
    if args.help {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let config = match args.resolve() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    print_banner(&config);

    let hub = match SyncHub::from_config(&config) {
        Ok(hub) => Arc::new(hub),
        Err(err) => {
            tracing::error!("could not build the world: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let server = match VerdanceServer::bind(&config, Arc::clone(&hub)).await {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(address = %config.bind_address, "could not bind: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let simulation = spawn_simulation(hub, &config);

    tokio::select! {
        () = server.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::error!("signal handler failed: {}", err);
            }
            tracing::info!("shutting down");
        }
    }
    simulation.abort();
    ExitCode::SUCCESS
}
