// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Messaging Broker Administration CLI
//!
//! Boots the messaging subsystem against in-memory brokers and executes
//! management operations given as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Boot and read one JSON operation per line from stdin
//! broker-admin --config broker-admin.toml
//!
//! # Execute a JSON array of operations
//! broker-admin --config broker-admin.toml --script ops.json
//!
//! # Generate or check a configuration file
//! broker-admin gen-config --output broker-admin.toml
//! broker-admin validate --config broker-admin.toml
//! ```

use broker_admin::broker::EmbeddedBrokerFactory;
use broker_admin::config::load_script;
use broker_admin::{AdminConfig, BootEntry, Operation, PathAddress, Subsystem};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Messaging Broker Administration
#[derive(Parser, Debug)]
#[command(name = "broker-admin")]
#[command(about = "Messaging subsystem management - keeps brokers in sync with their configuration")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file holding an array of operations to execute
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "broker-admin.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => AdminConfig::from_file(path)?,
        None => AdminConfig::default(),
    };

    // Initialize logging
    let level = args.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Handle subcommands
    if let Some(cmd) = args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let factory = Arc::new(EmbeddedBrokerFactory::new());
    let mut subsystem = Subsystem::from_config(&config, factory)?;

    if let Some(script) = args.script {
        for op in load_script(&script)? {
            let result = subsystem.execute(op);
            println!("{}", serde_json::to_string_pretty(&result.to_json())?);
        }
        return Ok(());
    }

    run_interactive(subsystem).await
}

async fn run_interactive(subsystem: Subsystem) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, task) = subsystem.spawn();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Messaging Broker Administration v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Enter one JSON operation per line, Ctrl+C to stop...");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let reply = match serde_json::from_str::<Operation>(line) {
                    Ok(op) => handle.execute(op).await?.to_json(),
                    Err(e) => failure(&format!("Malformed operation: {}", e)),
                };
                println!("{}", reply);
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                break;
            }
        }
    }

    handle.shutdown().await;
    let subsystem = task.await?;
    if subsystem.is_reload_required() {
        tracing::warn!("Exiting with changes that still require a reload");
    }
    Ok(())
}

fn failure(description: &str) -> Value {
    json!({
        "outcome": "failed",
        "failure-description": description,
    })
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let server = PathAddress::server("default");
    let mut config = AdminConfig::default();
    config.properties.insert("dlq.name".into(), "DLQ".into());
    config.add_boot(BootEntry::new(server.to_string()).param("statistics-enabled", true));
    config.add_boot(
        BootEntry::new(server.append("queue", "DLQ").to_string())
            .param("queue-address", "${dlq.name}"),
    );
    config.add_boot(
        BootEntry::new(server.append("queue", "ExpiryQueue").to_string())
            .param("queue-address", "ExpiryQueue"),
    );
    config.add_boot(
        BootEntry::new(server.append("address-setting", "#").to_string())
            .param("dead-letter-address", "DLQ")
            .param("expiry-address", "ExpiryQueue"),
    );
    config.add_boot(
        BootEntry::new(server.append("in-vm-acceptor", "in-vm").to_string())
            .param("server-id", 0),
    );

    let toml_str = toml::to_string_pretty(&config)?;

    // Add comments
    let content = format!(
        r#"# Messaging Broker Administration Configuration
# Generated by broker-admin gen-config

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match AdminConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Subsystem: {}", config.name);
            println!("Boot resources: {}", config.boot.len());
            for (i, entry) in config.boot.iter().enumerate() {
                println!("  [{}] {}", i, entry.address);
            }
            if !config.backup_servers.is_empty() {
                println!("Backup servers: {}", config.backup_servers.join(", "));
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}
