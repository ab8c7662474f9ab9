//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! `ovpnmgmt` command line client

mod args;
mod watch;

use anyhow::{Context, Result, bail};
use args::{Args, Commands};
use clap::Parser;
use ovpnmgmt_client::{ManagementConnection, StaticCredentials, Terminator};
use ovpnmgmt_codec::Command;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.config();
    debug!(?config, "Starting");
    let conn = ManagementConnection::new(config);
    if let (Some(user), Some(password)) = (&args.user, &args.auth_password) {
        conn.set_authentication_handler(Some(Arc::new(StaticCredentials::new(
            user.clone(),
            password.clone(),
        ))));
    }

    let watching = matches!(args.command, Commands::Watch { .. });
    let stopped = if watching {
        Some(watch::attach(&conn))
    } else {
        None
    };

    conn.connect()
        .await
        .with_context(|| format!("Cannot connect to {}", conn.config().address()))?;

    let outcome = run(&conn, args.command, stopped).await;
    conn.disconnect().await?;
    outcome
}

async fn run(
    conn: &ManagementConnection,
    command: Commands,
    stopped: Option<tokio::sync::mpsc::UnboundedReceiver<()>>,
) -> Result<()> {
    match command {
        Commands::Status => {
            let status = conn.status_snapshot().await?;
            if let Some(updated) = status.updated() {
                println!("Updated: {}", updated);
            }
            println!(
                "{:<24} {:<24} {:>12} {:>12}  Connected Since",
                "Common Name", "Real Address", "Received", "Sent"
            );
            for client in status.clients() {
                println!(
                    "{:<24} {:<24} {:>12} {:>12}  {}",
                    client.common_name,
                    client.real_address.to_string(),
                    client.bytes_received,
                    client.bytes_sent,
                    client.connected_since
                );
            }
            println!();
            println!(
                "{:<18} {:<24} {:<24}  Last Ref",
                "Virtual Address", "Common Name", "Real Address"
            );
            for route in status.routes() {
                println!(
                    "{:<18} {:<24} {:<24}  {}",
                    route.virtual_address,
                    route.common_name,
                    route.real_address.to_string(),
                    route.last_ref
                );
            }
        }
        Commands::Version => {
            let versions = conn.versions().await?;
            println!("{}", versions.openvpn);
            println!("Management Version: {}", versions.management);
        }
        Commands::State => match conn.current_state().await? {
            Some(event) => println!("{}", watch::describe_state(&event)),
            None => println!("No state reported"),
        },
        Commands::Signal { signal } => {
            conn.signal(signal).await?;
            println!("{} sent", signal);
        }
        Commands::Send { command } => {
            let reply = conn.send_command(Command::Raw(command.join(" "))).await?;
            for line in &reply.lines {
                println!("{}", line);
            }
            match reply.terminator {
                Terminator::Success(message) => println!("SUCCESS: {}", message),
                Terminator::Error(message) => bail!("ERROR: {}", message),
                Terminator::End => {}
            }
        }
        Commands::Watch { .. } => {
            let Some(mut stopped) = stopped else {
                return Ok(());
            };
            println!("Watching {} (Ctrl-C to stop)", conn.config().address());
            tokio::select! {
                result = tokio::signal::ctrl_c() => result?,
                _ = stopped.recv() => bail!("Management connection closed"),
            }
        }
    }
    Ok(())
}
