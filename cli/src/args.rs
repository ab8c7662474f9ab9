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

//! Command line arguments

use clap::{Parser, Subcommand};
use ovpnmgmt_client::ManagementConfig;
use ovpnmgmt_codec::Signal;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Management interface host
    #[arg(long, env = "OVPNMGMT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Management interface port
    #[arg(short, long, env = "OVPNMGMT_PORT", default_value_t = 7505)]
    pub port: u16,

    /// Management interface password
    #[arg(long, env = "OVPNMGMT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Seconds to wait for the TCP connection
    #[arg(long, env = "OVPNMGMT_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Seconds to wait for a command reply
    #[arg(long, env = "OVPNMGMT_COMMAND_TIMEOUT", default_value_t = 10)]
    pub command_timeout: u64,

    /// Byte-count notification interval in seconds, 0 disables
    #[arg(long, env = "OVPNMGMT_BYTECOUNT", default_value_t = 2)]
    pub bytecount: u32,

    /// Do not release a daemon waiting in hold after connecting
    #[arg(long)]
    pub no_hold_release: bool,

    /// User name supplied when the daemon asks for credentials
    #[arg(long, env = "OVPNMGMT_AUTH_USER")]
    pub user: Option<String>,

    /// Password supplied when the daemon asks for credentials
    #[arg(long, env = "OVPNMGMT_AUTH_PASSWORD", hide_env_values = true)]
    pub auth_password: Option<String>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show connected clients and routes
    Status,
    /// Show daemon and management interface versions
    Version,
    /// Show the daemon's current state
    State,
    /// Send a signal to the daemon (SIGHUP, SIGTERM, SIGUSR1, SIGUSR2)
    Signal {
        signal: Signal,
    },
    /// Send a raw command and print the reply
    Send {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Stream byte counts, log records and state changes until interrupted
    Watch {
        /// Replay the daemon's log history first
        #[arg(long)]
        history: bool,
    },
}

impl Args {
    pub fn config(&self) -> ManagementConfig {
        let mut config = ManagementConfig::new(self.host.clone(), self.port)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
            .with_command_timeout(Duration::from_secs(self.command_timeout))
            .with_byte_count_interval(self.bytecount)
            .with_hold_release(!self.no_hold_release)
            .with_log_history(matches!(self.command, Commands::Watch { history: true }));
        if let Some(password) = &self.password {
            config = config.with_password(password.clone());
        }
        config
    }
}
