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

//! Convenience queries built on top of [`ManagementConnection::execute`]

use crate::{ClientError, ManagementConnection, Result};
use ovpnmgmt_codec::{Command, Signal};
use ovpnmgmt_events::StateEvent;
use ovpnmgmt_status::{StatusSnapshot, parse_status};
use tracing::{debug, info};

const OPENVPN_VERSION_PREFIX: &str = "OpenVPN Version:";
const MANAGEMENT_VERSION_PREFIX: &str = "Management Version:";

/// Result of the `version` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    /// Daemon version line, e.g. `OpenVPN 2.6.8 x86_64-pc-linux-gnu ...`
    pub openvpn: String,
    /// Management interface version, e.g. `5`
    pub management: String,
}

impl Versions {
    /// Extracts both versions from the body of a `version` reply.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Option<Versions> {
        let find = |prefix: &str| {
            lines
                .iter()
                .find_map(|line| line.as_ref().strip_prefix(prefix))
                .map(|value| value.trim().to_string())
        };
        Some(Versions {
            openvpn: find(OPENVPN_VERSION_PREFIX)?,
            management: find(MANAGEMENT_VERSION_PREFIX)?,
        })
    }
}

impl ManagementConnection {
    /// Daemon and management interface versions
    pub async fn versions(&self) -> Result<Versions> {
        let reply = self.execute(Command::Version).await?;
        Versions::from_lines(&reply.lines)
            .ok_or_else(|| ClientError::UnexpectedReply(reply.lines.join("\n")))
    }

    /// Runs `status` and parses the client list and routing table.
    pub async fn status_snapshot(&self) -> Result<StatusSnapshot> {
        let reply = self.execute(Command::Status).await?;
        debug!(lines = reply.lines.len(), "Parsing status");
        // Host names in the reply may need a blocking DNS lookup
        let snapshot = tokio::task::spawn_blocking(move || parse_status(&reply.lines))
            .await
            .map_err(|err| ClientError::Io(err.to_string()))??;
        Ok(snapshot)
    }

    /// Asks the daemon for its current state. `None` if it reported nothing.
    pub async fn current_state(&self) -> Result<Option<StateEvent>> {
        let reply = self.execute(Command::State(None)).await?;
        match reply.lines.last() {
            Some(line) => StateEvent::parse(line)
                .map(Some)
                .map_err(|err| ClientError::UnexpectedReply(format!("{}: {}", err, line))),
            None => Ok(None),
        }
    }

    /// Sends `signal` to the daemon and waits for it to be acknowledged.
    pub async fn signal(&self, signal: Signal) -> Result<()> {
        info!(%signal, "Signalling daemon");
        self.execute(Command::Signal(signal)).await?;
        Ok(())
    }

    /// Asks the daemon to exit with `SIGTERM`. Does nothing when not connected.
    ///
    /// The daemon usually closes the management socket right after, so the
    /// reply is not awaited.
    pub async fn stop_vpn(&self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }
        info!("Stopping VPN");
        self.send_command_no_wait(Command::Signal(Signal::Term))
            .await
    }
}
