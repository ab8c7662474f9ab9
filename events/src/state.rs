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

//! `>STATE:` events and connection status classification

use crate::log::parse_optional_u64;
use crate::{EventError, Result};
use std::fmt;
use std::net::IpAddr;

/// Message accompanying `RECONNECTING` when the server rejected the credentials.
pub const AUTH_FAILURE_MESSAGE: &str = "auth-failure";

const CONNECTED_STATES: &[&str] = &["CONNECTED"];
const NOT_CONNECTED_STATES: &[&str] = &["DISCONNECTED", "EXITING"];
const CONNECTING_NO_REPLY_STATES: &[&str] =
    &["CONNECTING", "WAIT", "RECONNECTING", "RESOLVE", "TCP_CONNECT"];
const CONNECTING_REPLIED_STATES: &[&str] =
    &["AUTH", "GET_CONFIG", "ASSIGN_IP", "ADD_ROUTES", "AUTH_PENDING"];
const AUTH_FAILED_STATES: &[&str] = &["AUTH_FAILED"];

/// Coarse status of the VPN tunnel, derived from the daemon's state names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Connected,
    NotConnected,
    /// Working on a connection, nothing heard from the server yet.
    ConnectingNoServerReply,
    /// Working on a connection, the server has answered.
    ConnectingServerReplied,
    AuthFailed,
    Unknown,
}

impl ConnectionStatus {
    /// Returns `true` unless the tunnel is down or was rejected.
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            ConnectionStatus::NotConnected | ConnectionStatus::AuthFailed
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::NotConnected => "not connected",
            ConnectionStatus::ConnectingNoServerReply => "connecting",
            ConnectionStatus::ConnectingServerReplied => "connecting (server replied)",
            ConnectionStatus::AuthFailed => "authentication failed",
            ConnectionStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classifies a daemon state name.
///
/// `RECONNECTING` with the message `auth-failure` is an authentication
/// failure; this is checked before the generic name tables.
///
/// ```
/// use ovpnmgmt_events::{ConnectionStatus, classify};
///
/// assert_eq!(classify("RECONNECTING", Some("auth-failure")), ConnectionStatus::AuthFailed);
/// assert_eq!(classify("RECONNECTING", Some("ping-restart")), ConnectionStatus::ConnectingNoServerReply);
/// assert_eq!(classify("bogus", None), ConnectionStatus::Unknown);
/// ```
pub fn classify(name: &str, message: Option<&str>) -> ConnectionStatus {
    if name == "RECONNECTING" && message == Some(AUTH_FAILURE_MESSAGE) {
        return ConnectionStatus::AuthFailed;
    }
    if CONNECTED_STATES.contains(&name) {
        ConnectionStatus::Connected
    } else if NOT_CONNECTED_STATES.contains(&name) {
        ConnectionStatus::NotConnected
    } else if CONNECTING_NO_REPLY_STATES.contains(&name) {
        ConnectionStatus::ConnectingNoServerReply
    } else if CONNECTING_REPLIED_STATES.contains(&name) {
        ConnectionStatus::ConnectingServerReplied
    } else if AUTH_FAILED_STATES.contains(&name) {
        ConnectionStatus::AuthFailed
    } else {
        ConnectionStatus::Unknown
    }
}

/// A change of the daemon's connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEvent {
    /// Unix time in seconds, if the server supplied one.
    pub timestamp: Option<u64>,
    /// State name such as `CONNECTED` or `RECONNECTING`.
    pub name: String,
    /// Optional description, e.g. `SUCCESS` or `auth-failure`.
    pub message: Option<String>,
    /// Local tunnel address.
    pub local_address: Option<IpAddr>,
    /// Address of the VPN server.
    pub remote_address: Option<IpAddr>,
    /// Port of the VPN server.
    pub remote_port: Option<u16>,
}

impl StateEvent {
    /// Parses a `time,name,message,local,remote,port[,...]` payload, as
    /// delivered by `>STATE:` or as a line of the `state` command reply.
    ///
    /// Empty fields become `None`; fields beyond the remote port are ignored.
    pub fn parse(payload: &str) -> Result<StateEvent> {
        let fields: Vec<&str> = payload.split(',').collect();
        let name = fields
            .get(1)
            .copied()
            .filter(|name| !name.is_empty())
            .ok_or(EventError::MissingField {
                record: "STATE",
                field: "name",
            })?;

        Ok(StateEvent {
            timestamp: parse_optional_u64(fields[0], "state time")?,
            name: name.to_string(),
            message: optional(fields.get(2)).map(str::to_string),
            local_address: parse_address(fields.get(3), "local")?,
            remote_address: parse_address(fields.get(4), "remote")?,
            remote_port: parse_port(fields.get(5))?,
        })
    }

    /// Classifies this event, see [`classify`].
    pub fn status(&self) -> ConnectionStatus {
        classify(&self.name, self.message.as_deref())
    }

    /// Returns `true` when the server reported `auth-failure`.
    pub fn is_auth_failure(&self) -> bool {
        self.message.as_deref() == Some(AUTH_FAILURE_MESSAGE)
    }
}

fn optional<'a>(field: Option<&&'a str>) -> Option<&'a str> {
    field.copied().filter(|value| !value.is_empty())
}

fn parse_address(field: Option<&&str>, which: &'static str) -> Result<Option<IpAddr>> {
    optional(field)
        .map(|value| {
            value.parse().map_err(|_| EventError::InvalidAddress {
                field: which,
                value: value.to_string(),
            })
        })
        .transpose()
}

fn parse_port(field: Option<&&str>) -> Result<Option<u16>> {
    optional(field)
        .map(|value| {
            value.parse().map_err(|_| EventError::InvalidNumber {
                field: "remote port",
                value: value.to_string(),
            })
        })
        .transpose()
}
