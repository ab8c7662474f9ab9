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

use crate::{CodecError, escape};
use std::fmt;
use std::str::FromStr;

/// Realm the server uses when it asks for the regular user credentials.
pub const AUTH_REALM: &str = "Auth";
/// Realm the server uses when it asks for a private key passphrase.
pub const PRIVATE_KEY_REALM: &str = "Private Key";

/// Argument for the `state` and `log` real-time switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Enable real-time notifications.
    On,
    /// Disable real-time notifications.
    Off,
    /// Dump the history buffer.
    All,
    /// Enable notifications and dump the history buffer.
    OnAll,
}

impl Toggle {
    fn as_str(self) -> &'static str {
        match self {
            Toggle::On => "on",
            Toggle::Off => "off",
            Toggle::All => "all",
            Toggle::OnAll => "on all",
        }
    }
}

/// Argument for the `hold` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldAction {
    /// Hold on the next restart.
    On,
    /// Do not hold on the next restart.
    Off,
    /// Leave the current hold state.
    Release,
}

/// Signals accepted by the `signal` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Hard restart.
    Hup,
    /// Exit.
    Term,
    /// Soft restart.
    Usr1,
    /// Dump connection statistics to the log.
    Usr2,
}

impl Signal {
    /// Name as written on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Hup => "SIGHUP",
            Signal::Term => "SIGTERM",
            Signal::Usr1 => "SIGUSR1",
            Signal::Usr2 => "SIGUSR2",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = CodecError;

    /// Accepts `SIGTERM` as well as `TERM`, case insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        match name {
            "HUP" => Ok(Signal::Hup),
            "TERM" => Ok(Signal::Term),
            "USR1" => Ok(Signal::Usr1),
            "USR2" => Ok(Signal::Usr2),
            _ => Err(CodecError::UnknownSignal(s.to_string())),
        }
    }
}

/// Argument for the `auth-retry` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRetry {
    /// Exit on authentication failure.
    None,
    /// Ask again for credentials.
    Interact,
    /// Retry with the same credentials.
    NoInteract,
}

impl AuthRetry {
    fn as_str(self) -> &'static str {
        match self {
            AuthRetry::None => "none",
            AuthRetry::Interact => "interact",
            AuthRetry::NoInteract => "nointeract",
        }
    }
}

impl FromStr for AuthRetry {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(AuthRetry::None),
            "interact" => Ok(AuthRetry::Interact),
            "nointeract" => Ok(AuthRetry::NoInteract),
            _ => Err(CodecError::UnknownAuthRetry(s.to_string())),
        }
    }
}

/// A command line written to the management interface.
///
/// Use [`Command::to_line`] for the exact wire form. The `Debug`
/// implementation never prints credentials so commands may be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// `status`
    Status,
    /// `version`
    Version,
    /// `help`
    Help,
    /// `pid`
    Pid,
    /// `bytecount N`, `0` disables byte-count notifications.
    ByteCount(u32),
    /// `state`, or `state on|off|all|on all`
    State(Option<Toggle>),
    /// `log`, or `log on|off|all|on all`
    Log(Option<Toggle>),
    /// `hold`, or `hold on|off|release`
    Hold(Option<HoldAction>),
    /// `signal SIGxxx`
    Signal(Signal),
    /// `auth-retry none|interact|nointeract`
    AuthRetry(AuthRetry),
    /// `username 'realm' "value"`
    Username {
        /// Realm named by the server's `>PASSWORD:Need` request.
        realm: String,
        /// The user name, escaped on the wire.
        value: String,
    },
    /// `password 'realm' "value"`
    Password {
        /// Realm named by the server's `>PASSWORD:Need` request.
        realm: String,
        /// The password, escaped on the wire.
        value: String,
    },
    /// The management interface password, sent alone on the first line.
    ManagementPassword(String),
    /// Any other command, sent verbatim.
    Raw(String),
}

impl Command {
    /// Short name of the command, safe to use in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::Version => "version",
            Command::Help => "help",
            Command::Pid => "pid",
            Command::ByteCount(_) => "bytecount",
            Command::State(_) => "state",
            Command::Log(_) => "log",
            Command::Hold(_) => "hold",
            Command::Signal(_) => "signal",
            Command::AuthRetry(_) => "auth-retry",
            Command::Username { .. } => "username",
            Command::Password { .. } => "password",
            Command::ManagementPassword(_) => "management-password",
            Command::Raw(_) => "raw",
        }
    }

    /// Returns `true` if the command carries a secret.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            Command::Username { .. } | Command::Password { .. } | Command::ManagementPassword(_)
        )
    }

    /// Renders the command exactly as it is written to the socket, without
    /// the trailing newline.
    pub fn to_line(&self) -> String {
        match self {
            Command::Status => "status".to_string(),
            Command::Version => "version".to_string(),
            Command::Help => "help".to_string(),
            Command::Pid => "pid".to_string(),
            Command::ByteCount(interval) => format!("bytecount {}", interval),
            Command::State(toggle) => with_toggle("state", *toggle),
            Command::Log(toggle) => with_toggle("log", *toggle),
            Command::Hold(None) => "hold".to_string(),
            Command::Hold(Some(HoldAction::On)) => "hold on".to_string(),
            Command::Hold(Some(HoldAction::Off)) => "hold off".to_string(),
            Command::Hold(Some(HoldAction::Release)) => "hold release".to_string(),
            Command::Signal(signal) => format!("signal {}", signal),
            Command::AuthRetry(mode) => format!("auth-retry {}", mode.as_str()),
            Command::Username { realm, value } => {
                format!("username '{}' \"{}\"", realm, escape(value))
            }
            Command::Password { realm, value } => {
                format!("password '{}' \"{}\"", realm, escape(value))
            }
            Command::ManagementPassword(password) => password.clone(),
            Command::Raw(line) => line.clone(),
        }
    }
}

fn with_toggle(name: &str, toggle: Option<Toggle>) -> String {
    match toggle {
        Some(toggle) => format!("{} {}", name, toggle.as_str()),
        None => name.to_string(),
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Username { realm, .. } | Command::Password { realm, .. } => f
                .debug_struct(self.name())
                .field("realm", realm)
                .field("value", &"<redacted>")
                .finish(),
            Command::ManagementPassword(_) => f.write_str("ManagementPassword(<redacted>)"),
            _ => write!(f, "Command({:?})", self.to_line()),
        }
    }
}

impl From<&str> for Command {
    fn from(line: &str) -> Self {
        Command::Raw(line.to_string())
    }
}

impl From<String> for Command {
    fn from(line: String) -> Self {
        Command::Raw(line)
    }
}
