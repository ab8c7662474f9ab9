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

//! Client configuration

use ovpnmgmt_codec::DEFAULT_MAX_LINE_LENGTH;
use std::fmt;
use std::time::Duration;

/// Management connection configuration
#[derive(Clone)]
pub struct ManagementConfig {
    /// Host the management interface listens on
    pub host: String,

    /// Management port
    pub port: u16,

    /// Management interface password, if the daemon was started with one
    pub password: Option<String>,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum silence on the socket before the connection is dropped (None for no timeout)
    pub read_timeout: Option<Duration>,

    /// Default time to wait for the reply to a command
    pub command_timeout: Duration,

    /// Interval in seconds for `>BYTECOUNT:` notifications, 0 disables them
    pub byte_count_interval: u32,

    /// Replay the daemon's log history to log listeners after connecting
    pub log_history: bool,

    /// Send `hold release` after connecting
    pub hold_release: bool,

    /// Longest line accepted from the server
    pub max_line_length: usize,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7505,
            password: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: None,
            command_timeout: Duration::from_secs(10),
            byte_count_interval: 2,
            log_history: false,
            hold_release: true,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl fmt::Debug for ManagementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("command_timeout", &self.command_timeout)
            .field("byte_count_interval", &self.byte_count_interval)
            .field("log_history", &self.log_history)
            .field("hold_release", &self.hold_release)
            .field("max_line_length", &self.max_line_length)
            .finish()
    }
}

impl ManagementConfig {
    /// Create a new configuration for the given host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the management password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the default command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the byte-count notification interval in seconds
    pub fn with_byte_count_interval(mut self, seconds: u32) -> Self {
        self.byte_count_interval = seconds;
        self
    }

    /// Replay the log history after connecting
    pub fn with_log_history(mut self, enabled: bool) -> Self {
        self.log_history = enabled;
        self
    }

    /// Release the daemon from its hold state after connecting
    pub fn with_hold_release(mut self, enabled: bool) -> Self {
        self.hold_release = enabled;
        self
    }

    /// Set the maximum accepted line length
    pub fn with_max_line_length(mut self, bytes: usize) -> Self {
        self.max_line_length = bytes;
        self
    }

    /// Get the server address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ManagementConfig::default();
        assert_eq!(config.address(), "127.0.0.1:7505");
        assert_eq!(config.byte_count_interval, 2);
        assert!(config.hold_release);
        assert!(config.read_timeout.is_none());
    }

    #[test]
    fn builder() {
        let config = ManagementConfig::new("vpn.local", 1195)
            .with_password("secret")
            .with_command_timeout(Duration::from_millis(500))
            .with_byte_count_interval(0)
            .with_log_history(true);
        assert_eq!(config.address(), "vpn.local:1195");
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.command_timeout, Duration::from_millis(500));
        assert_eq!(config.byte_count_interval, 0);
        assert!(config.log_history);
    }

    #[test]
    fn debug_hides_password() {
        let config = ManagementConfig::default().with_password("hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
