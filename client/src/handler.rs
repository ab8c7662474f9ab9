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

//! Listener and authentication handler traits

use crate::ManagementConnection;
use async_trait::async_trait;
use ovpnmgmt_events::{LastDiff, LogRecord, StateEvent};

/// Connection lifecycle listener
///
/// All listeners of a connection are called from one listener task per
/// session, in the order the events happened, and never from the task that
/// reads the socket. A listener may therefore send commands through the
/// connection that called it; events arriving meanwhile wait their turn.
///
/// # Example
///
/// ```no_run
/// use ovpnmgmt_client::{ConnectionStateListener, ManagementConnection};
/// use async_trait::async_trait;
///
/// struct Announce;
///
/// #[async_trait]
/// impl ConnectionStateListener for Announce {
///     async fn on_connect(&self, conn: &ManagementConnection) {
///         println!("Connected to {}", conn.config().address());
///     }
/// }
/// ```
#[async_trait]
pub trait ConnectionStateListener: Send + Sync + 'static {
    /// Called once the management handshake has completed, after any state
    /// and log events the handshake produced
    async fn on_connect(&self, _conn: &ManagementConnection) {}

    /// Called once when a connection that reported `on_connect` goes away,
    /// whether closed locally, by the server or by an error.
    async fn on_disconnect(&self, _conn: &ManagementConnection) {}
}

/// Receives every `>BYTECOUNT:` sample together with the change since the previous one
#[async_trait]
pub trait ByteCountListener: Send + Sync + 'static {
    async fn on_byte_count_changed(&self, diff: &LastDiff);
}

/// Receives daemon log records
#[async_trait]
pub trait LogListener: Send + Sync + 'static {
    async fn on_record(&self, record: &LogRecord);
}

/// Receives daemon state changes
#[async_trait]
pub trait StateListener: Send + Sync + 'static {
    async fn on_state_changed(&self, event: &StateEvent);
}

/// Supplies credentials when the daemon asks for them
///
/// Consulted lazily, only when a `>PASSWORD:Need` request arrives. Returning
/// `None` or an empty string aborts the connection with an authentication
/// error instead of sending an empty credential.
#[async_trait]
pub trait AuthenticationHandler: Send + Sync + 'static {
    /// User name for `realm`, usually `Auth`
    async fn user(&self, realm: &str) -> Option<String>;

    /// Password or passphrase for `realm`
    async fn password(&self, realm: &str) -> Option<String>;
}

/// Fixed credentials, handy for command-line tools and tests
#[derive(Clone)]
pub struct StaticCredentials {
    user: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl AuthenticationHandler for StaticCredentials {
    async fn user(&self, _realm: &str) -> Option<String> {
        Some(self.user.clone())
    }

    async fn password(&self, _realm: &str) -> Option<String> {
        Some(self.password.clone())
    }
}
