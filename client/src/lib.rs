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

//! # OpenVPN Management Client
//!
//! Async client for the OpenVPN management interface, the line-based TCP
//! console a daemon exposes with `--management <host> <port>`.
//!
//! ## Features
//!
//! - **Serialized Commands** - Replies are matched to commands in order, concurrent callers queue up
//! - **Event-Driven** - Listeners for byte counts, log records, state changes and the connection itself
//! - **Authentication** - Management password handshake and on-demand user credentials
//! - **Traffic History** - Byte-count samples aggregated per second, minute and hour
//! - **Async-First** - Built on Tokio
//!
//! ## Quick Start
//!
//! ```no_run
//! use ovpnmgmt_client::{ManagementConfig, ManagementConnection, StateListener};
//! use ovpnmgmt_events::StateEvent;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct PrintState;
//!
//! #[async_trait]
//! impl StateListener for PrintState {
//!     async fn on_state_changed(&self, event: &StateEvent) {
//!         println!("{} ({})", event.name, event.status());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ManagementConfig::new("127.0.0.1", 7505)
//!         .with_password("secret");
//!
//!     let conn = ManagementConnection::new(config);
//!     conn.add_state_listener(Arc::new(PrintState));
//!     conn.connect().await?;
//!
//!     let versions = conn.versions().await?;
//!     println!("{}", versions.openvpn);
//!
//!     conn.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Sending Commands
//!
//! ```no_run
//! # use ovpnmgmt_client::{ManagementConnection, ClientError};
//! use ovpnmgmt_codec::{Command, Signal};
//! # async fn example(conn: &ManagementConnection) -> Result<(), ClientError> {
//! // Parsed status
//! let status = conn.status_snapshot().await?;
//! println!("{} clients", status.clients().len());
//!
//! // Any command; ERROR: replies become ClientError::CommandFailed
//! let reply = conn.execute(Command::Pid).await?;
//! println!("{:?}", reply.message());
//!
//! // Restart the tunnel
//! conn.signal(Signal::Usr1).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod dispatch;
mod error;
mod handler;
mod queries;
mod registry;
mod reply;
mod types;

pub use config::ManagementConfig;
pub use connection::ManagementConnection;
pub use error::{ClientError, Result};
pub use handler::{
    AuthenticationHandler, ByteCountListener, ConnectionStateListener, LogListener,
    StateListener, StaticCredentials,
};
pub use queries::Versions;
pub use reply::{Reply, Terminator};
pub use types::{ConnectionState, ListenerId};

pub(crate) use registry::ListenerRegistry;
