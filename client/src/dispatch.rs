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

//! Routing of received lines to the reply queue and to listeners

use crate::connection::ConnectionInner;
use crate::{ClientError, ManagementConnection, Result, Terminator};
use metrics::counter;
use ovpnmgmt_codec::{Command, ManagementLine, Notification, NotificationKind};
use ovpnmgmt_events::{
    ByteCountSample, ConnectionStatus, CredentialKind, EventError, LastDiff, LogRecord,
    PasswordRequest, StateEvent,
};
use std::sync::Weak;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

const WAITING_FOR_HOLD_RELEASE: &str = "Waiting for hold release";

/// States the daemon reports while renegotiating an established tunnel.
const IGNORED_WHILE_CONNECTED: [&str; 2] = ["WAIT", "AUTH"];

/// A listener callback queued for the listener task
#[derive(Debug)]
pub(crate) enum Notice {
    Connected,
    Disconnected,
    ByteCount(LastDiff),
    Log(LogRecord),
    State(StateEvent),
}

/// Calls listeners for one session, one notice at a time, until the session
/// drops its sender.
pub(crate) async fn deliver_loop(
    inner: Weak<ConnectionInner>,
    session: u64,
    mut notices: mpsc::UnboundedReceiver<Notice>,
) {
    trace!(session, "Listener task started");
    while let Some(notice) = notices.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        ManagementConnection { inner }.deliver(notice).await;
    }
    trace!(session, "Listener task stopped");
}

fn rejected(kind: &NotificationKind, payload: &str, err: EventError) {
    counter!("ovpnmgmt.notifications.rejected", "kind" => kind.keyword().to_string()).increment(1);
    warn!(kind = kind.keyword(), payload, error = %err, "Skipping malformed notification");
}

impl ManagementConnection {
    /// Handles one line from the reader task. An error ends the session.
    pub(crate) async fn process_line(&self, line: ManagementLine) -> Result<()> {
        trace!(line = %line, "Received");
        match line {
            ManagementLine::Notification(notification) => self.dispatch(notification).await,
            ManagementLine::Success(message) => {
                self.inner.replies.lock().terminate(Terminator::Success(message));
                Ok(())
            }
            ManagementLine::Error(message) => {
                self.inner.replies.lock().terminate(Terminator::Error(message));
                Ok(())
            }
            ManagementLine::End => {
                self.inner.replies.lock().terminate(Terminator::End);
                Ok(())
            }
            ManagementLine::Text(text) => {
                self.inner.replies.lock().line(text);
                Ok(())
            }
        }
    }

    async fn dispatch(&self, notification: Notification) -> Result<()> {
        let Notification { kind, payload } = notification;
        match &kind {
            NotificationKind::ByteCount => match ByteCountSample::parse_now(&payload) {
                Ok(sample) => self.on_byte_count(sample),
                Err(err) => rejected(&kind, &payload, err),
            },
            NotificationKind::Log => match LogRecord::parse(&payload) {
                Ok(record) => self.notify(Notice::Log(record)),
                Err(err) => rejected(&kind, &payload, err),
            },
            NotificationKind::State => match StateEvent::parse(&payload) {
                Ok(event) => self.apply_state(event),
                Err(err) => rejected(&kind, &payload, err),
            },
            NotificationKind::Password => match PasswordRequest::parse(&payload) {
                Ok(request) => return self.on_password(request).await,
                Err(err) => rejected(&kind, &payload, err),
            },
            NotificationKind::Hold => return self.on_hold(&payload),
            NotificationKind::Fatal => error!(message = %payload, "OpenVPN reported a fatal error"),
            NotificationKind::Info | NotificationKind::InfoMsg => {
                debug!(message = %payload, "OpenVPN info")
            }
            NotificationKind::Other(keyword) => {
                warn!(keyword = %keyword, payload = %payload, "Skipping unrecognized notification")
            }
            unsupported => warn!(
                kind = unsupported.keyword(),
                payload = %payload,
                "Skipping unsupported notification"
            ),
        }
        Ok(())
    }

    /// Queues `notice` for the listener task. Dropped when no session is open.
    pub(crate) fn notify(&self, notice: Notice) {
        if let Some(notices) = self.inner.notices.lock().as_ref()
            && notices.send(notice).is_err()
        {
            trace!("Listener task already stopped");
        }
    }

    async fn deliver(&self, notice: Notice) {
        match notice {
            Notice::Connected => {
                for listener in self.inner.connection_listeners.snapshot() {
                    listener.on_connect(self).await;
                }
            }
            Notice::Disconnected => {
                for listener in self.inner.connection_listeners.snapshot() {
                    listener.on_disconnect(self).await;
                }
            }
            Notice::ByteCount(diff) => {
                for listener in self.inner.byte_count_listeners.snapshot() {
                    listener.on_byte_count_changed(&diff).await;
                }
            }
            Notice::Log(record) => {
                for listener in self.inner.log_listeners.snapshot() {
                    listener.on_record(&record).await;
                }
            }
            Notice::State(event) => {
                for listener in self.inner.state_listeners.snapshot() {
                    listener.on_state_changed(&event).await;
                }
            }
        }
    }

    fn on_byte_count(&self, sample: ByteCountSample) {
        let diff = self.inner.traffic.write().add(sample);
        self.notify(Notice::ByteCount(diff));
    }

    /// Records a daemon state and queues it for the state listeners.
    pub(crate) fn apply_state(&self, event: StateEvent) {
        let previous = self.status();
        if previous == ConnectionStatus::Connected
            && IGNORED_WHILE_CONNECTED.contains(&event.name.as_str())
        {
            debug!(state = %event.name, "Ignoring state while connected");
            return;
        }

        let status = event.status();
        if status != previous {
            info!(state = %event.name, %previous, current = %status, "VPN status changed");
        }
        self.set_status(status);
        *self.inner.last_state.write() = Some(event.clone());
        self.notify(Notice::State(event));
    }

    async fn on_password(&self, request: PasswordRequest) -> Result<()> {
        match request {
            PasswordRequest::AuthToken(_) => {
                debug!("Received auth token");
                Ok(())
            }
            PasswordRequest::VerificationFailed { realm } => {
                self.set_status(ConnectionStatus::AuthFailed);
                Err(ClientError::Authentication(format!(
                    "Verification failed for '{}'",
                    realm
                )))
            }
            PasswordRequest::Need { realm, kind } => self.supply_credentials(realm, kind).await,
        }
    }

    async fn supply_credentials(&self, realm: String, kind: CredentialKind) -> Result<()> {
        let handler = self.inner.auth_handler.read().clone().ok_or_else(|| {
            ClientError::Authentication(format!("No credentials available for '{}'", realm))
        })?;
        let missing = |what: &str| {
            ClientError::Authentication(format!("No {} available for '{}'", what, realm))
        };

        let user = match kind {
            CredentialKind::UsernamePassword => Some(
                handler
                    .user(&realm)
                    .await
                    .filter(|user| !user.is_empty())
                    .ok_or_else(|| missing("user name"))?,
            ),
            CredentialKind::PasswordOnly => None,
        };
        let password = handler
            .password(&realm)
            .await
            .filter(|password| !password.is_empty())
            .ok_or_else(|| missing("password"))?;

        if let Some(user) = user {
            self.send_command_no_wait(Command::Username {
                realm: realm.clone(),
                value: user,
            })
            .await?;
        }
        self.send_command_no_wait(Command::Password {
            realm: realm.clone(),
            value: password,
        })
        .await?;
        info!(realm = %realm, "Credentials supplied");
        Ok(())
    }

    fn on_hold(&self, payload: &str) -> Result<()> {
        if self.status() == ConnectionStatus::AuthFailed
            && payload.starts_with(WAITING_FOR_HOLD_RELEASE)
        {
            return Err(ClientError::Authentication(
                "Daemon is holding after an authentication failure".to_string(),
            ));
        }
        debug!(message = %payload, "Hold");
        Ok(())
    }
}
