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

//! Management connection

use crate::dispatch::{Notice, deliver_loop};
use crate::reply::{Expectation, ReplyQueue};
use crate::{
    AuthenticationHandler, ByteCountListener, ClientError, ConnectionState,
    ConnectionStateListener, ListenerId, ListenerRegistry, LogListener, ManagementConfig, Reply,
    Result, StateListener, Terminator,
};
use futures::{SinkExt, StreamExt};
use metrics::{counter, histogram};
use ovpnmgmt_codec::{CodecError, Command, HoldAction, ManagementCodec, ManagementLine, Toggle};
use ovpnmgmt_events::{
    ByteCountSample, ConnectionStatus, LogRecord, StateEvent, TrafficHistory, TrafficSnapshot,
};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, timeout, timeout_at};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, instrument, trace, warn};

type LineReader = FramedRead<OwnedReadHalf, ManagementCodec>;
type LineWriter = FramedWrite<OwnedWriteHalf, ManagementCodec>;

/// Connection to an OpenVPN management interface
///
/// Cheap to clone; all clones share one socket. Construct one per daemon and
/// hand clones to whatever needs to talk to it.
///
/// Replies carry no request ID, so commands are serialized: a second
/// [`send_command`](Self::send_command) waits until the first one's reply has
/// arrived. Listeners are called in arrival order from a background task of
/// their own, separate from the one reading the socket, so a listener may
/// send commands through the connection it is registered on.
#[derive(Clone)]
pub struct ManagementConnection {
    pub(crate) inner: Arc<ConnectionInner>,
}

pub(crate) struct ConnectionInner {
    pub(crate) config: ManagementConfig,
    state: AtomicU8,
    /// Incremented when a socket opens and when it closes
    session: AtomicU64,
    /// Whether `on_connect` was reported for the current session
    announced: Mutex<bool>,
    pub(crate) status: RwLock<ConnectionStatus>,
    pub(crate) last_state: RwLock<Option<StateEvent>>,
    pub(crate) traffic: RwLock<TrafficHistory>,
    writer: tokio::sync::Mutex<Option<(u64, LineWriter)>>,
    pub(crate) replies: Mutex<ReplyQueue>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    /// Feeds the listener task of the current session
    pub(crate) notices: Mutex<Option<mpsc::UnboundedSender<Notice>>>,
    command_lock: tokio::sync::Mutex<()>,
    lifecycle: tokio::sync::Mutex<()>,
    pub(crate) connection_listeners: ListenerRegistry<dyn ConnectionStateListener>,
    pub(crate) byte_count_listeners: ListenerRegistry<dyn ByteCountListener>,
    pub(crate) log_listeners: ListenerRegistry<dyn LogListener>,
    pub(crate) state_listeners: ListenerRegistry<dyn StateListener>,
    pub(crate) auth_handler: RwLock<Option<Arc<dyn AuthenticationHandler>>>,
}

impl ManagementConnection {
    /// Create a disconnected connection for `config`
    pub fn new(config: ManagementConfig) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                config,
                state: AtomicU8::new(ConnectionState::Disconnected.as_u8()),
                session: AtomicU64::new(0),
                announced: Mutex::new(false),
                status: RwLock::new(ConnectionStatus::NotConnected),
                last_state: RwLock::new(None),
                traffic: RwLock::new(TrafficHistory::new()),
                writer: tokio::sync::Mutex::new(None),
                replies: Mutex::new(ReplyQueue::default()),
                shutdown: Mutex::new(None),
                notices: Mutex::new(None),
                command_lock: tokio::sync::Mutex::new(()),
                lifecycle: tokio::sync::Mutex::new(()),
                connection_listeners: ListenerRegistry::new(),
                byte_count_listeners: ListenerRegistry::new(),
                log_listeners: ListenerRegistry::new(),
                state_listeners: ListenerRegistry::new(),
                auth_handler: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ManagementConfig {
        &self.inner.config
    }

    /// State of the management socket
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Last classified status of the VPN tunnel itself
    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status.read()
    }

    /// `true` while the tunnel is up or being brought up
    pub fn is_vpn_active(&self) -> bool {
        self.status().is_active()
    }

    /// Most recent state reported by the daemon
    pub fn last_state(&self) -> Option<StateEvent> {
        self.inner.last_state.read().clone()
    }

    /// Copy of the aggregated byte-count history
    pub fn traffic_snapshot(&self) -> TrafficSnapshot {
        self.inner.traffic.read().snapshot()
    }

    pub fn last_byte_count(&self) -> Option<ByteCountSample> {
        self.inner.traffic.read().last()
    }

    fn set_state(&self, state: ConnectionState) {
        let previous =
            ConnectionState::from_u8(self.inner.state.swap(state.as_u8(), Ordering::SeqCst));
        if previous != state {
            debug!(%previous, current = %state, "Connection state changed");
        }
    }

    pub(crate) fn set_status(&self, status: ConnectionStatus) {
        *self.inner.status.write() = status;
    }

    /// Open the socket and run the management handshake.
    ///
    /// On success the connection is [`Connected`](ConnectionState::Connected),
    /// the current daemon state has been fetched and real-time byte-count,
    /// state and log notifications are enabled. A rejected password or
    /// credential leaves the connection in
    /// [`AuthFailed`](ConnectionState::AuthFailed); any other failure leaves it
    /// [`Disconnected`](ConnectionState::Disconnected).
    ///
    /// Connection listeners hear about the new session through the listener
    /// task, after any state or log events the handshake produced.
    #[instrument(skip(self), fields(address = %self.inner.config.address()))]
    pub async fn connect(&self) -> Result<()> {
        let _lifecycle = self.inner.lifecycle.lock().await;
        if self.state().is_open() {
            return Err(ClientError::AlreadyConnected);
        }

        self.set_state(ConnectionState::Connecting);
        self.set_status(ConnectionStatus::NotConnected);
        *self.inner.last_state.write() = None;
        *self.inner.traffic.write() = TrafficHistory::new();

        let config = &self.inner.config;
        info!("Connecting to management interface");
        let connecting = TcpStream::connect(config.address());
        let stream = match timeout(config.connect_timeout, connecting).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                self.set_state(ConnectionState::Disconnected);
                warn!(error = %err, "Failed to connect");
                return Err(ClientError::from_connect_error(err));
            }
            Err(_) => {
                self.set_state(ConnectionState::Disconnected);
                warn!(timeout = ?config.connect_timeout, "Timed out connecting");
                return Err(ClientError::ConnectionTimeout);
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            debug!(error = %err, "Failed to set TCP_NODELAY");
        }

        let codec = ManagementCodec::with_max_line_length(config.max_line_length);
        let (read_half, write_half) = stream.into_split();
        let reader = FramedRead::new(read_half, codec.clone());
        let writer = FramedWrite::new(write_half, codec);

        let session = self.inner.session.fetch_add(1, Ordering::SeqCst) + 1;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        self.inner.replies.lock().reopen();
        *self.inner.shutdown.lock() = Some(shutdown_tx);
        *self.inner.notices.lock() = Some(notice_tx);
        *self.inner.writer.lock().await = Some((session, writer));
        tokio::spawn(deliver_loop(
            Arc::downgrade(&self.inner),
            session,
            notice_rx,
        ));
        tokio::spawn(read_loop(
            Arc::downgrade(&self.inner),
            session,
            reader,
            shutdown_rx,
        ));

        if let Err(err) = self.handshake().await {
            warn!(error = %err, "Management handshake failed");
            self.close_session(session, Some(err.clone())).await;
            return Err(err);
        }

        {
            let mut announced = self.inner.announced.lock();
            if self.inner.session.load(Ordering::SeqCst) != session {
                return Err(ClientError::ConnectionClosed);
            }
            self.set_state(ConnectionState::Connected);
            *announced = true;
            self.notify(Notice::Connected);
        }
        info!(status = %self.status(), "Connected to management interface");
        Ok(())
    }

    async fn handshake(&self) -> Result<()> {
        let config = &self.inner.config;
        if let Some(password) = &config.password {
            let reply = self
                .send_command(Command::ManagementPassword(password.clone()))
                .await?;
            if let Terminator::Error(message) = reply.terminator {
                self.set_status(ConnectionStatus::AuthFailed);
                return Err(ClientError::Authentication(message));
            }
            debug!("Management password accepted");
        }

        match self.current_state().await {
            Ok(Some(event)) if !event.is_auth_failure() => self.apply_state(event),
            Ok(_) => {}
            // Without a password the first command is taken as one
            Err(ClientError::CommandFailed(message)) if message.contains("password") => {
                return Err(ClientError::Authentication(message));
            }
            Err(err) => return Err(err),
        }

        if config.byte_count_interval > 0 {
            self.execute(Command::ByteCount(config.byte_count_interval))
                .await?;
        }
        self.execute(Command::State(Some(Toggle::On))).await?;
        if config.log_history {
            let history = self.execute(Command::Log(Some(Toggle::All))).await?;
            for line in &history.lines {
                match LogRecord::parse(line) {
                    Ok(record) => self.notify(Notice::Log(record)),
                    Err(err) => debug!(error = %err, line = %line, "Skipping log history line"),
                }
            }
        }
        self.execute(Command::Log(Some(Toggle::On))).await?;
        if config.hold_release {
            self.execute(Command::Hold(Some(HoldAction::Release)))
                .await?;
        }
        Ok(())
    }

    /// Close the socket. Does nothing if there is no open socket.
    pub async fn disconnect(&self) -> Result<()> {
        let _lifecycle = self.inner.lifecycle.lock().await;
        if !self.state().is_open() {
            return Ok(());
        }
        let session = self.inner.session.load(Ordering::SeqCst);
        self.close_session(session, None).await;
        Ok(())
    }

    /// Tear down `session` once; later calls for the same session are ignored.
    pub(crate) async fn close_session(&self, session: u64, reason: Option<ClientError>) {
        {
            let mut announced = self.inner.announced.lock();
            if self
                .inner
                .session
                .compare_exchange(session, session + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return;
            }
            if let Some(shutdown) = self.inner.shutdown.lock().take() {
                let _ = shutdown.send(());
            }
            self.inner
                .replies
                .lock()
                .fail_all(reason.clone().unwrap_or(ClientError::ConnectionClosed));
            let next = match &reason {
                Some(err) if err.is_authentication_error() => ConnectionState::AuthFailed,
                _ => ConnectionState::Disconnected,
            };
            if next == ConnectionState::AuthFailed {
                self.set_status(ConnectionStatus::AuthFailed);
            }
            self.set_state(next);
            // Dropping the sender ends the listener task once it has caught up
            let notices = self.inner.notices.lock().take();
            if std::mem::replace(&mut *announced, false)
                && let Some(notices) = notices
            {
                let _ = notices.send(Notice::Disconnected);
            }
        }

        match &reason {
            Some(err) => warn!(error = %err, "Management connection lost"),
            None => info!("Disconnected from management interface"),
        }

        let writer = {
            let mut slot = self.inner.writer.lock().await;
            if matches!(slot.as_ref(), Some((owner, _)) if *owner == session) {
                slot.take()
            } else {
                None
            }
        };
        if let Some((_, mut writer)) = writer {
            let limit = self.inner.config.command_timeout;
            let closing = SinkExt::<Command>::close(&mut writer);
            if let Ok(Err(err)) = timeout(limit, closing).await {
                trace!(error = %err, "Error closing management socket");
            }
        }
    }

    /// Send a command and wait for its reply, using the configured
    /// command timeout.
    ///
    /// An `ERROR:` reply is returned as a [`Reply`], not as an error; use
    /// [`execute`](Self::execute) for that.
    pub async fn send_command(&self, command: Command) -> Result<Reply> {
        let limit = self.inner.config.command_timeout;
        self.send_command_with_timeout(command, limit).await
    }

    /// Send a command and wait at most `limit` for its reply, including the
    /// time spent waiting for earlier commands to complete.
    ///
    /// When the limit elapses the reply is still consumed once it arrives,
    /// so later commands keep receiving their own replies.
    #[instrument(skip_all, fields(command = command.name()))]
    pub async fn send_command_with_timeout(
        &self,
        command: Command,
        limit: Duration,
    ) -> Result<Reply> {
        let start = Instant::now();
        let deadline = start + limit;
        let Ok(_serial) = timeout_at(deadline, self.inner.command_lock.lock()).await else {
            counter!("ovpnmgmt.commands.timeouts").increment(1);
            return Err(ClientError::CommandTimeout(limit));
        };

        let name = command.name();
        let (tx, rx) = oneshot::channel();
        self.write(command, Expectation::Waiter(tx)).await?;

        match timeout_at(deadline, rx).await {
            Ok(Ok(reply)) => {
                histogram!("ovpnmgmt.command.duration").record(start.elapsed().as_secs_f64());
                let reply = reply?;
                if let Terminator::Error(message) = &reply.terminator {
                    error!(command = name, error = %message, "Command failed");
                } else {
                    trace!(command = name, lines = reply.lines.len(), "Command completed");
                }
                Ok(reply)
            }
            Ok(Err(_)) => Err(ClientError::ConnectionClosed),
            Err(_) => {
                counter!("ovpnmgmt.commands.timeouts").increment(1);
                warn!(command = name, timeout = ?limit, "No reply to command");
                Err(ClientError::CommandTimeout(limit))
            }
        }
    }

    /// Send a command and fail with [`ClientError::CommandFailed`] on `ERROR:`.
    pub async fn execute(&self, command: Command) -> Result<Reply> {
        self.send_command(command).await?.into_result()
    }

    /// Send a command without waiting; its reply is consumed and dropped.
    pub async fn send_command_no_wait(&self, command: Command) -> Result<()> {
        let name = command.name();
        self.write(command, Expectation::Discard(name)).await
    }

    async fn write(&self, command: Command, expectation: Expectation) -> Result<()> {
        let mut slot = self.inner.writer.lock().await;
        let Some((_, writer)) = slot.as_mut() else {
            return Err(ClientError::NotConnected);
        };
        self.inner.replies.lock().push(expectation)?;

        let name = command.name();
        trace!(?command, "Sending command");
        let limit = self.inner.config.command_timeout;
        let outcome = match timeout(limit, writer.send(command)).await {
            Ok(result) => result.map_err(ClientError::from),
            Err(_) => Err(ClientError::CommandTimeout(limit)),
        };
        match &outcome {
            Ok(()) => counter!("ovpnmgmt.commands.sent", "command" => name).increment(1),
            Err(err) => {
                // Only an encoding failure is known to have written nothing
                let unsent = matches!(err, ClientError::Codec(_));
                self.inner.replies.lock().abandon_last(name, unsent);
                warn!(command = name, error = %err, "Failed to send command");
            }
        }
        outcome
    }

    /// Register a connection lifecycle listener
    pub fn add_connection_listener(
        &self,
        listener: Arc<dyn ConnectionStateListener>,
    ) -> ListenerId {
        self.inner.connection_listeners.add(listener)
    }

    pub fn remove_connection_listener(&self, id: ListenerId) -> bool {
        self.inner.connection_listeners.remove(id)
    }

    pub fn clear_connection_listeners(&self) {
        self.inner.connection_listeners.clear()
    }

    /// Register a byte-count listener
    pub fn add_byte_count_listener(&self, listener: Arc<dyn ByteCountListener>) -> ListenerId {
        self.inner.byte_count_listeners.add(listener)
    }

    pub fn remove_byte_count_listener(&self, id: ListenerId) -> bool {
        self.inner.byte_count_listeners.remove(id)
    }

    pub fn clear_byte_count_listeners(&self) {
        self.inner.byte_count_listeners.clear()
    }

    /// Register a log listener
    pub fn add_log_listener(&self, listener: Arc<dyn LogListener>) -> ListenerId {
        self.inner.log_listeners.add(listener)
    }

    pub fn remove_log_listener(&self, id: ListenerId) -> bool {
        self.inner.log_listeners.remove(id)
    }

    pub fn clear_log_listeners(&self) {
        self.inner.log_listeners.clear()
    }

    /// Register a state listener
    pub fn add_state_listener(&self, listener: Arc<dyn StateListener>) -> ListenerId {
        self.inner.state_listeners.add(listener)
    }

    pub fn remove_state_listener(&self, id: ListenerId) -> bool {
        self.inner.state_listeners.remove(id)
    }

    pub fn clear_state_listeners(&self) {
        self.inner.state_listeners.clear()
    }

    /// Set or clear the handler asked for credentials on `>PASSWORD:Need`
    pub fn set_authentication_handler(&self, handler: Option<Arc<dyn AuthenticationHandler>>) {
        *self.inner.auth_handler.write() = handler;
    }
}

impl std::fmt::Debug for ManagementConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementConnection")
            .field("address", &self.inner.config.address())
            .field("state", &self.state())
            .field("status", &self.status())
            .finish()
    }
}

async fn read_next(
    reader: &mut LineReader,
    read_timeout: Option<Duration>,
) -> Result<Option<ManagementLine>> {
    let next = match read_timeout {
        Some(limit) => timeout(limit, reader.next())
            .await
            .map_err(|_| ClientError::ReadTimeout)?,
        None => reader.next().await,
    };
    next.transpose().map_err(|err: CodecError| err.into())
}

/// Reads lines until the socket closes, the session is torn down or every
/// handle to the connection is gone.
async fn read_loop(
    inner: Weak<ConnectionInner>,
    session: u64,
    mut reader: LineReader,
    mut shutdown: oneshot::Receiver<()>,
) {
    let read_timeout = match inner.upgrade() {
        Some(inner) => inner.config.read_timeout,
        None => return,
    };
    debug!(session, "Reader started");
    loop {
        let next = tokio::select! {
            _ = &mut shutdown => break,
            next = read_next(&mut reader, read_timeout) => next,
        };
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let conn = ManagementConnection { inner };
        let failure = match next {
            Ok(Some(line)) => {
                counter!("ovpnmgmt.lines.received").increment(1);
                match conn.process_line(line).await {
                    Ok(()) => continue,
                    Err(err) => err,
                }
            }
            Ok(None) => ClientError::ConnectionClosed,
            Err(err) => err,
        };
        conn.close_session(session, Some(failure)).await;
        break;
    }
    debug!(session, "Reader stopped");
}
