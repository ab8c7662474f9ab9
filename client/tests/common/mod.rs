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

//! Scripted stand-in for an OpenVPN daemon's management socket

#![allow(dead_code)]

use async_trait::async_trait;
use ovpnmgmt_client::{
    ByteCountListener, ConnectionStateListener, LogListener, ManagementConfig,
    ManagementConnection, StateListener,
};
use ovpnmgmt_events::{LastDiff, LogRecord, StateEvent};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;

pub const WAIT: Duration = Duration::from_secs(5);

pub const CONNECTED_STATE: &str = "1700000000,CONNECTED,SUCCESS,10.8.0.6,198.51.100.1,1194,,";

/// Listening socket the connection under test connects to
pub struct MockServer {
    listener: TcpListener,
}

impl MockServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    pub fn config(&self) -> ManagementConfig {
        let port = self.listener.local_addr().unwrap().port();
        ManagementConfig::new("127.0.0.1", port).with_command_timeout(Duration::from_secs(2))
    }

    pub async fn accept(&self) -> MockDaemon {
        let (stream, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .expect("no connection")
            .unwrap();
        let (read_half, write_half) = stream.into_split();
        MockDaemon {
            lines: BufReader::new(read_half),
            writer: write_half,
        }
    }
}

/// Server side of one accepted management connection
pub struct MockDaemon {
    lines: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl MockDaemon {
    /// Next line written by the client, `None` on EOF
    pub async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let read = tokio::time::timeout(WAIT, self.lines.read_line(&mut line))
            .await
            .expect("client went quiet")
            .ok()?;
        if read == 0 {
            return None;
        }
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub async fn expect(&mut self, expected: &str) {
        assert_eq!(self.read_line().await.as_deref(), Some(expected));
    }

    /// Writes `text` exactly as given
    pub async fn send_raw(&mut self, text: &str) {
        self.writer.write_all(text.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    pub async fn send(&mut self, line: &str) {
        self.send_raw(&format!("{}\r\n", line)).await;
    }

    /// Answers the commands a connection issues right after connecting
    pub async fn answer_startup(&mut self, state: &str) {
        self.expect("state").await;
        self.send(state).await;
        self.send("END").await;
        self.expect("bytecount 2").await;
        self.send("SUCCESS: bytecount interval changed").await;
        self.expect("state on").await;
        self.send("SUCCESS: real-time state notification set to ON").await;
        self.expect("log on").await;
        self.send("SUCCESS: real-time log notification set to ON").await;
        self.expect("hold release").await;
        self.send("SUCCESS: hold release succeeded").await;
    }

    /// Waits until the client closes its end
    pub async fn expect_closed(&mut self) {
        assert_eq!(self.read_line().await, None);
    }
}

/// Everything a [`Recorder`] was told, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Connected,
    Disconnected,
    ByteCount(LastDiff),
    Log(LogRecord),
    State(StateEvent),
}

/// Listener for every notification kind, forwarding into a channel
pub struct Recorder {
    tx: mpsc::UnboundedSender<Observed>,
}

impl Recorder {
    pub fn new() -> (std::sync::Arc<Self>, mpsc::UnboundedReceiver<Observed>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (std::sync::Arc::new(Self { tx }), rx)
    }

    /// Registers this recorder for every listener kind on `conn`
    pub fn attach(self: &std::sync::Arc<Self>, conn: &ManagementConnection) {
        conn.add_connection_listener(self.clone());
        conn.add_byte_count_listener(self.clone());
        conn.add_log_listener(self.clone());
        conn.add_state_listener(self.clone());
    }
}

#[async_trait]
impl ConnectionStateListener for Recorder {
    async fn on_connect(&self, _conn: &ManagementConnection) {
        let _ = self.tx.send(Observed::Connected);
    }

    async fn on_disconnect(&self, _conn: &ManagementConnection) {
        let _ = self.tx.send(Observed::Disconnected);
    }
}

#[async_trait]
impl ByteCountListener for Recorder {
    async fn on_byte_count_changed(&self, diff: &LastDiff) {
        let _ = self.tx.send(Observed::ByteCount(*diff));
    }
}

#[async_trait]
impl LogListener for Recorder {
    async fn on_record(&self, record: &LogRecord) {
        let _ = self.tx.send(Observed::Log(record.clone()));
    }
}

#[async_trait]
impl StateListener for Recorder {
    async fn on_state_changed(&self, event: &StateEvent) {
        let _ = self.tx.send(Observed::State(event.clone()));
    }
}

pub async fn next(rx: &mut mpsc::UnboundedReceiver<Observed>) -> Observed {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("no notification")
        .expect("recorder dropped")
}

/// Connects `conn` to `server`, answering the startup commands with `state`.
///
/// Returns once listeners have been told about the connection, so listeners
/// added afterwards never see events from the handshake.
pub async fn connect(server: &MockServer, conn: &ManagementConnection, state: &str) -> MockDaemon {
    let (settled, mut settled_rx) = Recorder::new();
    let settled_id = conn.add_connection_listener(settled);
    let connecting = tokio::spawn({
        let conn = conn.clone();
        async move { conn.connect().await }
    });
    let mut daemon = server.accept().await;
    daemon.answer_startup(state).await;
    connecting.await.unwrap().unwrap();
    assert_eq!(next(&mut settled_rx).await, Observed::Connected);
    conn.remove_connection_listener(settled_id);
    daemon
}

/// Listening socket that never accepts and whose backlog is already full,
/// so a further connection attempt hangs until its timeout
pub struct SaturatedListener {
    pub port: u16,
    _listener: TcpListener,
    _queued: Vec<TcpStream>,
}

impl SaturatedListener {
    pub async fn bind() -> Self {
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(1).unwrap();
        let address = listener.local_addr().unwrap();

        let mut queued = Vec::new();
        for _ in 0..64 {
            let attempt = TcpStream::connect(address);
            match tokio::time::timeout(Duration::from_millis(200), attempt).await {
                Ok(Ok(stream)) => queued.push(stream),
                Ok(Err(err)) => panic!("filling backlog: {}", err),
                Err(_) => {
                    return Self {
                        port: address.port(),
                        _listener: listener,
                        _queued: queued,
                    };
                }
            }
        }
        panic!("backlog never filled");
    }
}
