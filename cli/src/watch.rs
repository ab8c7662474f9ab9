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

//! Printing listeners for `ovpnmgmt watch`

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use ovpnmgmt_client::{
    ByteCountListener, ConnectionStateListener, LogListener, ManagementConnection, StateListener,
};
use ovpnmgmt_events::{LastDiff, LogRecord, StateEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

struct Printer {
    closed: mpsc::UnboundedSender<()>,
}

/// Registers printing listeners on `conn`. The receiver yields once the
/// connection goes away.
pub fn attach(conn: &ManagementConnection) -> mpsc::UnboundedReceiver<()> {
    let (closed, rx) = mpsc::unbounded_channel();
    let printer = Arc::new(Printer { closed });
    conn.add_connection_listener(printer.clone());
    conn.add_byte_count_listener(printer.clone());
    conn.add_log_listener(printer.clone());
    conn.add_state_listener(printer);
    rx
}

fn local_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|time| time.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

fn seconds(timestamp: Option<u64>) -> Option<DateTime<Utc>> {
    timestamp.and_then(|ts| DateTime::from_timestamp(i64::try_from(ts).ok()?, 0))
}

pub fn describe_state(event: &StateEvent) -> String {
    let mut line = format!(
        "{} {} ({})",
        local_time(seconds(event.timestamp)),
        event.name,
        event.status()
    );
    if let Some(message) = &event.message {
        line.push_str(&format!(" {}", message));
    }
    if let Some(local) = event.local_address {
        line.push_str(&format!(" local={}", local));
    }
    if let Some(remote) = event.remote_address {
        match event.remote_port {
            Some(port) => line.push_str(&format!(" remote={}:{}", remote, port)),
            None => line.push_str(&format!(" remote={}", remote)),
        }
    }
    line
}

fn describe_bytes(diff: &LastDiff) -> String {
    format!(
        "in {} (+{})  out {} (+{})",
        diff.bytes_in(),
        diff.diff_in(),
        diff.bytes_out(),
        diff.diff_out()
    )
}

#[async_trait]
impl ConnectionStateListener for Printer {
    async fn on_connect(&self, conn: &ManagementConnection) {
        println!("Connected to {}", conn.config().address());
    }

    async fn on_disconnect(&self, _conn: &ManagementConnection) {
        println!("Disconnected");
        let _ = self.closed.send(());
    }
}

#[async_trait]
impl ByteCountListener for Printer {
    async fn on_byte_count_changed(&self, diff: &LastDiff) {
        println!("BYTES {}", describe_bytes(diff));
    }
}

#[async_trait]
impl LogListener for Printer {
    async fn on_record(&self, record: &LogRecord) {
        println!(
            "LOG   {} {:?} {}",
            local_time(record.time()),
            record.level,
            record.message
        );
    }
}

#[async_trait]
impl StateListener for Printer {
    async fn on_state_changed(&self, event: &StateEvent) {
        println!("STATE {}", describe_state(event));
    }
}
