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

//! Stream-level tests for the management codec

use futures::{SinkExt, StreamExt};
use ovpnmgmt_codec::{
    Command, HoldAction, ManagementCodec, ManagementLine, NotificationKind, Toggle,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio_util::codec::{FramedRead, FramedWrite};

// ============================================================================
// Helper Functions
// ============================================================================

async fn read_lines(input: &'static [u8]) -> Vec<ManagementLine> {
    let (mut server, client) = duplex(64);
    tokio::spawn(async move {
        // Feed the input in small chunks to exercise partial reads
        for chunk in input.chunks(7) {
            server.write_all(chunk).await.unwrap();
        }
    });
    let mut framed = FramedRead::new(client, ManagementCodec::new());
    let mut lines = Vec::new();
    while let Some(line) = framed.next().await {
        lines.push(line.unwrap());
    }
    lines
}

// ============================================================================
// Read Tests
// ============================================================================

#[tokio::test]
async fn interleaved_notifications_and_reply() {
    let lines = read_lines(
        b">INFO:OpenVPN Management Interface Version 5 -- type 'help' for more info\r\n\
          OpenVPN Version: OpenVPN 2.6.8 x86_64-pc-linux-gnu\r\n\
          >BYTECOUNT:100,200\r\n\
          Management Version: 5\r\n\
          END\r\n",
    )
    .await;

    assert_eq!(lines.len(), 5);
    assert!(matches!(&lines[0], ManagementLine::Notification(n) if n.kind == NotificationKind::Info));
    assert_eq!(
        lines[1],
        ManagementLine::Text("OpenVPN Version: OpenVPN 2.6.8 x86_64-pc-linux-gnu".to_string())
    );
    assert!(
        matches!(&lines[2], ManagementLine::Notification(n) if n.kind == NotificationKind::ByteCount && n.payload == "100,200")
    );
    assert_eq!(lines[3], ManagementLine::Text("Management Version: 5".to_string()));
    assert_eq!(lines[4], ManagementLine::End);
}

#[tokio::test]
async fn trailing_line_without_newline() {
    let lines = read_lines(b"SUCCESS: pid=77\r\n>HOLD:Waiting for hold release:0").await;
    assert_eq!(lines.len(), 2);
    assert!(
        matches!(&lines[1], ManagementLine::Notification(n) if n.kind == NotificationKind::Hold && n.payload == "Waiting for hold release:0")
    );
}

// ============================================================================
// Write Tests
// ============================================================================

#[tokio::test]
async fn startup_sequence_is_written_in_order() {
    let (client, mut server) = duplex(1024);
    let mut framed = FramedWrite::new(client, ManagementCodec::new());

    framed.send(Command::ByteCount(2)).await.unwrap();
    framed.send(Command::State(Some(Toggle::On))).await.unwrap();
    framed.send(Command::Log(Some(Toggle::On))).await.unwrap();
    framed
        .send(Command::Hold(Some(HoldAction::Release)))
        .await
        .unwrap();
    drop(framed);

    let mut written = String::new();
    server.read_to_string(&mut written).await.unwrap();
    assert_eq!(written, "bytecount 2\nstate on\nlog on\nhold release\n");
}
