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

use std::fmt;

/// Prefix carried by every real-time notification.
pub const NOTIFICATION_PREFIX: char = '>';
/// Prefix of a reply line that closes a successful command.
pub const SUCCESS_PREFIX: &str = "SUCCESS:";
/// Prefix of a reply line that closes a failed command.
pub const ERROR_PREFIX: &str = "ERROR:";
/// Terminator of a multi-line reply.
pub const END_MARKER: &str = "END";

/// Keyword of a real-time notification (`>KEYWORD:payload`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// `>BYTECOUNT:in,out`
    ByteCount,
    /// `>BYTECOUNT_CLI:cid,in,out` (server mode)
    ByteCountCli,
    /// `>CLIENT:...` (server mode)
    Client,
    /// `>ECHO:...`
    Echo,
    /// `>FATAL:message`
    Fatal,
    /// `>HOLD:message`
    Hold,
    /// `>INFO:message`, usually the greeting.
    Info,
    /// `>INFOMSG:message`
    InfoMsg,
    /// `>LOG:time,flags,message`
    Log,
    /// `>NEED-OK:...`
    NeedOk,
    /// `>NEED-STR:...`
    NeedStr,
    /// `>NOTIFY:...`
    Notify,
    /// `>PASSWORD:...`
    Password,
    /// `>PK_SIGN:...`
    PkSign,
    /// `>PROXY:...`
    Proxy,
    /// `>REMOTE:...`
    Remote,
    /// `>RSA_SIGN:...`
    RsaSign,
    /// `>STATE:time,name,desc,local,remote,port,...`
    State,
    /// `>UPDOWN:...`
    UpDown,
    /// Any keyword this crate does not know about.
    Other(String),
}

impl NotificationKind {
    /// Maps a wire keyword onto its kind. Matching is exact and case sensitive.
    pub fn from_keyword(keyword: &str) -> NotificationKind {
        match keyword {
            "BYTECOUNT" => NotificationKind::ByteCount,
            "BYTECOUNT_CLI" => NotificationKind::ByteCountCli,
            "CLIENT" => NotificationKind::Client,
            "ECHO" => NotificationKind::Echo,
            "FATAL" => NotificationKind::Fatal,
            "HOLD" => NotificationKind::Hold,
            "INFO" => NotificationKind::Info,
            "INFOMSG" => NotificationKind::InfoMsg,
            "LOG" => NotificationKind::Log,
            "NEED-OK" => NotificationKind::NeedOk,
            "NEED-STR" => NotificationKind::NeedStr,
            "NOTIFY" => NotificationKind::Notify,
            "PASSWORD" => NotificationKind::Password,
            "PK_SIGN" => NotificationKind::PkSign,
            "PROXY" => NotificationKind::Proxy,
            "REMOTE" => NotificationKind::Remote,
            "RSA_SIGN" => NotificationKind::RsaSign,
            "STATE" => NotificationKind::State,
            "UPDOWN" => NotificationKind::UpDown,
            other => NotificationKind::Other(other.to_string()),
        }
    }

    /// The keyword as it appears on the wire.
    pub fn keyword(&self) -> &str {
        match self {
            NotificationKind::ByteCount => "BYTECOUNT",
            NotificationKind::ByteCountCli => "BYTECOUNT_CLI",
            NotificationKind::Client => "CLIENT",
            NotificationKind::Echo => "ECHO",
            NotificationKind::Fatal => "FATAL",
            NotificationKind::Hold => "HOLD",
            NotificationKind::Info => "INFO",
            NotificationKind::InfoMsg => "INFOMSG",
            NotificationKind::Log => "LOG",
            NotificationKind::NeedOk => "NEED-OK",
            NotificationKind::NeedStr => "NEED-STR",
            NotificationKind::Notify => "NOTIFY",
            NotificationKind::Password => "PASSWORD",
            NotificationKind::PkSign => "PK_SIGN",
            NotificationKind::Proxy => "PROXY",
            NotificationKind::Remote => "REMOTE",
            NotificationKind::RsaSign => "RSA_SIGN",
            NotificationKind::State => "STATE",
            NotificationKind::UpDown => "UPDOWN",
            NotificationKind::Other(keyword) => keyword,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A real-time notification pushed by the server outside the request/reply cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Keyword between `>` and the first `:`.
    pub kind: NotificationKind,
    /// Everything after the first `:`, unmodified.
    pub payload: String,
}

/// A single classified line received from the management interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementLine {
    /// An asynchronous `>KEYWORD:payload` line.
    Notification(Notification),
    /// `SUCCESS: message`, terminates a reply.
    Success(String),
    /// `ERROR: message`, terminates a reply.
    Error(String),
    /// `END`, terminates a multi-line reply.
    End,
    /// Any other line; part of the body of a pending reply.
    Text(String),
}

impl ManagementLine {
    /// Classifies one line of text that has already been stripped of its
    /// line terminator.
    ///
    /// # Example
    /// ```
    /// use ovpnmgmt_codec::{ManagementLine, NotificationKind};
    ///
    /// match ManagementLine::parse(">BYTECOUNT:10,20") {
    ///     ManagementLine::Notification(n) => {
    ///         assert_eq!(n.kind, NotificationKind::ByteCount);
    ///         assert_eq!(n.payload, "10,20");
    ///     }
    ///     other => panic!("unexpected {other:?}"),
    /// }
    /// assert_eq!(ManagementLine::parse("END"), ManagementLine::End);
    /// ```
    pub fn parse(line: &str) -> ManagementLine {
        if let Some(rest) = line.strip_prefix(NOTIFICATION_PREFIX) {
            let (keyword, payload) = rest.split_once(':').unwrap_or((rest, ""));
            return ManagementLine::Notification(Notification {
                kind: NotificationKind::from_keyword(keyword),
                payload: payload.to_string(),
            });
        }
        if let Some(rest) = line.strip_prefix(SUCCESS_PREFIX) {
            return ManagementLine::Success(rest.trim_start().to_string());
        }
        if let Some(rest) = line.strip_prefix(ERROR_PREFIX) {
            return ManagementLine::Error(rest.trim_start().to_string());
        }
        if line == END_MARKER {
            return ManagementLine::End;
        }
        ManagementLine::Text(line.to_string())
    }

    /// Returns `true` for a real-time notification.
    pub fn is_notification(&self) -> bool {
        matches!(self, ManagementLine::Notification(_))
    }

    /// Returns `true` if the line closes a pending reply.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            ManagementLine::Success(_) | ManagementLine::Error(_) | ManagementLine::End
        )
    }
}

impl fmt::Display for ManagementLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagementLine::Notification(n) => write!(f, ">{}:{}", n.kind, n.payload),
            ManagementLine::Success(msg) => write!(f, "{} {}", SUCCESS_PREFIX, msg),
            ManagementLine::Error(msg) => write!(f, "{} {}", ERROR_PREFIX, msg),
            ManagementLine::End => f.write_str(END_MARKER),
            ManagementLine::Text(text) => f.write_str(text),
        }
    }
}
