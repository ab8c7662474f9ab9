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

//! Client error types

use ovpnmgmt_codec::CodecError;
use ovpnmgmt_status::ParseError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Client error type
///
/// Cloneable so that one failure of the connection can be delivered to
/// every caller waiting on a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Connection timeout
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// Connection refused
    #[error("Connection refused")]
    ConnectionRefused,

    /// No data received within the read timeout
    #[error("Read timeout")]
    ReadTimeout,

    /// Connection closed by server or by a local disconnect
    #[error("Connection closed")]
    ConnectionClosed,

    /// No reply to a command within the given time
    #[error("No reply to command within {0:?}")]
    CommandTimeout(Duration),

    /// Not connected
    #[error("Not connected")]
    NotConnected,

    /// Already connected
    #[error("Already connected")]
    AlreadyConnected,

    /// Management password rejected, credentials refused or unavailable
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server answered a command with `ERROR:`
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The reply did not contain what the command should return
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    /// Framing error
    #[error("Codec error: {0}")]
    Codec(CodecError),

    /// The `status` reply could not be parsed
    #[error("Status parse error: {0}")]
    Parse(#[from] ParseError),
}

impl ClientError {
    /// Check if the error comes from the transport
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_)
                | ClientError::ConnectionTimeout
                | ClientError::ConnectionRefused
                | ClientError::ReadTimeout
                | ClientError::ConnectionClosed
                | ClientError::CommandTimeout(_)
                | ClientError::NotConnected
                | ClientError::Codec(_)
        )
    }

    /// Check if the error is an authentication failure
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, ClientError::Authentication(_))
    }

    /// Check if the server's reply could not be used
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            ClientError::CommandFailed(_) | ClientError::UnexpectedReply(_) | ClientError::Parse(_)
        )
    }
}

impl ClientError {
    /// Maps a failure to open the management socket. Nothing has been read
    /// yet, so a timeout is a connect timeout and a reset is plain I/O.
    pub(crate) fn from_connect_error(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut => ClientError::ConnectionTimeout,
            io::ErrorKind::ConnectionRefused => ClientError::ConnectionRefused,
            _ => ClientError::Io(error.to_string()),
        }
    }
}

fn from_kind(kind: io::ErrorKind, message: String) -> ClientError {
    match kind {
        io::ErrorKind::TimedOut => ClientError::ReadTimeout,
        io::ErrorKind::ConnectionRefused => ClientError::ConnectionRefused,
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => ClientError::ConnectionClosed,
        _ => ClientError::Io(message),
    }
}

impl From<io::Error> for ClientError {
    fn from(error: io::Error) -> Self {
        from_kind(error.kind(), error.to_string())
    }
}

impl From<CodecError> for ClientError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::IOError { kind, operation } => from_kind(kind, operation),
            other => ClientError::Codec(other),
        }
    }
}

/// Client result type
pub type Result<T> = std::result::Result<T, ClientError>;
