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

use thiserror::Error;

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Represents possible errors that can occur while framing management lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    ///
    /// Contains the error kind and a description of what operation failed.
    #[error("I/O error during {operation}: {kind:?}")]
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// A line grew past the configured maximum without a terminating newline.
    #[error("line exceeds the maximum length of {limit} bytes")]
    LineTooLong {
        /// Configured maximum line length in bytes
        limit: usize,
    },

    /// A command would have been written with an embedded CR or LF, which the
    /// server would read as two separate commands.
    #[error("command '{command}' contains an embedded line break")]
    EmbeddedLineBreak {
        /// Name of the offending command
        command: &'static str,
    },

    /// A signal name that the management interface does not accept.
    #[error("unknown signal: {0}")]
    UnknownSignal(String),

    /// An auth-retry mode that the management interface does not accept.
    #[error("unknown auth-retry mode: {0}")]
    UnknownAuthRetry(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_kind() {
        let err: CodecError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into();
        match err {
            CodecError::IOError { kind, operation } => {
                assert_eq!(kind, std::io::ErrorKind::BrokenPipe);
                assert_eq!(operation, "pipe closed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            CodecError::LineTooLong { limit: 16 }.to_string(),
            "line exceeds the maximum length of 16 bytes"
        );
        assert_eq!(
            CodecError::EmbeddedLineBreak { command: "raw" }.to_string(),
            "command 'raw' contains an embedded line break"
        );
        assert_eq!(
            CodecError::UnknownSignal("SIGKILL".to_string()).to_string(),
            "unknown signal: SIGKILL"
        );
    }
}
