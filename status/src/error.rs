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

//! Error types for status parsing

use thiserror::Error;

/// Result type for status parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Failure while parsing the reply to the `status` command.
///
/// Only [`ParseError::WrongLineSequence`] aborts a parse; the other variants
/// describe a single bad record, which the parser logs and skips.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A record with the wrong number of comma separated fields
    #[error("Malformed {record} string! {line} Need to have {expected} sections separated by commas")]
    MalformedRecord {
        /// `client` or `route`
        record: &'static str,
        /// Number of fields the record needs
        expected: usize,
        /// The offending line
        line: String,
    },

    /// A real address that is not `host:port`
    #[error("Malformed real address {0:?}, expected host:port")]
    MalformedRealAddress(String),

    /// The port part of a real address is not a port number
    #[error("Cannot parse port number. {0:?}")]
    InvalidPort(String),

    /// A byte counter is not a number
    #[error("Cannot parse {field}. {value:?}")]
    InvalidNumber {
        /// Name of the column
        field: &'static str,
        /// Raw column text
        value: String,
    },

    /// A date column that does not follow `Tue Feb 10 23:30:46 2015`
    #[error("Cannot Parse date. {0:?}")]
    InvalidDate(String),

    /// The host part of a real address could not be resolved
    #[error("Cannot parse hostname. {0:?}")]
    UnresolvableHost(String),

    /// A section header or column header is missing or out of place
    #[error("Cannot parse OpenVPN status. Wrong lines sequence.")]
    WrongLineSequence,
}

impl ParseError {
    /// Check if the error aborts the whole parse
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::WrongLineSequence)
    }
}
