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

//! Error types for notification payload parsing

use thiserror::Error;

/// Result type for event parsing
pub type Result<T> = std::result::Result<T, EventError>;

/// Failure to turn a notification payload into a typed event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The payload has fewer comma separated fields than the record requires
    #[error("{record} record is missing the {field} field")]
    MissingField {
        /// Record being parsed
        record: &'static str,
        /// Name of the first missing field
        field: &'static str,
    },

    /// A numeric field could not be parsed
    #[error("invalid {field}: {value:?}")]
    InvalidNumber {
        /// Name of the field
        field: &'static str,
        /// Raw field text
        value: String,
    },

    /// An address field could not be parsed
    #[error("invalid {field} address: {value:?}")]
    InvalidAddress {
        /// Name of the field
        field: &'static str,
        /// Raw field text
        value: String,
    },

    /// A log flag outside of `I`, `F`, `N`, `W` and `D`
    #[error("unknown log flag {0:?}")]
    UnknownLogFlag(char),

    /// The payload does not follow the expected layout at all
    #[error("malformed {record} payload: {payload:?}")]
    Malformed {
        /// Record being parsed
        record: &'static str,
        /// Raw payload
        payload: String,
    },
}
