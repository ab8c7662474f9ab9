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

//! # OpenVPN Management Events
//!
//! Typed records for the real-time notifications of the OpenVPN management
//! interface, plus the traffic history the byte-count samples feed.
//!
//! All parsing here is pure: no I/O, no locking. Parse failures are returned
//! as [`EventError`] so a caller can log the offending line and move on.
//!
//! | Notification   | Type                |
//! |----------------|---------------------|
//! | `>BYTECOUNT:`  | [`ByteCountSample`] |
//! | `>LOG:`        | [`LogRecord`]       |
//! | `>STATE:`      | [`StateEvent`]      |
//! | `>PASSWORD:`   | [`PasswordRequest`] |

mod bytecount;
mod error;
mod log;
mod password;
mod state;
mod traffic;

pub use bytecount::{ByteCountSample, now_millis};
pub use error::{EventError, Result};
pub use log::{LogLevel, LogRecord};
pub use password::{CredentialKind, PasswordRequest};
pub use state::{AUTH_FAILURE_MESSAGE, ConnectionStatus, StateEvent, classify};
pub use traffic::{
    LastDiff, PERIODS_TO_KEEP, TIME_PERIOD_HOURS, TIME_PERIOD_MINUTES, TrafficHistory,
    TrafficSnapshot,
};
