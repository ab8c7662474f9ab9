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

//! # OpenVPN Management Interface Codec
//!
//! Framing and command building for the OpenVPN management interface, a
//! line-oriented text protocol spoken over a local TCP socket.
//!
//! ## Overview
//!
//! Every line the server sends is one of:
//!
//! - **Real-time notifications**: `>KEYWORD:payload`, pushed at any time
//!   (`>BYTECOUNT:`, `>LOG:`, `>STATE:`, `>PASSWORD:`, `>HOLD:` ...)
//! - **Reply terminators**: `SUCCESS: ...`, `ERROR: ...` or `END`
//! - **Reply body lines**: anything else, belonging to the reply of the
//!   command in flight
//!
//! Replies are not tagged with a request identifier; a client has to match
//! them to commands by position.
//!
//! ## Core Components
//!
//! ### [`ManagementCodec`]
//!
//! Implements [`Decoder`](tokio_util::codec::Decoder) producing
//! [`ManagementLine`] values and [`Encoder`](tokio_util::codec::Encoder) for
//! [`Command`] values.
//!
//! ### [`Command`]
//!
//! Typed builders for the commands a client issues, with the argument
//! escaping the server expects applied to credentials.
//!
//! ## Usage Example
//!
//! ```rust
//! use bytes::BytesMut;
//! use ovpnmgmt_codec::{Command, ManagementCodec, ManagementLine, Toggle};
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut codec = ManagementCodec::new();
//!
//! let mut out = BytesMut::new();
//! codec.encode(Command::State(Some(Toggle::On)), &mut out).unwrap();
//! assert_eq!(&out[..], b"state on\n");
//!
//! let mut input = BytesMut::from(&b"SUCCESS: real-time state notification set to ON\r\n"[..]);
//! let line = codec.decode(&mut input).unwrap();
//! assert_eq!(
//!     line,
//!     Some(ManagementLine::Success("real-time state notification set to ON".to_string()))
//! );
//! ```

mod codec;
mod command;
mod escape;
mod line;
mod result;

pub use codec::{DEFAULT_MAX_LINE_LENGTH, ManagementCodec, PASSWORD_PROMPT};
pub use command::{
    AUTH_REALM, AuthRetry, Command, HoldAction, PRIVATE_KEY_REALM, Signal, Toggle,
};
pub use escape::{escape, unescape};
pub use line::{
    END_MARKER, ERROR_PREFIX, ManagementLine, NOTIFICATION_PREFIX, Notification,
    NotificationKind, SUCCESS_PREFIX,
};
pub use result::{CodecError, CodecResult};
