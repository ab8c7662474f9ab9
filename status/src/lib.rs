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

//! # OpenVPN Status Parser
//!
//! Turns the multi-line reply of the management `status` command into a
//! [`StatusSnapshot`]: the connected clients, the routing table and the time
//! the server last refreshed the data.
//!
//! ```rust
//! use ovpnmgmt_status::StatusSnapshot;
//!
//! let reply = "\
//! OpenVPN CLIENT LIST
//! Updated,Tue Feb 10 23:30:53 2015
//! Common Name,Real Address,Bytes Received,Bytes Sent,Connected Since
//! alice,192.0.2.10:51000,1024,2048,Tue Feb 10 23:30:46 2015
//! ROUTING TABLE
//! Virtual Address,Common Name,Real Address,Last Ref
//! 10.8.0.6,alice,192.0.2.10:51000,Tue Feb 10 23:30:52 2015
//! GLOBAL STATS
//! END";
//!
//! let snapshot: StatusSnapshot = reply.parse().unwrap();
//! assert_eq!(snapshot.clients()[0].common_name, "alice");
//! assert_eq!(snapshot.routes().len(), 1);
//! ```
//!
//! Structural problems (missing or misplaced headers) fail the whole parse.
//! A malformed client or route row is logged and dropped.

mod error;
mod parser;
mod records;

pub use error::{ParseError, Result};
pub use parser::{StatusParser, StatusSnapshot, parse_status};
pub use records::{Client, DATE_FORMAT, Route};
