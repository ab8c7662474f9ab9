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

//! `>BYTECOUNT:` samples

use crate::{EventError, Result};
use chrono::Utc;

/// Cumulative tunnel byte counters at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteCountSample {
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ByteCountSample {
    pub fn new(bytes_in: u64, bytes_out: u64, timestamp: u64) -> Self {
        Self {
            bytes_in,
            bytes_out,
            timestamp,
        }
    }

    /// Parses an `in,out` payload, stamping it with `timestamp`.
    pub fn parse(payload: &str, timestamp: u64) -> Result<ByteCountSample> {
        let (bytes_in, bytes_out) = payload.split_once(',').ok_or(EventError::Malformed {
            record: "BYTECOUNT",
            payload: payload.to_string(),
        })?;
        Ok(ByteCountSample {
            bytes_in: parse_counter(bytes_in, "bytes in")?,
            bytes_out: parse_counter(bytes_out, "bytes out")?,
            timestamp,
        })
    }

    /// Parses an `in,out` payload, stamping it with the current wall clock.
    pub fn parse_now(payload: &str) -> Result<ByteCountSample> {
        ByteCountSample::parse(payload, now_millis())
    }
}

/// Current wall clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

fn parse_counter(value: &str, field: &'static str) -> Result<u64> {
    value.trim().parse().map_err(|_| EventError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_counters() {
        let sample = ByteCountSample::parse("1,1", 42).unwrap();
        assert_eq!(sample, ByteCountSample::new(1, 1, 42));

        let sample = ByteCountSample::parse("18446744073709551615,0", 0).unwrap();
        assert_eq!(sample.bytes_in, u64::MAX);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            ByteCountSample::parse("12", 0),
            Err(EventError::Malformed { .. })
        ));
        assert!(matches!(
            ByteCountSample::parse("1,2,3", 0),
            Err(EventError::InvalidNumber { field: "bytes out", .. })
        ));
        assert!(matches!(
            ByteCountSample::parse("-1,2", 0),
            Err(EventError::InvalidNumber { field: "bytes in", .. })
        ));
    }

    #[test]
    fn parse_now_uses_wall_clock() {
        let before = now_millis();
        let sample = ByteCountSample::parse_now("5,6").unwrap();
        assert!(sample.timestamp >= before);
    }
}
