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

//! `>LOG:` records

use crate::{EventError, Result};
use chrono::{DateTime, Utc};
use std::fmt;

const MANAGEMENT_COMMAND_PREFIX: &str = "MANAGEMENT: CMD";
const WARNING_PREFIX: &str = "WARNING:";
const NOTE_PREFIX: &str = "NOTE:";

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Maps a single server log flag onto a level.
    ///
    /// `I` is informational, `F` (fatal) and `N` (non-fatal error) are
    /// errors, `W` is a warning and `D` is debug.
    pub fn from_flag(flag: char) -> Result<LogLevel> {
        match flag {
            'I' => Ok(LogLevel::Info),
            'F' | 'N' => Ok(LogLevel::Error),
            'W' => Ok(LogLevel::Warning),
            'D' => Ok(LogLevel::Debug),
            other => Err(EventError::UnknownLogFlag(other)),
        }
    }

    /// Maps a flag string onto a level.
    ///
    /// No flags means [`LogLevel::Verbose`]. With several flags the most
    /// severe one wins.
    pub fn from_flags(flags: &str) -> Result<LogLevel> {
        let mut level = LogLevel::Verbose;
        for flag in flags.chars() {
            level = level.max(LogLevel::from_flag(flag)?);
        }
        Ok(level)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Verbose => "VERBOSE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// One line of the daemon's log, as delivered by a `>LOG:` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Unix time in seconds, `None` when the server left the field empty.
    pub timestamp: Option<u64>,
    pub level: LogLevel,
    pub message: String,
}

impl LogRecord {
    /// Parses a `time,flags,message` payload.
    ///
    /// The message may itself contain commas. Management command echoes are
    /// demoted to [`LogLevel::Verbose`], a `WARNING:` prefix raises the level to
    /// [`LogLevel::Warning`], and `WARNING:`/`NOTE:` prefixes are removed
    /// from the message.
    ///
    /// ```
    /// use ovpnmgmt_events::{LogLevel, LogRecord};
    ///
    /// let record = LogRecord::parse("1700000000,W,WARNING: cipher is weak").unwrap();
    /// assert_eq!(record.timestamp, Some(1_700_000_000));
    /// assert_eq!(record.level, LogLevel::Warning);
    /// assert_eq!(record.message, "cipher is weak");
    /// ```
    pub fn parse(payload: &str) -> Result<LogRecord> {
        let mut fields = payload.splitn(3, ',');
        let time = fields.next().unwrap_or_default();
        let flags = fields.next().ok_or(EventError::MissingField {
            record: "LOG",
            field: "flags",
        })?;
        let message = fields.next().ok_or(EventError::MissingField {
            record: "LOG",
            field: "message",
        })?;

        let timestamp = parse_optional_u64(time, "log time")?;
        let mut level = LogLevel::from_flags(flags)?;
        let mut message = message;

        if message.starts_with(MANAGEMENT_COMMAND_PREFIX) {
            level = LogLevel::Verbose;
        } else if let Some(rest) = message.strip_prefix(WARNING_PREFIX) {
            level = LogLevel::Warning;
            message = rest.trim_start();
        } else if let Some(rest) = message.strip_prefix(NOTE_PREFIX) {
            message = rest.trim_start();
        }

        Ok(LogRecord {
            timestamp,
            level,
            message: message.to_string(),
        })
    }

    /// The timestamp as a UTC date-time.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

pub(crate) fn parse_optional_u64(value: &str, field: &'static str) -> Result<Option<u64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| EventError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
