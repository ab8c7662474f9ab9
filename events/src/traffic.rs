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

//! Multi-resolution traffic history
//!
//! Every byte-count sample is kept at second resolution. Whenever a sample
//! starts a new minute it is also promoted into the minute history, and a
//! minute sample that starts a new hour into the hour history. Each time a
//! level promotes a sample it evicts its own entries that are
//! [`PERIODS_TO_KEEP`] or more periods of the next coarser width older than
//! that sample.

use crate::ByteCountSample;
use tracing::trace;

/// Number of coarser periods each level retains.
pub const PERIODS_TO_KEEP: u64 = 5;
/// Width of a minute bucket in milliseconds.
pub const TIME_PERIOD_MINUTES: u64 = 60 * 1000;
/// Width of an hour bucket in milliseconds.
pub const TIME_PERIOD_HOURS: u64 = 60 * TIME_PERIOD_MINUTES;

/// The sample just added and the one that preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastDiff {
    pub previous: ByteCountSample,
    pub current: ByteCountSample,
}

impl LastDiff {
    pub fn bytes_in(&self) -> u64 {
        self.current.bytes_in
    }

    pub fn bytes_out(&self) -> u64 {
        self.current.bytes_out
    }

    /// Bytes received since the previous sample, zero after a counter reset.
    pub fn diff_in(&self) -> u64 {
        self.current.bytes_in.saturating_sub(self.previous.bytes_in)
    }

    /// Bytes sent since the previous sample, zero after a counter reset.
    pub fn diff_out(&self) -> u64 {
        self.current.bytes_out.saturating_sub(self.previous.bytes_out)
    }
}

/// An immutable copy of the three history levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficSnapshot {
    pub seconds: Vec<ByteCountSample>,
    pub minutes: Vec<ByteCountSample>,
    pub hours: Vec<ByteCountSample>,
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Seconds,
    Minutes,
}

/// Rolling second/minute/hour history of byte-count samples.
///
/// Single writer; wrap it in a lock and hand out [`TrafficSnapshot`]s to
/// concurrent readers.
#[derive(Debug, Clone)]
pub struct TrafficHistory {
    seconds: Vec<ByteCountSample>,
    minutes: Vec<ByteCountSample>,
    hours: Vec<ByteCountSample>,
    last_second_used_for_minute: ByteCountSample,
    last_minute_used_for_hour: ByteCountSample,
}

impl Default for TrafficHistory {
    fn default() -> Self {
        Self {
            seconds: Vec::new(),
            minutes: Vec::new(),
            hours: Vec::new(),
            last_second_used_for_minute: ByteCountSample::new(0, 0, 0),
            last_minute_used_for_hour: ByteCountSample::new(0, 0, 0),
        }
    }
}

impl TrafficHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample and returns it together with its predecessor.
    ///
    /// The first sample is compared against zero counters, so its diff is
    /// the full cumulative count.
    pub fn add(&mut self, sample: ByteCountSample) -> LastDiff {
        let previous = self
            .seconds
            .last()
            .copied()
            .unwrap_or(ByteCountSample::new(0, 0, sample.timestamp));
        self.seconds.push(sample);
        self.roll_up(sample, Level::Seconds);
        LastDiff {
            previous,
            current: sample,
        }
    }

    fn roll_up(&mut self, sample: ByteCountSample, level: Level) {
        let (period, marker) = match level {
            Level::Seconds => (TIME_PERIOD_MINUTES, self.last_second_used_for_minute),
            Level::Minutes => (TIME_PERIOD_HOURS, self.last_minute_used_for_hour),
        };
        if sample.timestamp / period <= marker.timestamp / period {
            return;
        }

        match level {
            Level::Seconds => {
                self.minutes.push(sample);
                self.last_second_used_for_minute = sample;
                self.roll_up(sample, Level::Minutes);
            }
            Level::Minutes => {
                self.hours.push(sample);
                self.last_minute_used_for_hour = sample;
            }
        }

        let entries = match level {
            Level::Seconds => &mut self.seconds,
            Level::Minutes => &mut self.minutes,
        };
        let before = entries.len();
        entries.retain(|entry| {
            sample.timestamp.saturating_sub(entry.timestamp) / period < PERIODS_TO_KEEP
        });
        trace!(?level, evicted = before - entries.len(), "Rolled up traffic history");
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<ByteCountSample> {
        self.seconds.last().copied()
    }

    pub fn seconds(&self) -> &[ByteCountSample] {
        &self.seconds
    }

    pub fn minutes(&self) -> &[ByteCountSample] {
        &self.minutes
    }

    pub fn hours(&self) -> &[ByteCountSample] {
        &self.hours
    }

    pub fn snapshot(&self) -> TrafficSnapshot {
        TrafficSnapshot {
            seconds: self.seconds.clone(),
            minutes: self.minutes.clone(),
            hours: self.hours.clone(),
        }
    }
}
