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

//! Matching of reply lines to the commands that requested them

use crate::{ClientError, Result};
use std::collections::VecDeque;
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// How a reply ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// `SUCCESS: message`
    Success(String),
    /// `ERROR: message`
    Error(String),
    /// `END` after a multi-line body
    End,
}

/// A complete reply: the body lines and the line that terminated them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub terminator: Terminator,
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self.terminator, Terminator::Error(_))
    }

    /// The message after `SUCCESS:` or `ERROR:`, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.terminator {
            Terminator::Success(message) | Terminator::Error(message) => Some(message),
            Terminator::End => None,
        }
    }

    /// Converts an `ERROR:` reply into [`ClientError::CommandFailed`].
    pub fn into_result(self) -> Result<Reply> {
        match self.terminator {
            Terminator::Error(message) => Err(ClientError::CommandFailed(message)),
            _ => Ok(self),
        }
    }
}

/// Someone waiting for the next reply
pub(crate) enum Expectation {
    Waiter(oneshot::Sender<Result<Reply>>),
    /// Reply consumed and dropped; the command was sent without waiting.
    Discard(&'static str),
}

/// FIFO of outstanding commands.
///
/// The server answers commands strictly in order, so the oldest expectation
/// owns the next terminator. An expectation whose caller gave up (timeout)
/// stays queued and silently swallows its reply when it eventually arrives.
#[derive(Default)]
pub(crate) struct ReplyQueue {
    pending: VecDeque<Expectation>,
    body: Vec<String>,
    closed: bool,
}

impl ReplyQueue {
    /// Clears all leftovers of a previous session.
    pub fn reopen(&mut self) {
        self.pending.clear();
        self.body.clear();
        self.closed = false;
    }

    /// Queues an expectation, unless the session has already been torn down.
    pub fn push(&mut self, expectation: Expectation) -> Result<()> {
        if self.closed {
            return Err(ClientError::NotConnected);
        }
        self.pending.push_back(expectation);
        Ok(())
    }

    /// Gives up on the most recent [`push`](Self::push) after its write
    /// failed. A command that may have partly reached the server keeps its
    /// slot as a discard so a late reply cannot be taken by the next caller.
    pub fn abandon_last(&mut self, command: &'static str, unsent: bool) {
        if unsent {
            self.pending.pop_back();
        } else if let Some(last) = self.pending.back_mut() {
            *last = Expectation::Discard(command);
        }
    }

    pub fn is_waiting(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Adds a body line to the reply currently being collected.
    pub fn line(&mut self, line: String) {
        if self.pending.is_empty() {
            debug!(line = %line, "Dropping unsolicited line");
            return;
        }
        self.body.push(line);
    }

    /// Completes the oldest reply.
    pub fn terminate(&mut self, terminator: Terminator) {
        let lines = std::mem::take(&mut self.body);
        match self.pending.pop_front() {
            Some(Expectation::Waiter(sender)) => {
                if sender.send(Ok(Reply { lines, terminator })).is_err() {
                    trace!("Reply arrived after the caller gave up");
                }
            }
            Some(Expectation::Discard(command)) => {
                if let Terminator::Error(message) = &terminator {
                    debug!(command, error = %message, "Unawaited command failed");
                }
            }
            None => debug!(?terminator, "Dropping unsolicited reply terminator"),
        }
    }

    /// Fails every outstanding waiter with `error` and refuses new ones
    /// until [`reopen`](Self::reopen).
    pub fn fail_all(&mut self, error: ClientError) {
        self.closed = true;
        self.body.clear();
        for expectation in self.pending.drain(..) {
            if let Expectation::Waiter(sender) = expectation {
                let _ = sender.send(Err(error.clone()));
            }
        }
    }
}
