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

//! Line-sequence parser for the `status` reply

use crate::records::parse_date;
use crate::{Client, ParseError, Result, Route};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{debug, error};

const STATS_HEADER: &str = "OpenVPN STATISTICS";
const CLIENTS_HEADER: &str = "OpenVPN CLIENT LIST";
const UPDATED_PREFIX: &str = "Updated,";
const CLIENT_COLUMNS: &str = "Common Name,Real Address,Bytes Received,Bytes Sent,Connected Since";
const ROUTES_HEADER: &str = "ROUTING TABLE";
const ROUTE_COLUMNS: &str = "Virtual Address,Common Name,Real Address,Last Ref";
const GLOBAL_STATS: &str = "GLOBAL STATS";
const END: &str = "END";

/// Parsed reply to the `status` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    clients: Vec<Client>,
    routes: BTreeSet<Route>,
    updated: Option<NaiveDateTime>,
}

impl StatusSnapshot {
    /// Clients in the order the server listed them.
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Distinct routes.
    pub fn routes(&self) -> &BTreeSet<Route> {
        &self.routes
    }

    /// Time the server last refreshed its status, if it could be parsed.
    pub fn updated(&self) -> Option<NaiveDateTime> {
        self.updated
    }
}

impl FromStr for StatusSnapshot {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<StatusSnapshot> {
        parse_status(text.lines())
    }
}

/// Parses a complete `status` reply given as individual lines.
pub fn parse_status<I, S>(lines: I) -> Result<StatusSnapshot>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = StatusParser::new();
    for line in lines {
        parser.feed(line.as_ref())?;
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Statistics,
    ClientList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    ExpectHeader,
    ExpectUpdated(Section),
    ExpectClientColumns,
    InClients,
    ExpectRouteColumns,
    InRoutes,
    Done,
}

/// Incremental parser for the `status` reply.
///
/// Lines before the first section header are ignored. The statistics and
/// client list headers must be followed by an `Updated,` line, the client
/// list and routing table headers by their exact column headers. Any
/// violation, including input that stops inside a section, fails with
/// [`ParseError::WrongLineSequence`]. Bad client or route rows are logged and
/// dropped.
#[derive(Debug)]
pub struct StatusParser {
    state: ParserState,
    snapshot: StatusSnapshot,
}

impl Default for StatusParser {
    fn default() -> Self {
        Self {
            state: ParserState::ExpectHeader,
            snapshot: StatusSnapshot::default(),
        }
    }
}

impl StatusParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next line, without its line terminator.
    pub fn feed(&mut self, line: &str) -> Result<()> {
        let state = self.state;
        self.state = match state {
            ParserState::ExpectHeader => match line {
                STATS_HEADER => ParserState::ExpectUpdated(Section::Statistics),
                CLIENTS_HEADER => ParserState::ExpectUpdated(Section::ClientList),
                ROUTES_HEADER => ParserState::ExpectRouteColumns,
                END => ParserState::Done,
                _ => ParserState::ExpectHeader,
            },
            ParserState::ExpectUpdated(section) => {
                let Some(date) = line.strip_prefix(UPDATED_PREFIX) else {
                    return Err(self.wrong_sequence(line));
                };
                match parse_date(date) {
                    Ok(updated) => self.snapshot.updated = Some(updated),
                    Err(e) => error!(error = %e, "Cannot parse update date"),
                }
                match section {
                    Section::Statistics => ParserState::ExpectHeader,
                    Section::ClientList => ParserState::ExpectClientColumns,
                }
            }
            ParserState::ExpectClientColumns if line == CLIENT_COLUMNS => ParserState::InClients,
            ParserState::InClients => match line {
                ROUTES_HEADER => ParserState::ExpectRouteColumns,
                END => return Err(self.wrong_sequence(line)),
                _ => {
                    self.add_client(line);
                    ParserState::InClients
                }
            },
            ParserState::ExpectRouteColumns if line == ROUTE_COLUMNS => ParserState::InRoutes,
            ParserState::InRoutes => match line {
                GLOBAL_STATS => ParserState::Done,
                END => return Err(self.wrong_sequence(line)),
                _ => {
                    self.add_route(line);
                    ParserState::InRoutes
                }
            },
            ParserState::ExpectClientColumns | ParserState::ExpectRouteColumns => {
                return Err(self.wrong_sequence(line));
            }
            ParserState::Done => ParserState::Done,
        };
        Ok(())
    }

    /// Completes the parse.
    ///
    /// Fails if the input ended in the middle of a section.
    pub fn finish(self) -> Result<StatusSnapshot> {
        match self.state {
            ParserState::ExpectHeader | ParserState::Done => {
                debug!(
                    clients = self.snapshot.clients.len(),
                    routes = self.snapshot.routes.len(),
                    "Successfully parsed status"
                );
                Ok(self.snapshot)
            }
            state => {
                error!(?state, "Status output ended inside a section");
                Err(ParseError::WrongLineSequence)
            }
        }
    }

    fn wrong_sequence(&self, line: &str) -> ParseError {
        error!(state = ?self.state, line, "Unexpected line in status output");
        ParseError::WrongLineSequence
    }

    fn add_client(&mut self, line: &str) {
        match line.parse::<Client>() {
            Ok(client) => self.snapshot.clients.push(client),
            Err(e) => error!(error = %e, "Cannot add the client"),
        }
    }

    fn add_route(&mut self, line: &str) {
        match line.parse::<Route>() {
            Ok(route) => {
                self.snapshot.routes.insert(route);
            }
            Err(e) => error!(error = %e, "Cannot add route"),
        }
    }
}
