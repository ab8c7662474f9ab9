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

//! Client and route records of the status output

use crate::{ParseError, Result};
use chrono::NaiveDateTime;
use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;

/// Format of the date columns, e.g. `Tue Feb 10 23:30:46 2015`.
pub const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

const CLIENT_FIELDS: usize = 5;
const ROUTE_FIELDS: usize = 4;

/// One row of the `OpenVPN CLIENT LIST` section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Client {
    pub common_name: String,
    pub real_address: SocketAddr,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub connected_since: NaiveDateTime,
}

impl FromStr for Client {
    type Err = ParseError;

    /// Parses `Common Name,Real Address,Bytes Received,Bytes Sent,Connected Since`.
    fn from_str(line: &str) -> Result<Client> {
        let fields = split_record(line, "client", CLIENT_FIELDS)?;
        Ok(Client {
            common_name: fields[0].to_string(),
            real_address: parse_real_address(fields[1])?,
            bytes_received: parse_counter(fields[2], "bytes received")?,
            bytes_sent: parse_counter(fields[3], "bytes sent")?,
            connected_since: parse_date(fields[4])?,
        })
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) rx={} tx={} since {}",
            self.common_name,
            self.real_address,
            self.bytes_received,
            self.bytes_sent,
            self.connected_since.format(DATE_FORMAT)
        )
    }
}

/// One row of the `ROUTING TABLE` section.
///
/// Ordered and compared over all fields so a route set deduplicates on
/// content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route {
    pub virtual_address: String,
    pub common_name: String,
    pub real_address: SocketAddr,
    pub last_ref: NaiveDateTime,
}

impl FromStr for Route {
    type Err = ParseError;

    /// Parses `Virtual Address,Common Name,Real Address,Last Ref`.
    fn from_str(line: &str) -> Result<Route> {
        let fields = split_record(line, "route", ROUTE_FIELDS)?;
        Ok(Route {
            virtual_address: fields[0].to_string(),
            common_name: fields[1].to_string(),
            real_address: parse_real_address(fields[2])?,
            last_ref: parse_date(fields[3])?,
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({}) last ref {}",
            self.virtual_address,
            self.common_name,
            self.real_address,
            self.last_ref.format(DATE_FORMAT)
        )
    }
}

fn split_record<'a>(line: &'a str, record: &'static str, expected: usize) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != expected {
        return Err(ParseError::MalformedRecord {
            record,
            expected,
            line: line.to_string(),
        });
    }
    Ok(fields)
}

fn parse_real_address(value: &str) -> Result<SocketAddr> {
    let parts: Vec<&str> = value.split(':').collect();
    let [host, port] = parts.as_slice() else {
        return Err(ParseError::MalformedRealAddress(value.to_string()));
    };
    let port: u16 = port
        .parse()
        .map_err(|_| ParseError::InvalidPort(port.to_string()))?;
    Ok(SocketAddr::new(resolve_host(host)?, port))
}

/// Parses an IP literal, falling back to a name lookup.
fn resolve_host(host: &str) -> Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    (host, 0)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| addr.ip())
        .ok_or_else(|| ParseError::UnresolvableHost(host.to_string()))
}

fn parse_counter(value: &str, field: &'static str) -> Result<u64> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Parses a date column. Single digit days are space padded by the server.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDateTime> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::net::Ipv4Addr;

    #[test]
    fn parse_client() {
        let client: Client = "cloud.msk.pp.ua,192.168.1.1:59113,19192,19924,Tue Feb 10 23:30:46 2015"
            .parse()
            .unwrap();
        assert_eq!(client.common_name, "cloud.msk.pp.ua");
        assert_eq!(
            client.real_address,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)), 59113)
        );
        assert_eq!(client.bytes_received, 19192);
        assert_eq!(client.bytes_sent, 19924);
        assert_eq!(client.connected_since.year(), 2015);
        assert_eq!(client.connected_since.day(), 10);
        assert_eq!(client.connected_since.second(), 46);
    }

    #[test]
    fn parse_route() {
        let route: Route = "127.0.0.1,cloud.msk.pp.ua,192.168.1.1:59113,Tue Feb 10 23:30:52 2015"
            .parse()
            .unwrap();
        assert_eq!(route.virtual_address, "127.0.0.1");
        assert_eq!(route.common_name, "cloud.msk.pp.ua");
        assert_eq!(route.real_address.port(), 59113);
        assert_eq!(route.last_ref.second(), 52);
    }

    #[test]
    fn single_digit_day() {
        let date = parse_date("Tue Feb  3 01:02:03 2015").unwrap();
        assert_eq!(date.day(), 3);
    }

    #[test]
    fn wrong_field_count() {
        let err = "a,1.2.3.4:5,1,2".parse::<Client>().unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { record: "client", expected: 5, .. }));

        let err = "a,b,1.2.3.4:5,Tue Feb 10 23:30:52 2015,extra"
            .parse::<Route>()
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { record: "route", expected: 4, .. }));
    }

    #[test]
    fn bad_real_address() {
        let err = "a,1.2.3.4,1,2,Tue Feb 10 23:30:46 2015"
            .parse::<Client>()
            .unwrap_err();
        assert_eq!(err, ParseError::MalformedRealAddress("1.2.3.4".to_string()));

        let err = "a,udp4:1.2.3.4:1194,1,2,Tue Feb 10 23:30:46 2015"
            .parse::<Client>()
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedRealAddress(_)));
    }

    #[test]
    fn bad_port() {
        let err = "a,1.2.3.4:http,1,2,Tue Feb 10 23:30:46 2015"
            .parse::<Client>()
            .unwrap_err();
        assert_eq!(err, ParseError::InvalidPort("http".to_string()));
    }

    #[test]
    fn bad_date() {
        let err = "a,1.2.3.4:1194,1,2,2015-02-10 23:30:46"
            .parse::<Client>()
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate(_)));
    }

    #[test]
    fn bad_counter() {
        let err = "a,1.2.3.4:1194,lots,2,Tue Feb 10 23:30:46 2015"
            .parse::<Client>()
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "bytes received", .. }));
    }

    #[test]
    fn unresolvable_host() {
        let err = "a,no-such-host.invalid:1194,1,2,Tue Feb 10 23:30:46 2015"
            .parse::<Client>()
            .unwrap_err();
        assert!(matches!(err, ParseError::UnresolvableHost(_)));
    }

    #[test]
    fn routes_deduplicate_on_content() {
        let line = "10.8.0.6,alice,198.51.100.2:40000,Tue Feb 10 23:30:52 2015";
        let mut routes = std::collections::BTreeSet::new();
        routes.insert(line.parse::<Route>().unwrap());
        routes.insert(line.parse::<Route>().unwrap());
        assert_eq!(routes.len(), 1);
    }
}
