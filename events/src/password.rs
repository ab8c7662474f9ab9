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

//! `>PASSWORD:` requests

use crate::{EventError, Result};

const AUTH_TOKEN_PREFIX: &str = "Auth-Token:";
const VERIFICATION_FAILED_PREFIX: &str = "Verification Failed";
const NEED_PREFIX: &str = "Need";

/// What the server wants for a realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    UsernamePassword,
    PasswordOnly,
}

/// A parsed `>PASSWORD:` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordRequest {
    /// `Auth-Token:<token>`, pushed by the server after a successful login.
    AuthToken(String),
    /// `Verification Failed: '<realm>'`
    VerificationFailed { realm: String },
    /// `Need '<realm>' username/password` or `Need '<realm>' password`
    Need { realm: String, kind: CredentialKind },
}

impl PasswordRequest {
    /// Parses the payload of a `>PASSWORD:` notification.
    ///
    /// ```
    /// use ovpnmgmt_events::{CredentialKind, PasswordRequest};
    ///
    /// assert_eq!(
    ///     PasswordRequest::parse("Need 'Auth' username/password").unwrap(),
    ///     PasswordRequest::Need { realm: "Auth".into(), kind: CredentialKind::UsernamePassword },
    /// );
    /// ```
    pub fn parse(payload: &str) -> Result<PasswordRequest> {
        if let Some(token) = payload.strip_prefix(AUTH_TOKEN_PREFIX) {
            return Ok(PasswordRequest::AuthToken(token.to_string()));
        }
        if payload.starts_with(VERIFICATION_FAILED_PREFIX) {
            let realm = quoted(payload).unwrap_or_default();
            return Ok(PasswordRequest::VerificationFailed {
                realm: realm.to_string(),
            });
        }
        if payload.starts_with(NEED_PREFIX) {
            let realm = quoted(payload).ok_or_else(|| malformed(payload))?;
            let kind = if payload.contains("username/password") {
                CredentialKind::UsernamePassword
            } else if payload.contains("password") {
                CredentialKind::PasswordOnly
            } else {
                return Err(malformed(payload));
            };
            return Ok(PasswordRequest::Need {
                realm: realm.to_string(),
                kind,
            });
        }
        Err(malformed(payload))
    }
}

/// Text between the first pair of single quotes.
fn quoted(payload: &str) -> Option<&str> {
    let start = payload.find('\'')? + 1;
    let len = payload[start..].find('\'')?;
    Some(&payload[start..start + len])
}

fn malformed(payload: &str) -> EventError {
    EventError::Malformed {
        record: "PASSWORD",
        payload: payload.to_string(),
    }
}
