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

//! Argument escaping for values written to the management interface.
//!
//! The server tokenizes command lines the way a shell does: inside a double
//! quoted argument a backslash escapes the next character. Only `\` and `"`
//! need escaping, every other character is passed through untouched.

/// Escapes a value so it can be embedded inside a double quoted argument.
///
/// `\` becomes `\\` and `"` becomes `\"`. All other characters, including
/// whitespace and non-ASCII, are copied unchanged.
///
/// # Example
/// ```
/// use ovpnmgmt_codec::escape;
///
/// assert_eq!(escape(r#"pa"ss\word"#), r#"pa\"ss\\word"#);
/// ```
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Reverses [`escape`].
///
/// A backslash yields the character that follows it. A trailing lone
/// backslash is kept as is.
pub fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => unescaped.push(next),
                None => unescaped.push('\\'),
            }
        } else {
            unescaped.push(ch);
        }
    }
    unescaped
}
