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

use crate::{CodecError, Command, ManagementLine};
use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

/// Prompt the server prints, without a line terminator, while it waits for
/// the management password.
pub const PASSWORD_PROMPT: &str = "ENTER PASSWORD:";

/// Default upper bound for a single received line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// A codec for the OpenVPN management interface.
///
/// The decoder splits the incoming byte stream on `\n`, tolerates `\r\n`,
/// skips blank lines and classifies every line as a [`ManagementLine`].
/// Because the password prompt is printed without a newline, it ends up in
/// front of the next line the server sends; the decoder strips it.
///
/// The encoder writes one [`Command`] per line and refuses commands with
/// embedded line breaks.
#[derive(Debug, Clone)]
pub struct ManagementCodec {
    max_line_length: usize,
    next_index: usize,
}

impl ManagementCodec {
    /// Creates a codec with [`DEFAULT_MAX_LINE_LENGTH`].
    ///
    /// # Example
    /// ```
    /// use ovpnmgmt_codec::ManagementCodec;
    ///
    /// let codec = ManagementCodec::new();
    /// assert_eq!(codec.max_line_length(), ovpnmgmt_codec::DEFAULT_MAX_LINE_LENGTH);
    /// ```
    pub fn new() -> ManagementCodec {
        ManagementCodec::default()
    }

    /// Creates a codec that fails with [`CodecError::LineTooLong`] once a
    /// line grows past `max_line_length` bytes.
    pub fn with_max_line_length(max_line_length: usize) -> ManagementCodec {
        ManagementCodec {
            max_line_length,
            next_index: 0,
        }
    }

    /// Maximum accepted line length in bytes.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    fn classify(raw: &[u8]) -> Option<ManagementLine> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let decoded = String::from_utf8_lossy(raw);
        let text = decoded.strip_prefix(PASSWORD_PROMPT).unwrap_or(decoded.as_ref());
        if text.is_empty() {
            return None;
        }
        trace!(line = %text, "Decoded management line");
        Some(ManagementLine::parse(text))
    }
}

impl Default for ManagementCodec {
    fn default() -> Self {
        ManagementCodec::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl Decoder for ManagementCodec {
    type Item = ManagementLine;
    type Error = CodecError;

    /// Decodes the next complete line from `src`.
    ///
    /// Returns `Ok(None)` until a full line is buffered. The scan position is
    /// remembered between calls so a long partial line is only searched once.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<ManagementLine>, Self::Error> {
        loop {
            let read_to = src.len().min(self.max_line_length.saturating_add(1));
            let newline = src[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n');
            match newline {
                Some(offset) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let raw = src.split_to(end + 1);
                    if let Some(line) = Self::classify(&raw[..end]) {
                        return Ok(Some(line));
                    }
                }
                None if src.len() > self.max_line_length => {
                    self.next_index = 0;
                    warn!(
                        buffered = src.len(),
                        limit = self.max_line_length,
                        "Management line exceeds limit"
                    );
                    return Err(CodecError::LineTooLong {
                        limit: self.max_line_length,
                    });
                }
                None => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    /// Flushes a final unterminated line when the server closes the stream.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<ManagementLine>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.next_index = 0;
        if src.is_empty() {
            return Ok(None);
        }
        let raw = src.split_to(src.len());
        Ok(Self::classify(&raw))
    }
}

impl Encoder<Command> for ManagementCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.to_line();
        if line.contains(['\r', '\n']) {
            return Err(CodecError::EmbeddedLineBreak {
                command: item.name(),
            });
        }
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

impl Encoder<&str> for ManagementCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encode(Command::from(item), dst)
    }
}
