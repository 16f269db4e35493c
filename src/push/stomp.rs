// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Minimal STOMP 1.2 frame codec.
//!
//! A frame on the wire is:
//!
//! ```text
//! COMMAND EOL
//! (header-name ":" header-value EOL)*
//! EOL
//! body NUL
//! ```
//!
//! A single WebSocket payload may hold several frames, and bare EOLs between
//! frames are heart-beats. Header values are escaped in every frame except
//! CONNECT and CONNECTED.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StompError {
    #[error("Unknown STOMP command: {0}")]
    UnknownCommand(String),

    #[error("Malformed header line: {0}")]
    MalformedHeader(String),

    #[error("Invalid escape sequence in header: {0}")]
    InvalidEscape(String),

    #[error("Frame is not terminated by NUL")]
    Unterminated,

    #[error("Invalid content-length: {0}")]
    InvalidContentLength(String),

    #[error("Frame is not valid UTF-8")]
    InvalidUtf8,
}

/// STOMP commands, client and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Disconnect => "DISCONNECT",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    /// CONNECT and CONNECTED frames carry unescaped headers.
    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = StompError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "CONNECTED" => Command::Connected,
            "SEND" => Command::Send,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "ACK" => Command::Ack,
            "NACK" => Command::Nack,
            "BEGIN" => Command::Begin,
            "COMMIT" => Command::Commit,
            "ABORT" => Command::Abort,
            "DISCONNECT" => Command::Disconnect,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            other => return Err(StompError::UnknownCommand(other.to_string())),
        })
    }
}

/// A decoded or to-be-encoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header; repeated headers keep the first occurrence.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Serialize to wire format, NUL terminator included.
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }
}

fn escape_header(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_header(s: &str) -> Result<String, StompError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('c') => out.push(':'),
            _ => return Err(StompError::InvalidEscape(s.to_string())),
        }
    }
    Ok(out)
}

/// Split off one EOL-terminated line, tolerating CRLF.
fn take_line(input: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = input.iter().position(|&b| b == b'\n')?;
    let line = &input[..pos];
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    Some((line, &input[pos + 1..]))
}

fn skip_heartbeats(mut input: &[u8]) -> &[u8] {
    loop {
        if let Some(rest) = input.strip_prefix(b"\r\n") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix(b"\n") {
            input = rest;
        } else {
            return input;
        }
    }
}

/// Decode every frame in one WebSocket payload. Heart-beats are skipped.
pub fn decode_frames(payload: &[u8]) -> Result<Vec<Frame>, StompError> {
    let mut frames = Vec::new();
    let mut rest = skip_heartbeats(payload);
    while !rest.is_empty() {
        let (frame, remaining) = decode_one(rest)?;
        frames.push(frame);
        rest = skip_heartbeats(remaining);
    }
    Ok(frames)
}

fn decode_one(input: &[u8]) -> Result<(Frame, &[u8]), StompError> {
    let (command_line, mut rest) = take_line(input).ok_or(StompError::Unterminated)?;
    let command: Command = std::str::from_utf8(command_line)
        .map_err(|_| StompError::InvalidUtf8)?
        .parse()?;
    let escape = command.escapes_headers();

    let mut headers = Vec::new();
    loop {
        let (line, after) = take_line(rest).ok_or(StompError::Unterminated)?;
        rest = after;
        if line.is_empty() {
            break;
        }
        let line = std::str::from_utf8(line).map_err(|_| StompError::InvalidUtf8)?;
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| StompError::MalformedHeader(line.to_string()))?;
        if escape {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .map(|(_, v)| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| StompError::InvalidContentLength(v.clone()))
        })
        .transpose()?;

    let body_len = match content_length {
        Some(len) => {
            if rest.len() <= len || rest[len] != 0 {
                return Err(StompError::Unterminated);
            }
            len
        }
        None => rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(StompError::Unterminated)?,
    };

    let body = String::from_utf8(rest[..body_len].to_vec()).map_err(|_| StompError::InvalidUtf8)?;
    let frame = Frame {
        command,
        headers,
        body,
    };
    Ok((frame, &rest[body_len + 1..]))
}

/// Negotiated heart-beat periods as `(outgoing, incoming)`.
///
/// `client` is what this side offered as `(cx, cy)` in milliseconds; `server`
/// is the `heart-beat` header of CONNECTED. A zero period disables that
/// direction.
pub fn negotiate_heartbeat(client: (u64, u64), server: Option<&str>) -> (Duration, Duration) {
    let (cx, cy) = client;
    let (sx, sy) = server
        .and_then(|h| h.split_once(','))
        .and_then(|(a, b)| Some((a.trim().parse::<u64>().ok()?, b.trim().parse::<u64>().ok()?)))
        .unwrap_or((0, 0));

    let outgoing = if cx == 0 || sy == 0 { 0 } else { cx.max(sy) };
    let incoming = if cy == 0 || sx == 0 { 0 } else { cy.max(sx) };
    (
        Duration::from_millis(outgoing),
        Duration::from_millis(incoming),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_subscribe() {
        let frame = Frame::new(Command::Subscribe)
            .header("id", "sub-0")
            .header("destination", "/topic/notifications/42");
        assert_eq!(
            frame.encode(),
            "SUBSCRIBE\nid:sub-0\ndestination:/topic/notifications/42\n\n\0"
        );
    }

    #[test]
    fn test_connect_headers_not_escaped() {
        let frame = Frame::new(Command::Connect).header("host", "campus:8080");
        assert_eq!(frame.encode(), "CONNECT\nhost:campus:8080\n\n\0");

        let frame = Frame::new(Command::Send).header("note", "a:b");
        assert_eq!(frame.encode(), "SEND\nnote:a\\cb\n\n\0");
    }

    #[test]
    fn test_decode_message_with_heartbeats() {
        let payload = b"\n\nMESSAGE\r\ndestination:/topic/notifications\r\nsubscription:sub-1\r\n\r\n{\"type\":\"EVENT\"}\0\n";
        let frames = decode_frames(payload).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, Command::Message);
        assert_eq!(frames[0].get("subscription"), Some("sub-1"));
        assert_eq!(frames[0].body, "{\"type\":\"EVENT\"}");
    }

    #[test]
    fn test_decode_multiple_frames() {
        let payload = b"CONNECTED\nversion:1.2\nheart-beat:0,0\n\n\0MESSAGE\nx:1\n\nhi\0";
        let frames = decode_frames(payload).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].get("version"), Some("1.2"));
        assert_eq!(frames[1].body, "hi");
    }

    #[test]
    fn test_decode_heartbeat_only() {
        assert!(decode_frames(b"\n").unwrap().is_empty());
        assert!(decode_frames(b"").unwrap().is_empty());
    }

    #[test]
    fn test_content_length_allows_nul_in_body() {
        let payload = b"MESSAGE\ncontent-length:3\n\na\0b\0";
        let frames = decode_frames(payload).unwrap();
        assert_eq!(frames[0].body, "a\0b");
    }

    #[test]
    fn test_escaped_headers_decoded() {
        let payload = b"MESSAGE\nmessage:line1\\nkey\\cvalue\\\\\n\n\0";
        let frames = decode_frames(payload).unwrap();
        assert_eq!(frames[0].get("message"), Some("line1\nkey:value\\"));
    }

    #[test]
    fn test_repeated_header_first_wins() {
        let frames = decode_frames(b"MESSAGE\nfoo:1\nfoo:2\n\n\0").unwrap();
        assert_eq!(frames[0].get("foo"), Some("1"));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode_frames(b"HELLO\n\n\0"),
            Err(StompError::UnknownCommand("HELLO".to_string()))
        );
        assert_eq!(decode_frames(b"MESSAGE\n\nbody"), Err(StompError::Unterminated));
        assert!(matches!(
            decode_frames(b"MESSAGE\nbad-header\n\n\0"),
            Err(StompError::MalformedHeader(_))
        ));
        assert!(matches!(
            decode_frames(b"MESSAGE\nk:\\t\n\n\0"),
            Err(StompError::InvalidEscape(_))
        ));
    }

    #[test]
    fn test_negotiate_heartbeat() {
        let (out, inc) = negotiate_heartbeat((4000, 4000), Some("10000,10000"));
        assert_eq!(out, Duration::from_millis(10000));
        assert_eq!(inc, Duration::from_millis(10000));

        let (out, inc) = negotiate_heartbeat((4000, 4000), Some("0,0"));
        assert_eq!(out, Duration::ZERO);
        assert_eq!(inc, Duration::ZERO);

        let (out, inc) = negotiate_heartbeat((4000, 0), Some("1000,1000"));
        assert_eq!(out, Duration::from_millis(4000));
        assert_eq!(inc, Duration::ZERO);

        assert_eq!(
            negotiate_heartbeat((4000, 4000), None),
            (Duration::ZERO, Duration::ZERO)
        );
    }
}
