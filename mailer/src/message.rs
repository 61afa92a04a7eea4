//! # Message
//!
//! Module dedicated to the message being sent. A [`Message`] is a
//! short-lived, ordered list of headers followed by an HTML body
//! encoded in base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::Identity;

/// Maximum length of a base64 body line, CRLF excluded.
const BODY_LINE_LEN: usize = 76;

/// Maximum number of text bytes per encoded word: 45 bytes give 60
/// base64 characters, 72 with the delimiters, under the limit of 75.
const ENCODED_WORD_TEXT_LEN: usize = 45;

/// The message structure.
///
/// Headers keep their insertion order: `From` (when set), `To`,
/// `Subject`, then the fixed MIME headers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Message {
    /// Builds a message without `From` header.
    pub fn new(subject: &str, body: &str, to: &[String]) -> Self {
        let to = to
            .iter()
            .map(|rcpt| sanitize(rcpt))
            .collect::<Vec<_>>()
            .join(",");

        let subject = if subject.is_ascii() {
            sanitize(subject)
        } else {
            encode_words(&sanitize(subject))
        };

        let headers = vec![
            ("To", to),
            ("Subject", subject),
            ("MIME-Version", String::from("1.0")),
            ("Content-Type", String::from("text/html; charset=\"utf-8\"")),
            ("Content-Transfer-Encoding", String::from("base64")),
        ];

        Self {
            headers,
            body: body.to_owned(),
        }
    }

    /// Adds the `From` header in first position.
    pub fn with_from(mut self, from: &Identity) -> Self {
        let from = Identity::new(sanitize(&from.name), sanitize(&from.addr));
        self.headers.insert(0, ("From", from.to_string()));
        self
    }

    pub fn headers(&self) -> &[(&'static str, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, val)| val.as_str())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Serializes the message into raw bytes, ready to be sent.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut msg = String::new();

        for (key, val) in &self.headers {
            msg.push_str(key);
            msg.push_str(": ");
            msg.push_str(val);
            msg.push_str("\r\n");
        }

        msg.push_str("\r\n");

        let body = STANDARD.encode(self.body.as_bytes());
        let mut lines = body.as_bytes().chunks(BODY_LINE_LEN).peekable();
        while let Some(line) = lines.next() {
            // base64 output is always ascii
            msg.push_str(&String::from_utf8_lossy(line));
            if lines.peek().is_some() {
                msg.push_str("\r\n");
            }
        }

        msg.into_bytes()
    }
}

/// Encodes the given text as RFC 2047 encoded words.
///
/// The text is split on character boundaries so that no encoded word
/// exceeds 75 characters. Words are separated by folding whitespace.
pub(crate) fn encode_words(text: &str) -> String {
    let mut words = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if i + c.len_utf8() - start > ENCODED_WORD_TEXT_LEN {
            words.push(encode_word(&text[start..i]));
            start = i;
        }
    }

    words.push(encode_word(&text[start..]));
    words.join("\r\n ")
}

fn encode_word(text: &str) -> String {
    format!("=?utf-8?b?{}?=", STANDARD.encode(text.as_bytes()))
}

pub(crate) fn has_line_break(val: &str) -> bool {
    val.contains(['\r', '\n'])
}

fn sanitize(val: &str) -> String {
    val.replace(['\r', '\n'], " ")
}
