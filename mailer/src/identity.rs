//! # Identity
//!
//! Module dedicated to the sender identity, the display name and
//! address shown in the `From` header of sent messages.

use std::fmt;

use crate::message::encode_words;

/// The sender identity.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Identity {
    /// The display name, may be empty.
    pub name: String,

    /// The email address.
    pub addr: String,
}

impl Identity {
    pub fn new(name: impl ToString, addr: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            addr: addr.to_string(),
        }
    }
}

/// Formats the identity as an RFC 5322 mailbox.
///
/// Gives `Name <addr>`, or the bare address when the name is empty.
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.trim();

        if name.is_empty() {
            return write!(f, "{}", self.addr);
        }

        if !name.is_ascii() {
            return write!(f, "{} <{}>", encode_words(name), self.addr);
        }

        if name.chars().all(is_phrase_char) {
            return write!(f, "{name} <{}>", self.addr);
        }

        write!(f, "\"")?;
        for c in name.chars() {
            match c {
                '"' | '\\' => write!(f, "\\{c}")?,
                '\r' | '\n' => write!(f, " ")?,
                c => write!(f, "{c}")?,
            }
        }
        write!(f, "\" <{}>", self.addr)
    }
}

// atext (RFC 5322 §3.2.3) plus spaces between words
fn is_phrase_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || "!#$%&'*+-/=?^_`{|}~".contains(c)
}
