// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Length of every session key.
pub const SESSION_KEY_LEN: usize = 10;

/// Characters a session key may contain.
///
/// Uppercase only, without the easily confused `0`, `O`, `1`, and `I`.
pub const SESSION_KEY_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// The opaque identifier addressing one persisted draft.
///
/// A `SessionKey` can only be obtained through [`SessionKey::parse`] or
/// [`SessionKey::generate`], so holding one proves the fixed format was
/// checked. Storage and notification code rely on this to rule out
/// identifier injection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey(String);

impl SessionKey {
    /// Parses and validates a session key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSessionKey` if the key has the wrong
    /// length or contains a character outside [`SESSION_KEY_ALPHABET`].
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let well_formed: bool = value.len() == SESSION_KEY_LEN
            && value.bytes().all(|b| SESSION_KEY_ALPHABET.contains(&b));

        if !well_formed {
            return Err(DomainError::InvalidSessionKey(truncate_for_display(value)));
        }

        Ok(Self(value.to_string()))
    }

    /// Generates a fresh random session key.
    #[must_use]
    pub fn generate() -> Self {
        let key: String = (0..SESSION_KEY_LEN)
            .map(|_| {
                // 256 is a multiple of the alphabet size, so this stays uniform.
                let index: usize = usize::from(rand::random::<u8>() % 32);
                char::from(SESSION_KEY_ALPHABET[index])
            })
            .collect();
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}

/// Keeps rejected keys short in error messages and logs.
fn truncate_for_display(value: &str) -> String {
    value.chars().take(32).collect()
}
