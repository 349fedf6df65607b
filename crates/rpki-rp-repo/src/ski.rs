// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// A Subject (or Authority) Key Identifier: a fixed-length byte sequence that
/// links a child certificate to its issuer.
///
/// The canonical text form used as a log tag and as the walker's cycle-guard
/// key is the uppercase hex string (see [`Ski::to_hex`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ski([u8; 20]);

impl Ski {
    pub fn new(bytes: [u8; 20]) -> Self {
        Ski(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Uppercase hex form, used as the cycle-guard key and as a log tag.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Debug for Ski {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ski({})", self.to_hex())
    }
}

impl fmt::Display for Ski {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
