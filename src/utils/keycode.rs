//! Symbolic key name <-> numeric key code table for the keep-alive key
//!
//! Codes are Windows virtual-key codes (VK_F13 = 0x7C .. VK_F24 = 0x87). They
//! are what the config file stores, so they must never change.

use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Keys that can be used for the keep-alive press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKey {
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
}

/// The complete table: (key, name, code)
pub const KEY_TABLE: [(ActionKey, &str, u16); 12] = [
    (ActionKey::F13, "F13", 0x7C),
    (ActionKey::F14, "F14", 0x7D),
    (ActionKey::F15, "F15", 0x7E),
    (ActionKey::F16, "F16", 0x7F),
    (ActionKey::F17, "F17", 0x80),
    (ActionKey::F18, "F18", 0x81),
    (ActionKey::F19, "F19", 0x82),
    (ActionKey::F20, "F20", 0x83),
    (ActionKey::F21, "F21", 0x84),
    (ActionKey::F22, "F22", 0x85),
    (ActionKey::F23, "F23", 0x86),
    (ActionKey::F24, "F24", 0x87),
];

impl ActionKey {
    /// All keys in table order
    pub fn all() -> impl Iterator<Item = ActionKey> {
        KEY_TABLE.iter().map(|&(key, _, _)| key)
    }

    fn entry(self) -> &'static (ActionKey, &'static str, u16) {
        // The table is total over the enum, indexed by declaration order
        &KEY_TABLE[self as usize]
    }

    /// Canonical upper-case name, e.g. "F15"
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Numeric key code stored in the config file
    pub fn code(self) -> u16 {
        self.entry().2
    }

    /// Look up a key by name (case-insensitive, surrounding whitespace ignored)
    pub fn from_name(name: &str) -> Option<ActionKey> {
        let name = name.trim();
        KEY_TABLE
            .iter()
            .find(|(_, n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(key, _, _)| key)
    }

    /// Look up a key by numeric code
    pub fn from_code(code: u16) -> Option<ActionKey> {
        KEY_TABLE
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|&(key, _, _)| key)
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKey::from_name(s).ok_or_else(|| ValidationError::UnknownKey(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_indexed_by_declaration_order() {
        for (index, (key, _, _)) in KEY_TABLE.iter().enumerate() {
            assert_eq!(*key as usize, index, "{} is out of order", key);
        }
    }

    #[test]
    fn test_codes_are_contiguous() {
        let codes: Vec<u16> = ActionKey::all().map(ActionKey::code).collect();
        for pair in codes.windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
    }
}
