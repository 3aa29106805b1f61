//! Filter predicate types
//!
//! Small enums with stable integer codes; the codes are what the key/value
//! configuration store persists.

use serde::{Deserialize, Serialize};

/// Yes/no predicate with an "off" position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    No,
    Yes,
    /// Do not filter on this dimension.
    Both,
}

impl TriState {
    pub fn code(self) -> i64 {
        match self {
            TriState::No => 0,
            TriState::Yes => 1,
            TriState::Both => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(TriState::No),
            1 => Some(TriState::Yes),
            2 => Some(TriState::Both),
            _ => None,
        }
    }

    /// Whether a record's field value passes this predicate. Selection is
    /// by equality: a field stuck at a secondary code (e.g. 2) matches
    /// neither the yes nor the no position.
    pub fn matches(self, value: i64) -> bool {
        match self {
            TriState::Both => true,
            TriState::No => value == 0,
            TriState::Yes => value == 1,
        }
    }
}

impl Default for TriState {
    fn default() -> Self {
        TriState::Both
    }
}

/// Comparison of a record's detected bottleneck code against the first
/// code seen for the same client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedCompare {
    /// Either side of the comparison is a detection sentinel.
    NotAvailable,
    Equal,
    Greater,
    Less,
    /// Do not filter on this dimension.
    All,
}

impl SpeedCompare {
    pub fn code(self) -> i64 {
        match self {
            SpeedCompare::NotAvailable => 0,
            SpeedCompare::Equal => 1,
            SpeedCompare::Greater => 2,
            SpeedCompare::Less => 3,
            SpeedCompare::All => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SpeedCompare::NotAvailable),
            1 => Some(SpeedCompare::Equal),
            2 => Some(SpeedCompare::Greater),
            3 => Some(SpeedCompare::Less),
            4 => Some(SpeedCompare::All),
            _ => None,
        }
    }
}

impl Default for SpeedCompare {
    fn default() -> Self {
        SpeedCompare::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tristate_equality_semantics() {
        assert!(TriState::Both.matches(0));
        assert!(TriState::Both.matches(2));
        assert!(TriState::Yes.matches(1));
        assert!(!TriState::Yes.matches(2));
        assert!(TriState::No.matches(0));
        assert!(!TriState::No.matches(1));
    }

    #[test]
    fn test_code_round_trips() {
        for code in 0..3 {
            assert_eq!(TriState::from_code(code).unwrap().code(), code);
        }
        for code in 0..5 {
            assert_eq!(SpeedCompare::from_code(code).unwrap().code(), code);
        }
        assert!(TriState::from_code(3).is_none());
        assert!(SpeedCompare::from_code(5).is_none());
    }
}
