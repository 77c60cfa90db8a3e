//! Task categories.
//!
//! Categories carry a fixed ordinal (work=1 .. uncategorized=9). The ordinal is
//! what completion-pattern keys store, and ordinal order is the canonical
//! tie-break everywhere signals are ranked. The derived `Ord` follows
//! declaration order, which matches the ordinals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Work = 1,
    Personal = 2,
    Health = 3,
    Finance = 4,
    Shopping = 5,
    Errands = 6,
    Learning = 7,
    Home = 8,
    #[default]
    Uncategorized = 9,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 9] = [
        TaskCategory::Work,
        TaskCategory::Personal,
        TaskCategory::Health,
        TaskCategory::Finance,
        TaskCategory::Shopping,
        TaskCategory::Errands,
        TaskCategory::Learning,
        TaskCategory::Home,
        TaskCategory::Uncategorized,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.ordinal() == ordinal)
    }

    /// Name shown to users and written into prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            TaskCategory::Work => "Work",
            TaskCategory::Personal => "Personal",
            TaskCategory::Health => "Health",
            TaskCategory::Finance => "Finance",
            TaskCategory::Shopping => "Shopping",
            TaskCategory::Errands => "Errands",
            TaskCategory::Learning => "Learning",
            TaskCategory::Home => "Home",
            TaskCategory::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TaskCategory {
    type Err = anyhow::Error;

    /// Accepts a display name (any case) or an ordinal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_ordinal(n).ok_or_else(|| anyhow::anyhow!("unknown category ordinal: {n}"));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_round_trip() {
        for c in TaskCategory::ALL {
            assert_eq!(TaskCategory::from_ordinal(c.ordinal()), Some(c));
        }
        assert_eq!(TaskCategory::Work.ordinal(), 1);
        assert_eq!(TaskCategory::Uncategorized.ordinal(), 9);
        assert_eq!(TaskCategory::from_ordinal(0), None);
        assert_eq!(TaskCategory::from_ordinal(10), None);
    }

    #[test]
    fn ord_follows_ordinal() {
        assert!(TaskCategory::Work < TaskCategory::Personal);
        assert!(TaskCategory::Home < TaskCategory::Uncategorized);
    }

    #[test]
    fn parses_names_and_ordinals() {
        assert_eq!("learning".parse::<TaskCategory>().unwrap(), TaskCategory::Learning);
        assert_eq!("3".parse::<TaskCategory>().unwrap(), TaskCategory::Health);
        assert!("gardening".parse::<TaskCategory>().is_err());
    }
}
