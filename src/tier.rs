//! Free and Pro feature tiers
//!
//! The note store itself is not limited, the API checks the limits before calling it

use crate::utils::env_flag;

/// Feature tier of the installation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// Limited amount of notes, no search or export
    Free,

    /// Everything unlocked
    Pro,
}

/// Limits of a tier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum amount of notes
    pub max_notes: Option<usize>,

    /// Maximum amount of plain text characters in a single note
    pub max_chars_per_note: Option<usize>,

    /// Searching notes is allowed
    pub can_search: bool,

    /// Exporting notes is allowed
    pub can_export: bool,
}

/// Limits of the free tier
const FREE_LIMITS: Limits = Limits {
    max_notes: Some(10),
    max_chars_per_note: Some(500),
    can_search: false,
    can_export: false,
};

/// Limits of the Pro tier
const PRO_LIMITS: Limits = Limits {
    max_notes: None,
    max_chars_per_note: None,
    can_search: true,
    can_export: true,
};

impl Tier {
    /// Tier based on the `PRO_UNLOCKED` environment variable
    ///
    /// The unlock itself is handled by the payment flow outside of this service
    pub fn from_env() -> Self {
        if env_flag("PRO_UNLOCKED") {
            Self::Pro
        } else {
            Self::Free
        }
    }

    /// The limits of this tier
    pub fn limits(self) -> Limits {
        match self {
            Self::Free => FREE_LIMITS,
            Self::Pro => PRO_LIMITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        let free = Tier::Free.limits();
        assert_eq!(Some(10), free.max_notes);
        assert_eq!(Some(500), free.max_chars_per_note);
        assert!(!free.can_search);
        assert!(!free.can_export);

        let pro = Tier::Pro.limits();
        assert_eq!(None, pro.max_notes);
        assert_eq!(None, pro.max_chars_per_note);
        assert!(pro.can_search);
        assert!(pro.can_export);
    }
}
