//! Event category enum as the single source of truth for category labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categories an entry can be logged under.
///
/// `Origin` marks the start of tracking and is excluded from counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Origin,
    TikTok,
    Porno,
    Imagination,
}

impl Category {
    /// Categories offered when adding an entry to an existing log.
    pub const ENTRY_CHOICES: [Self; 3] = [Self::TikTok, Self::Porno, Self::Imagination];

    /// Category preselected by a fresh add form.
    pub const DEFAULT_ENTRY: Self = Self::TikTok;

    /// Stored label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Origin => "Départ",
            Self::TikTok => "TikTok",
            Self::Porno => "Porno",
            Self::Imagination => "Imagination",
        }
    }

    pub const fn is_origin(self) -> bool {
        matches!(self, Self::Origin)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Départ" | "origin" | "depart" | "départ" => Ok(Self::Origin),
            "TikTok" | "tiktok" => Ok(Self::TikTok),
            "Porno" | "porno" => Ok(Self::Porno),
            "Imagination" | "imagination" => Ok(Self::Imagination),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown category labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        let variants = [
            Category::Origin,
            Category::TikTok,
            Category::Porno,
            Category::Imagination,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: Category = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn lowercase_aliases_parse() {
        assert_eq!("origin".parse::<Category>().unwrap(), Category::Origin);
        assert_eq!("depart".parse::<Category>().unwrap(), Category::Origin);
        assert_eq!("tiktok".parse::<Category>().unwrap(), Category::TikTok);
    }

    #[test]
    fn unknown_category_errors() {
        let err = "X".parse::<Category>().unwrap_err();
        assert_eq!(err.to_string(), "unknown category: X");
    }

    #[test]
    fn entry_choices_exclude_origin() {
        assert!(!Category::ENTRY_CHOICES.iter().any(|c| c.is_origin()));
        assert_eq!(Category::ENTRY_CHOICES[0], Category::DEFAULT_ENTRY);
    }

    #[test]
    fn serializes_as_stored_label() {
        let json = serde_json::to_string(&Category::Origin).unwrap();
        assert_eq!(json, "\"Départ\"");
    }
}
