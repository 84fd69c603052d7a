//! MusicBrainz identifier (MBID) value object.
//!
//! An [`Mbid`] can only be obtained through [`Mbid::parse`], which trims,
//! lowercases and checks the 8-4-4-4-12 hex layout. Everything downstream
//! (cache, provider, CLI) treats a constructed `Mbid` as already valid.
//!
//! Validation is about shape only: version and variant nibbles are not checked,
//! so `11111111-1111-1111-1111-111111111111` is accepted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::domain::MetadataError;

/// Lengths of the dash-separated hex groups.
const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// Total length of a canonical MBID (32 hex digits + 4 dashes).
const MBID_LEN: usize = 36;

/// A normalized MusicBrainz identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mbid(String);

impl Mbid {
    /// Trim, lowercase and validate a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        let normalized = normalize(raw);
        if !has_canonical_shape(&normalized) {
            return Err(MetadataError::InvalidFormat(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Check whether `raw` would be accepted by [`Mbid::parse`].
    pub fn is_valid(raw: &str) -> bool {
        has_canonical_shape(&normalize(raw))
    }

    /// The normalized lowercase form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a raw string after trimming and lowercasing it.
    ///
    /// The other side is not validated, so a malformed string is simply unequal.
    pub fn equals_raw(&self, other: &str) -> bool {
        self.0 == normalize(other)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn has_canonical_shape(s: &str) -> bool {
    if s.len() != MBID_LEN {
        return false;
    }

    let mut groups = s.split('-');
    for expected in GROUPS {
        match groups.next() {
            Some(group) if group.len() == expected && group.bytes().all(|b| b.is_ascii_hexdigit()) => {}
            _ => return false,
        }
    }
    groups.next().is_none()
}

impl fmt::Display for Mbid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Mbid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Mbid {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Mbid {
    type Error = MetadataError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Mbid {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl PartialEq<str> for Mbid {
    fn eq(&self, other: &str) -> bool {
        self.equals_raw(other)
    }
}

impl PartialEq<&str> for Mbid {
    fn eq(&self, other: &&str) -> bool {
        self.equals_raw(other)
    }
}

impl Serialize for Mbid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Mbid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Mbid::parse(&raw).map_err(serde::de::Error::custom)
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Hex group of a fixed length in mixed case
    fn hex_group(len: usize) -> impl Strategy<Value = String> {
        prop::string::string_regex(&format!("[0-9a-fA-F]{{{}}}", len)).unwrap()
    }

    /// A canonical-shaped identifier in random letter case
    fn canonical() -> impl Strategy<Value = String> {
        (hex_group(8), hex_group(4), hex_group(4), hex_group(4), hex_group(12))
            .prop_map(|(a, b, c, d, e)| format!("{}-{}-{}-{}-{}", a, b, c, d, e))
    }

    /// Leading/trailing whitespace
    fn padding() -> impl Strategy<Value = String> {
        prop::string::string_regex("[ \t\n]{0,3}").unwrap()
    }

    proptest! {
        /// Parsing normalizes to the trimmed lowercase form
        #[test]
        fn parse_normalizes(s in canonical(), pre in padding(), post in padding()) {
            let raw = format!("{}{}{}", pre, s, post);
            let mbid = Mbid::parse(&raw).unwrap();
            let text = mbid.to_string();

            prop_assert_eq!(&text, &text.to_lowercase());
            prop_assert_eq!(&text, text.trim());
            prop_assert_eq!(mbid, Mbid::parse(&raw.trim().to_lowercase()).unwrap());
        }

        /// Anything without the canonical shape is rejected
        #[test]
        fn non_canonical_rejected(raw in "[0-9a-zA-Z -]{0,40}") {
            prop_assume!(!has_canonical_shape(&raw.trim().to_ascii_lowercase()));
            prop_assert!(!Mbid::is_valid(&raw));
            prop_assert!(matches!(Mbid::parse(&raw), Err(MetadataError::InvalidFormat(_))), "parse should fail");
        }

        /// Equality is symmetric across letter case
        #[test]
        fn equality_symmetric(s in canonical()) {
            let upper = Mbid::parse(&s.to_uppercase()).unwrap();
            let lower = Mbid::parse(&s.to_lowercase()).unwrap();
            prop_assert!(upper == lower);
            prop_assert!(lower == upper);
            prop_assert!(upper.equals_raw(&s));
        }
    }
}
