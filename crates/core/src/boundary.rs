//! Untyped key/value input handed over by the host.
//!
//! The host passes everything as flat string pairs (usually a query string).
//! Repeated keys resolve to their first value; key order carries no meaning.

use std::collections::HashMap;

use crate::course::ModuleIndex;

// ---------------------------------------------------------------------------
// Recognised keys
// ---------------------------------------------------------------------------

/// Host user id.
pub const KEY_USER_ID: &str = "userid";
/// Host user display name.
pub const KEY_USER_NAME: &str = "uname";
/// Whole serialized course payload, optionally percent-encoded.
pub const KEY_COURSE: &str = "course";
/// Flat course id.
pub const KEY_COURSE_ID: &str = "cid";
/// Flat course name.
pub const KEY_COURSE_NAME: &str = "cn";
/// Flat course short name.
pub const KEY_COURSE_SHORTNAME: &str = "csn";
/// Flat 1-based index of the first open module.
pub const KEY_FIRST_OPEN: &str = "fo";

/// Course-level keys that signal the flat encoding is in use.
pub const FLAT_COURSE_KEYS: &[&str] = &[
    KEY_COURSE_ID,
    KEY_COURSE_NAME,
    KEY_COURSE_SHORTNAME,
    KEY_FIRST_OPEN,
];

/// Per-module field of the flat encoding. The wire key is `m{index}{suffix}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleField {
    Exists,
    Open,
    Name,
    SectionNumber,
    SectionId,
    Url,
    WindowStart,
    WindowEnd,
    Progress,
}

impl ModuleField {
    /// Every per-module field.
    pub const ALL: [ModuleField; 9] = [
        Self::Exists,
        Self::Open,
        Self::Name,
        Self::SectionNumber,
        Self::SectionId,
        Self::Url,
        Self::WindowStart,
        Self::WindowEnd,
        Self::Progress,
    ];

    /// Key suffix after the `m{index}` prefix.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Exists => "e",
            Self::Open => "o",
            Self::Name => "n",
            Self::SectionNumber => "s",
            Self::SectionId => "i",
            Self::Url => "u",
            Self::WindowStart => "ts",
            Self::WindowEnd => "te",
            Self::Progress => "p",
        }
    }

    /// Full wire key for this field of module `index`, e.g. `m3ts`.
    pub fn key(self, index: ModuleIndex) -> String {
        format!("m{index}{}", self.suffix())
    }
}

/// Flag value meaning "yes" in the flat encoding.
pub const FLAG_TRUE: &str = "1";

// ---------------------------------------------------------------------------
// BoundaryInput
// ---------------------------------------------------------------------------

/// Read-only key/value set supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryInput {
    values: HashMap<String, String>,
}

impl BoundaryInput {
    /// Build from key/value pairs. The first occurrence of a key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = HashMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { values }
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether `key` is present (even with an empty value).
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Value of one per-module field.
    pub fn module_field(&self, index: ModuleIndex, field: ModuleField) -> Option<&str> {
        self.get(&field.key(index))
    }

    /// The whole-payload `course` value. An empty value counts as absent.
    pub fn course_param(&self) -> Option<&str> {
        self.get(KEY_COURSE).filter(|v| !v.is_empty())
    }

    /// Whether the input carries any course data in either encoding.
    pub fn has_course_data(&self) -> bool {
        self.course_param().is_some()
            || FLAT_COURSE_KEYS.iter().any(|k| self.contains(k))
            || ModuleIndex::all().any(|index| {
                ModuleField::ALL
                    .iter()
                    .any(|field| self.contains(&field.key(index)))
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BoundaryInput {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}
