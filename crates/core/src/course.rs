//! Canonical course model decoded from the host boundary.
//!
//! A course always has exactly [`MODULE_COUNT`] module slots. A slot holds
//! `None` when the host did not report that module. The same types serialize
//! to the whole-payload JSON form the host sends in the `course` parameter, so
//! encoding a [`CoursePayload`] and decoding it again reproduces it.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::lenient;
use crate::types::EpochSeconds;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of module slots in every course.
pub const MODULE_COUNT: usize = 8;

/// Prefix of module keys in the whole-payload JSON form (`modulo1`..`modulo8`).
pub const MODULE_KEY_PREFIX: &str = "modulo";

/// Display name used until the host identifies the learner.
pub const DEFAULT_USER_NAME: &str = "Nome do Usuário";

// ---------------------------------------------------------------------------
// ModuleIndex
// ---------------------------------------------------------------------------

/// A 1-based module slot index, always within `1..=MODULE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct ModuleIndex(u8);

impl ModuleIndex {
    /// Create an index, rejecting values outside `1..=8`.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if (1..=MODULE_COUNT as u8).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::Validation(format!(
                "Module index must be between 1 and {MODULE_COUNT}, got {value}"
            )))
        }
    }

    /// All slot indices in ascending order.
    pub fn all() -> impl Iterator<Item = ModuleIndex> {
        (1..=MODULE_COUNT as u8).map(ModuleIndex)
    }

    /// The 1-based index value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position in a fixed-size slot array.
    pub fn slot(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Key of this module in the whole-payload JSON form, e.g. `modulo3`.
    pub fn payload_key(self) -> String {
        format!("{MODULE_KEY_PREFIX}{}", self.0)
    }

    /// Parse a `moduloN` key. Returns `None` for anything else.
    pub fn from_payload_key(key: &str) -> Option<Self> {
        key.strip_prefix(MODULE_KEY_PREFIX)
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(|n| Self::new(n).ok())
    }
}

impl From<ModuleIndex> for u8 {
    fn from(index: ModuleIndex) -> Self {
        index.0
    }
}

impl TryFrom<i64> for ModuleIndex {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| {
                CoreError::Validation(format!(
                    "Module index must be between 1 and {MODULE_COUNT}, got {value}"
                ))
            })
            .and_then(Self::new)
    }
}

impl FromStr for ModuleIndex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s.trim().parse().map_err(|_| {
            CoreError::Validation(format!("Module index must be a number, got '{s}'"))
        })?;
        Self::try_from(n)
    }
}

impl fmt::Display for ModuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Identity hint supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub name: String,
    pub is_logged_in: bool,
    pub id: Option<String>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: DEFAULT_USER_NAME.to_string(),
            is_logged_in: false,
            id: None,
        }
    }
}

impl User {
    /// Apply the host's identity hints. Either hint marks the user as logged
    /// in; each present hint replaces the corresponding field.
    pub fn hydrate(&mut self, id: Option<&str>, name: Option<&str>) {
        if id.is_none() && name.is_none() {
            return;
        }
        self.is_logged_in = true;
        if let Some(id) = id {
            self.id = Some(id.to_string());
        }
        if let Some(name) = name {
            self.name = name.to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// ModuleInfo
// ---------------------------------------------------------------------------

/// Canonical state of one module slot as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawModuleInfo")]
pub struct ModuleInfo {
    pub exists: bool,
    #[serde(rename = "sectionnum")]
    pub section_number: Option<i64>,
    #[serde(rename = "sectionid")]
    pub section_id: Option<i64>,
    pub name: Option<String>,
    /// Explicit host verdict; `None` defers to the other signals.
    pub open: Option<bool>,
    pub available: Option<bool>,
    #[serde(rename = "availableinfo")]
    pub available_info: Option<String>,
    pub url: Option<String>,
    /// Inclusive start of the access window.
    pub tstart: Option<EpochSeconds>,
    /// Exclusive end of the access window.
    pub tend: Option<EpochSeconds>,
    /// Host-supplied completion percentage, already clamped to `0..=100`.
    pub progress: Option<u8>,
}

impl ModuleInfo {
    /// Whether the host declared any bound of an access window.
    pub fn has_window(&self) -> bool {
        self.tstart.is_some() || self.tend.is_some()
    }

    /// Whether the host gave a reason for the module being inaccessible.
    pub fn has_unavailability_reason(&self) -> bool {
        self.available == Some(false) || !lenient::is_blank(self.available_info.as_deref())
    }

    /// The host-supplied name, if it is not blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

/// Untyped module record as found inside the whole-payload JSON.
#[derive(Debug, Default, Deserialize)]
struct RawModuleInfo {
    #[serde(default)]
    exists: Value,
    #[serde(default)]
    sectionnum: Value,
    #[serde(default)]
    sectionid: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    open: Value,
    #[serde(default)]
    available: Value,
    #[serde(default)]
    availableinfo: Value,
    #[serde(default)]
    url: Value,
    #[serde(default)]
    tstart: Value,
    #[serde(default)]
    tend: Value,
    #[serde(default)]
    progress: Value,
}

impl From<RawModuleInfo> for ModuleInfo {
    fn from(raw: RawModuleInfo) -> Self {
        Self {
            exists: lenient::value_bool(&raw.exists).unwrap_or(false),
            section_number: lenient::value_integer(&raw.sectionnum),
            section_id: lenient::value_integer(&raw.sectionid),
            name: lenient::value_string(&raw.name),
            open: lenient::value_bool(&raw.open),
            available: lenient::value_bool(&raw.available),
            available_info: lenient::value_string(&raw.availableinfo),
            url: lenient::value_string(&raw.url),
            tstart: lenient::value_epoch(&raw.tstart),
            tend: lenient::value_epoch(&raw.tend),
            progress: lenient::value_progress(&raw.progress),
        }
    }
}

// ---------------------------------------------------------------------------
// CoursePayload
// ---------------------------------------------------------------------------

/// Fixed-size array of module slots, indexed by [`ModuleIndex::slot`].
pub type ModuleSlots = [Option<ModuleInfo>; MODULE_COUNT];

/// The canonical course built from one boundary read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCoursePayload")]
pub struct CoursePayload {
    pub id: i64,
    pub name: String,
    pub shortname: String,
    #[serde(serialize_with = "serialize_slots")]
    pub modules: ModuleSlots,
    #[serde(rename = "firstopen", serialize_with = "serialize_first_open")]
    pub first_open: Option<ModuleIndex>,
}

impl CoursePayload {
    /// The module in `index`, treating `exists = false` as absent.
    pub fn module(&self, index: ModuleIndex) -> Option<&ModuleInfo> {
        self.modules[index.slot()].as_ref().filter(|m| m.exists)
    }

    /// Host-supplied progress for `index`, if any.
    pub fn host_progress(&self, index: ModuleIndex) -> Option<u8> {
        self.module(index).and_then(|m| m.progress)
    }

    /// Number of slots the host reported as existing.
    pub fn existing_count(&self) -> usize {
        self.modules.iter().flatten().filter(|m| m.exists).count()
    }

    /// Serialize to the whole-payload JSON form carried by the `course` key.
    pub fn to_course_param(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Internal(format!("Failed to encode course payload: {e}")))
    }
}

/// Untyped course record as found in the whole-payload JSON.
#[derive(Debug, Default, Deserialize)]
struct RawCoursePayload {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    shortname: Value,
    #[serde(default)]
    modules: Value,
    #[serde(default)]
    firstopen: Value,
}

impl From<RawCoursePayload> for CoursePayload {
    fn from(raw: RawCoursePayload) -> Self {
        Self {
            id: lenient::value_integer(&raw.id).unwrap_or(0),
            name: lenient::value_string(&raw.name).unwrap_or_default(),
            shortname: lenient::value_string(&raw.shortname).unwrap_or_default(),
            modules: slots_from_value(&raw.modules),
            first_open: first_open_from_value(&raw.firstopen),
        }
    }
}

/// Build the slot array from the `modules` object.
///
/// Keys other than `modulo1`..`modulo8` are skipped unread. A module value
/// that is not an object leaves its slot empty, as does a `modules` value
/// that is not an object at all.
fn slots_from_value(value: &Value) -> ModuleSlots {
    let mut modules: ModuleSlots = Default::default();
    let Value::Object(map) = value else {
        return modules;
    };

    for (key, module) in map {
        let Some(index) = ModuleIndex::from_payload_key(key) else {
            continue;
        };
        modules[index.slot()] = match module {
            Value::Object(_) => ModuleInfo::deserialize(module).ok(),
            _ => None,
        };
    }
    modules
}

/// `firstopen` is `"moduloN"` in current payloads and a bare `N` in older ones.
fn first_open_from_value(value: &Value) -> Option<ModuleIndex> {
    match value {
        Value::String(s) => ModuleIndex::from_payload_key(s).or_else(|| s.parse().ok()),
        other => lenient::value_integer(other).and_then(|n| ModuleIndex::try_from(n).ok()),
    }
}

fn serialize_slots<S: Serializer>(slots: &ModuleSlots, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(MODULE_COUNT))?;
    for index in ModuleIndex::all() {
        map.serialize_entry(&index.payload_key(), &slots[index.slot()])?;
    }
    map.end()
}

fn serialize_first_open<S: Serializer>(
    first_open: &Option<ModuleIndex>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match first_open {
        Some(index) => serializer.serialize_some(&index.payload_key()),
        None => serializer.serialize_none(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
