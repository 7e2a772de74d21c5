use crate::store::RecordMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meridian {
    Am,
    Pm,
}

impl Meridian {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Am => "am",
            Self::Pm => "pm",
        }
    }
}

/// One entry's identity: a minute-resolution timestamp in 12-hour civil form.
///
/// The derived order is lexicographic over the field sequence below. Month
/// sorts first, so the order is not chronological across year boundaries;
/// callers depend on that exact iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub month: u32,
    pub day: u32,
    pub year: i32,
    pub meridian: Meridian,
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub glucose: i64,
    pub carbs: i64,
    pub insulin: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    // Persisted under the `password` field name, in plaintext.
    #[serde(rename = "password")]
    pub secret: String,
    #[serde(rename = "data", default)]
    pub records: RecordMapping,
}

pub type Document = BTreeMap<String, UserAccount>;
