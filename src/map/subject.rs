use serde::{Deserialize, Serialize};

use crate::map::SubjectId;

/// A named measurable attribute of base units, e.g. `POPTOT`.
///
/// Each base unit carries at most one characteristic value per subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,        // e.g. "POPTOT"
    pub display: String,     // e.g. "Total Population"
    pub short_display: String,
    pub description: String,
    pub is_displayed: bool,
    pub sort_key: u32,       // position relative to other subjects in listings
    pub format_string: String,
}

impl Subject {
    /// A displayed subject with the given name, labelled by its name.
    pub fn new(id: SubjectId, name: impl Into<String>, sort_key: u32) -> Self {
        let name = name.into();
        Self {
            id,
            display: name.clone(),
            short_display: name.clone(),
            name,
            description: String::new(),
            is_displayed: true,
            sort_key,
            format_string: String::new(),
        }
    }
}
