use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Fixed output columns, in order.
pub const COLUMNS: [&str; 5] = ["Name", "Mobile", "Country", "Type", "Email"];

/// Type value that moves a participant into the separate "Nothing of the above" section.
pub const SPECIAL_TYPE: &str = "nothing of the above";

/// One row of the event roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Mobile")]
    pub mobile: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Type")]
    pub participant_type: String,
    #[serde(rename = "Email")]
    pub email: String,
}

impl ParticipantRecord {
    pub fn new(
        name: impl Into<String>,
        mobile: impl Into<String>,
        country: impl Into<String>,
        participant_type: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mobile: mobile.into(),
            country: country.into(),
            participant_type: participant_type.into(),
            email: email.into(),
        }
    }

    /// Cells in `COLUMNS` order.
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.name,
            &self.mobile,
            &self.country,
            &self.participant_type,
            &self.email,
        ]
    }

    pub fn group(&self) -> RosterGroup {
        if self.participant_type.trim().to_lowercase() == SPECIAL_TYPE {
            RosterGroup::Special
        } else {
            RosterGroup::Regular
        }
    }
}

/// Partition of the roster that decides page placement in the participant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RosterGroup {
    Regular,
    Special,
}

/// Splits the roster into regular and special participants, keeping input order in each.
pub fn partition(records: &[ParticipantRecord]) -> (Vec<&ParticipantRecord>, Vec<&ParticipantRecord>) {
    records
        .iter()
        .partition(|record| record.group() == RosterGroup::Regular)
}

/// Removes repeated `(name, email)` pairs, keeping the first occurrence.
/// Returns the remaining records and how many were dropped.
pub fn deduplicate(records: Vec<ParticipantRecord>) -> (Vec<ParticipantRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::new();
    let unique: Vec<ParticipantRecord> = records
        .into_iter()
        .filter(|record| seen.insert((record.name.clone(), record.email.clone())))
        .collect();
    let removed = before - unique.len();
    (unique, removed)
}

/// Names of participants registered as tutors, unique and joined with ", ".
pub fn default_tutors(records: &[ParticipantRecord]) -> String {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| record.participant_type.trim().to_uppercase() == "TUTOR")
        .map(|record| record.name.as_str())
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Case- and whitespace-insensitive set of names that have paid.
#[derive(Debug, Clone, Default)]
pub struct PaidSet {
    names: HashSet<String>,
}

impl PaidSet {
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| Self::normalize(name.as_ref()))
                .collect(),
        }
    }

    /// Everyone on the roster except the listed unpaid names.
    pub fn from_unpaid<S: AsRef<str>>(records: &[ParticipantRecord], unpaid: &[S]) -> Self {
        let unpaid = Self::from_names(unpaid);
        Self::from_names(
            records
                .iter()
                .map(|record| record.name.as_str())
                .filter(|name| !unpaid.contains(name)),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&Self::normalize(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
