//! Roadmap and milestone records.

use crate::error::{Result, SprintError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A long-lived plan grouping milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    /// `RM-<n>`; the key in the persisted document, not part of the record.
    #[serde(skip)]
    pub id: String,

    pub name: String,

    pub vision: String,

    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,

    #[serde(with = "canonical_time")]
    pub target_date: DateTime<Utc>,

    /// Opaque epic identifiers, in order.
    #[serde(default)]
    pub epics: Vec<String>,

    #[serde(default)]
    pub success_criteria: Vec<String>,
}

/// Replacement values for an existing milestone. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestoneUpdate {
    pub target_date: Option<DateTime<Utc>>,
    pub epics: Option<Vec<String>>,
    pub success_criteria: Option<Vec<String>>,
}

impl MilestoneUpdate {
    pub fn is_empty(&self) -> bool {
        self.target_date.is_none() && self.epics.is_none() && self.success_criteria.is_none()
    }

    pub(crate) fn apply(self, milestone: &mut Milestone) {
        if let Some(target_date) = self.target_date {
            milestone.target_date = target_date;
        }
        if let Some(epics) = self.epics {
            milestone.epics = epics;
        }
        if let Some(criteria) = self.success_criteria {
            milestone.success_criteria = criteria;
        }
    }
}

/// Canonical text form of a target date: RFC 3339 in UTC with a `Z` suffix,
/// sub-second digits only when non-zero.
pub fn format_target_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

/// Parse a user-supplied target date.
///
/// Accepts a full RFC 3339 timestamp (any offset, normalized to UTC) or a
/// bare `YYYY-MM-DD` date, taken as midnight UTC.
pub fn parse_target_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            SprintError::UserError(format!(
                "invalid target date '{}'\n\
                 Expected an RFC 3339 timestamp (2025-06-30T12:00:00Z) or a date (2025-06-30).",
                input
            ))
        })
}

mod canonical_time {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_target_date(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
