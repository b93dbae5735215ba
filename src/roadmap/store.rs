//! JSON-file persistence for roadmaps.
//!
//! The store file is a JSON object keyed by roadmap id:
//!
//! ```json
//! {
//!   "RM-1": {
//!     "name": "Platform",
//!     "vision": "One API for every client",
//!     "milestones": [
//!       {"name": "Beta", "target_date": "2025-06-30T00:00:00Z", "epics": [], "success_criteria": []}
//!     ]
//!   }
//! }
//! ```
//!
//! Every mutation rewrites the whole document with an atomic rename. The
//! in-memory state only changes after the write succeeds.

use super::model::{Milestone, MilestoneUpdate, Roadmap};
use crate::error::{Result, SprintError};
use crate::fs::atomic_write_file;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

static ROADMAP_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RM-(\d+)$").expect("Invalid roadmap ID regex"));

/// Roadmaps keyed by sequence number, plus the next number to allocate.
#[derive(Debug, Clone, Default)]
struct StoreState {
    roadmaps: BTreeMap<u64, Roadmap>,
    next_seq: u64,
}

/// File-backed roadmap collection.
///
/// Mutations are serialized by an internal mutex, so a store can be shared
/// between threads by reference.
#[derive(Debug)]
pub struct RoadmapStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl RoadmapStore {
    /// Open the store at `path`. A missing (or blank) file is an empty store.
    ///
    /// Identifier allocation resumes after the highest id in the file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state(&path)?;
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty roadmap and return it with its new id. Name and vision
    /// are stored exactly as given.
    pub fn create_roadmap(&self, name: &str, vision: &str) -> Result<Roadmap> {
        self.mutate(|state| {
            let seq = state.next_seq;
            let roadmap = Roadmap {
                id: format_roadmap_id(seq),
                name: name.to_string(),
                vision: vision.to_string(),
                milestones: Vec::new(),
            };
            state.roadmaps.insert(seq, roadmap.clone());
            state.next_seq = seq + 1;
            Ok(roadmap)
        })
    }

    /// Append a milestone to an existing roadmap. Names need not be unique;
    /// [`RoadmapStore::update_milestone`] addresses the first match.
    ///
    /// # Errors
    ///
    /// `RoadmapNotFound` for an unknown `roadmap_id`.
    pub fn add_milestone(
        &self,
        roadmap_id: &str,
        name: &str,
        target_date: DateTime<Utc>,
        epics: Vec<String>,
        success_criteria: Vec<String>,
    ) -> Result<Milestone> {
        self.mutate(|state| {
            let roadmap = roadmap_mut(state, roadmap_id)?;
            let milestone = Milestone {
                name: name.to_string(),
                target_date,
                epics,
                success_criteria,
            };
            roadmap.milestones.push(milestone.clone());
            Ok(milestone)
        })
    }

    /// Replace fields of the first milestone named `milestone_name`.
    ///
    /// # Errors
    ///
    /// `RoadmapNotFound` or `MilestoneNotFound` when either does not exist.
    pub fn update_milestone(
        &self,
        roadmap_id: &str,
        milestone_name: &str,
        update: MilestoneUpdate,
    ) -> Result<Milestone> {
        self.mutate(|state| {
            let roadmap = roadmap_mut(state, roadmap_id)?;
            let milestone = roadmap
                .milestones
                .iter_mut()
                .find(|m| m.name == milestone_name)
                .ok_or_else(|| SprintError::MilestoneNotFound {
                    roadmap_id: roadmap_id.to_string(),
                    milestone: milestone_name.to_string(),
                })?;
            update.apply(milestone);
            Ok(milestone.clone())
        })
    }

    pub fn get(&self, roadmap_id: &str) -> Result<Roadmap> {
        let state = self.lock();
        parse_roadmap_id(roadmap_id)
            .and_then(|seq| state.roadmaps.get(&seq))
            .cloned()
            .ok_or_else(|| SprintError::RoadmapNotFound(roadmap_id.to_string()))
    }

    /// All roadmaps in creation order.
    pub fn list(&self) -> Vec<Roadmap> {
        self.lock().roadmaps.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // State is only replaced after a successful write, so a panic while
        // holding the lock cannot leave it half-updated.
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Apply `change` to a copy of the state, persist the copy, then adopt it.
    fn mutate<T>(&self, change: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut state = self.lock();
        let mut next = state.clone();
        let value = change(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(value)
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let document: BTreeMap<&str, &Roadmap> = state
            .roadmaps
            .values()
            .map(|r| (r.id.as_str(), r))
            .collect();
        let json = serde_json::to_string_pretty(&document).map_err(|e| {
            SprintError::UserError(format!("failed to serialize roadmaps: {}", e))
        })?;

        atomic_write_file(&self.path, &format!("{}\n", json))
    }
}

fn roadmap_mut<'s>(state: &'s mut StoreState, roadmap_id: &str) -> Result<&'s mut Roadmap> {
    parse_roadmap_id(roadmap_id)
        .and_then(|seq| state.roadmaps.get_mut(&seq))
        .ok_or_else(|| SprintError::RoadmapNotFound(roadmap_id.to_string()))
}

fn format_roadmap_id(seq: u64) -> String {
    format!("RM-{}", seq)
}

fn parse_roadmap_id(id: &str) -> Option<u64> {
    ROADMAP_ID_REGEX
        .captures(id)
        .and_then(|caps| caps[1].parse().ok())
}

fn load_state(path: &Path) -> Result<StoreState> {
    let mut state = StoreState {
        roadmaps: BTreeMap::new(),
        next_seq: 1,
    };
    if !path.exists() {
        return Ok(state);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        SprintError::UserError(format!(
            "failed to read roadmap store '{}': {}",
            path.display(),
            e
        ))
    })?;
    if content.trim().is_empty() {
        return Ok(state);
    }

    let document: BTreeMap<String, Roadmap> = serde_json::from_str(&content).map_err(|e| {
        SprintError::UserError(format!(
            "failed to parse roadmap store '{}': {}",
            path.display(),
            e
        ))
    })?;

    for (id, mut roadmap) in document {
        let seq = parse_roadmap_id(&id).ok_or_else(|| {
            SprintError::UserError(format!(
                "invalid roadmap id '{}' in '{}' (expected RM-<number>)",
                id,
                path.display()
            ))
        })?;
        // RM-01 and RM-1 would share a sequence number.
        if format_roadmap_id(seq) != id {
            return Err(SprintError::UserError(format!(
                "non-canonical roadmap id '{}' in '{}'",
                id,
                path.display()
            )));
        }
        roadmap.id = id;
        state.next_seq = state.next_seq.max(seq + 1);
        state.roadmaps.insert(seq, roadmap);
    }

    Ok(state)
}
