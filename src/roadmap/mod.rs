//! Roadmaps: named visions with dated milestones, persisted as one JSON file.

mod model;
mod store;


pub use model::{
    Milestone, MilestoneUpdate, Roadmap, format_target_date, parse_target_date,
};
pub use store::RoadmapStore;
