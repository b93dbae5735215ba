//! Implementation of the `sprintctl roadmap` commands.

use super::Workspace;
use crate::cli::{MilestoneAddArgs, MilestoneUpdateArgs, RoadmapCreateArgs, RoadmapShowArgs};
use crate::error::{Result, SprintError};
use crate::events::{Event, EventAction};
use crate::roadmap::{
    Milestone, MilestoneUpdate, Roadmap, RoadmapStore, format_target_date, parse_target_date,
};
use serde_json::json;

pub fn cmd_roadmap_create(args: RoadmapCreateArgs) -> Result<()> {
    let ws = Workspace::resolve()?;
    let roadmap = create_roadmap(&ws, &args)?;

    println!("Created roadmap {}: {}", roadmap.id, roadmap.name);
    Ok(())
}

pub fn cmd_roadmap_milestone(args: MilestoneAddArgs) -> Result<()> {
    let ws = Workspace::resolve()?;
    let milestone = add_milestone(&ws, &args)?;

    println!(
        "Added milestone '{}' to {} (target {})",
        milestone.name,
        args.roadmap_id,
        format_target_date(&milestone.target_date)
    );
    Ok(())
}

pub fn cmd_roadmap_update_milestone(args: MilestoneUpdateArgs) -> Result<()> {
    let ws = Workspace::resolve()?;
    let milestone = update_milestone(&ws, &args)?;

    println!("Updated milestone '{}' in {}", milestone.name, args.roadmap_id);
    for line in describe_milestone(&milestone) {
        println!("{}", line);
    }
    Ok(())
}

pub fn cmd_roadmap_list() -> Result<()> {
    let ws = Workspace::resolve()?;
    let roadmaps = open_store(&ws)?.list();

    if roadmaps.is_empty() {
        println!("No roadmaps.");
        return Ok(());
    }

    for roadmap in &roadmaps {
        println!(
            "  {:<6} {} ({} milestone(s))",
            roadmap.id,
            roadmap.name,
            roadmap.milestones.len()
        );
    }
    Ok(())
}

pub fn cmd_roadmap_show(args: RoadmapShowArgs) -> Result<()> {
    let ws = Workspace::resolve()?;
    let roadmap = open_store(&ws)?.get(&args.roadmap_id)?;

    for line in describe_roadmap(&roadmap) {
        println!("{}", line);
    }
    Ok(())
}

fn open_store(ws: &Workspace) -> Result<RoadmapStore> {
    RoadmapStore::open(ws.config.roadmap_path(&ws.ctx.state_dir))
}

fn create_roadmap(ws: &Workspace, args: &RoadmapCreateArgs) -> Result<Roadmap> {
    require_name("roadmap", &args.name)?;
    let roadmap = open_store(ws)?.create_roadmap(&args.name, &args.vision)?;

    ws.events.append(&Event::new(EventAction::RoadmapCreate).with_details(json!({
        "roadmap": roadmap.id,
        "name": roadmap.name,
    })))?;

    Ok(roadmap)
}

fn add_milestone(ws: &Workspace, args: &MilestoneAddArgs) -> Result<Milestone> {
    let roadmap_id = args.roadmap_id.as_str();
    require_name("milestone", &args.name)?;
    let target_date = parse_target_date(&args.target_date)?;
    let milestone = open_store(ws)?.add_milestone(
        roadmap_id,
        &args.name,
        target_date,
        non_empty(&args.epics),
        non_empty(&args.criteria),
    )?;

    ws.events.append(&Event::new(EventAction::MilestoneAdd).with_details(json!({
        "roadmap": roadmap_id,
        "milestone": milestone.name,
        "target_date": format_target_date(&milestone.target_date),
    })))?;

    Ok(milestone)
}

fn update_milestone(ws: &Workspace, args: &MilestoneUpdateArgs) -> Result<Milestone> {
    let update = MilestoneUpdate {
        target_date: args
            .target_date
            .as_deref()
            .map(parse_target_date)
            .transpose()?,
        epics: args.epics.as_deref().map(non_empty),
        success_criteria: args.criteria.as_deref().map(non_empty),
    };
    if update.is_empty() {
        return Err(SprintError::UserError(
            "nothing to update: pass --target-date, --epics, or --criteria".to_string(),
        ));
    }

    let milestone = open_store(ws)?.update_milestone(&args.roadmap_id, &args.name, update)?;

    ws.events.append(&Event::new(EventAction::MilestoneUpdate).with_details(json!({
        "roadmap": args.roadmap_id,
        "milestone": milestone.name,
    })))?;

    Ok(milestone)
}

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SprintError::UserError(format!(
            "{} name cannot be empty",
            kind
        )));
    }
    Ok(())
}

/// Trimmed, non-blank values in their original order.
fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn describe_roadmap(roadmap: &Roadmap) -> Vec<String> {
    let mut lines = vec![format!("{}: {}", roadmap.id, roadmap.name)];
    if !roadmap.vision.is_empty() {
        lines.push(format!("Vision: {}", roadmap.vision));
    }
    lines.push(String::new());

    if roadmap.milestones.is_empty() {
        lines.push("No milestones.".to_string());
        return lines;
    }

    lines.push(format!("Milestones ({}):", roadmap.milestones.len()));
    for milestone in &roadmap.milestones {
        lines.extend(describe_milestone(milestone));
    }
    lines
}

fn describe_milestone(milestone: &Milestone) -> Vec<String> {
    let mut lines = vec![
        format!("  {}", milestone.name),
        format!("    Target:   {}", format_target_date(&milestone.target_date)),
    ];
    if !milestone.epics.is_empty() {
        lines.push(format!("    Epics:    {}", milestone.epics.join(", ")));
    }
    for criterion in &milestone.success_criteria {
        lines.push(format!("    Criteria: {}", criterion));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_workspace;
    use crate::context::WorkspaceContext;
    use crate::exit_codes;
    use tempfile::TempDir;

    fn workspace(temp_dir: &TempDir) -> Workspace {
        let ctx = WorkspaceContext::at(temp_dir.path());
        init_workspace(&ctx).unwrap();
        Workspace::open(ctx).unwrap()
    }

    fn milestone_args(roadmap_id: &str, name: &str, date: &str) -> MilestoneAddArgs {
        MilestoneAddArgs {
            roadmap_id: roadmap_id.to_string(),
            name: name.to_string(),
            target_date: date.to_string(),
            epics: vec!["EPIC-1".to_string(), " ".to_string()],
            criteria: vec!["ships".to_string()],
        }
    }

    #[test]
    fn roadmap_lifecycle_logs_events() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        let roadmap = create_roadmap(
            &ws,
            &RoadmapCreateArgs {
                name: "Platform".to_string(),
                vision: "One API".to_string(),
            },
        )
        .unwrap();
        let args = milestone_args(&roadmap.id, "Beta", "2025-06-30");
        let added = add_milestone(&ws, &args).unwrap();
        assert_eq!(added.epics, vec!["EPIC-1"]);

        let updated = update_milestone(
            &ws,
            &MilestoneUpdateArgs {
                roadmap_id: roadmap.id.clone(),
                name: "Beta".to_string(),
                target_date: Some("2025-07-15T09:30:00Z".to_string()),
                epics: None,
                criteria: None,
            },
        )
        .unwrap();
        assert_eq!(format_target_date(&updated.target_date), "2025-07-15T09:30:00Z");
        assert_eq!(updated.success_criteria, vec!["ships"]);

        let stored = open_store(&ws).unwrap().get(&roadmap.id).unwrap();
        assert_eq!(stored.milestones, vec![updated]);

        let actions: Vec<EventAction> = ws
            .events
            .read_all()
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                EventAction::Init,
                EventAction::RoadmapCreate,
                EventAction::MilestoneAdd,
                EventAction::MilestoneUpdate,
            ]
        );
    }

    #[test]
    fn milestone_for_unknown_roadmap_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        let args = milestone_args("RM-4", "Beta", "2025-06-30");
        let err = add_milestone(&ws, &args).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn invalid_target_date_is_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);
        let roadmap = open_store(&ws).unwrap().create_roadmap("P", "").unwrap();

        let args = milestone_args(&roadmap.id, "Beta", "someday");
        let err = add_milestone(&ws, &args).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(open_store(&ws).unwrap().get(&roadmap.id).unwrap().milestones.is_empty());
    }

    #[test]
    fn blank_names_rejected_before_store() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        let err = create_roadmap(
            &ws,
            &RoadmapCreateArgs {
                name: "  ".to_string(),
                vision: String::new(),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "roadmap name cannot be empty");
        assert!(open_store(&ws).unwrap().list().is_empty());

        let roadmap = open_store(&ws).unwrap().create_roadmap("P", "").unwrap();
        let err = add_milestone(&ws, &milestone_args(&roadmap.id, "", "2025-06-30")).unwrap_err();
        assert_eq!(err.to_string(), "milestone name cannot be empty");
    }

    #[test]
    fn empty_update_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        let err = update_milestone(
            &ws,
            &MilestoneUpdateArgs {
                roadmap_id: "RM-1".to_string(),
                name: "Beta".to_string(),
                target_date: None,
                epics: None,
                criteria: None,
            },
        )
        .unwrap_err();

        assert!(err.to_string().contains("nothing to update"));
    }

    #[test]
    fn describe_roadmap_lines() {
        let roadmap = Roadmap {
            id: "RM-1".to_string(),
            name: "Platform".to_string(),
            vision: String::new(),
            milestones: vec![Milestone {
                name: "Beta".to_string(),
                target_date: parse_target_date("2025-06-30").unwrap(),
                epics: vec!["EPIC-1".to_string(), "EPIC-2".to_string()],
                success_criteria: vec!["ships".to_string()],
            }],
        };

        let lines = describe_roadmap(&roadmap);

        assert_eq!(lines[0], "RM-1: Platform");
        assert!(lines.contains(&"    Target:   2025-06-30T00:00:00Z".to_string()));
        assert!(lines.contains(&"    Epics:    EPIC-1, EPIC-2".to_string()));
    }
}
