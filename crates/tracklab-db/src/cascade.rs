//! Status-cascade engine.
//!
//! Derived statuses flow strictly upward: a work log can start its activity,
//! and an activity change can re-derive its project's status from the full
//! set of sibling activities. Everything here takes an open transaction —
//! the caller commits the cascade together with the mutation that caused it.

use rusqlite::{OptionalExtension, Transaction};
use tracklab_core::types::{ActivityStatus, ProjectStatus};

/// React to a work log landing against `activity_id`: first log against a
/// Not Started activity moves it to In Progress and re-derives the parent
/// project. A vanished activity is a no-op — the log insert must not fail
/// because the activity was deleted underneath it.
pub(crate) fn on_work_logged(
    tx: &Transaction,
    activity_id: i64,
    auto_complete_projects: bool,
) -> rusqlite::Result<()> {
    let row: Option<(i64, String)> = tx
        .query_row(
            "SELECT project_id, status FROM activities WHERE id = ?1",
            [activity_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;

    let Some((project_id, status)) = row else {
        tracing::warn!("work log references missing activity {activity_id}; skipping cascade");
        return Ok(());
    };

    if ActivityStatus::parse(&status) == Some(ActivityStatus::NotStarted) {
        tx.execute(
            "UPDATE activities SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            rusqlite::params![ActivityStatus::InProgress.as_str(), activity_id],
        )?;
        tracing::debug!("activity {activity_id} auto-started by first work log");
        recompute_project_status(tx, project_id, auto_complete_projects)?;
    }
    Ok(())
}

/// Re-derive a project's status from its child activities.
///
/// Precedence:
/// 1. no children → unchanged
/// 2. administrative status (Complete / On Hold / Archived) → unchanged
/// 3. all children Complete and auto-complete enabled → Complete
/// 4. any child In Progress or Complete → Active
/// 5. all children Not Started → unchanged
pub(crate) fn recompute_project_status(
    tx: &Transaction,
    project_id: i64,
    auto_complete_projects: bool,
) -> rusqlite::Result<()> {
    let current: Option<String> = tx
        .query_row("SELECT status FROM projects WHERE id = ?1", [project_id], |r| r.get(0))
        .optional()?;

    let Some(current) = current else {
        tracing::warn!("cascade target project {project_id} no longer exists; skipping");
        return Ok(());
    };
    let Some(current) = ProjectStatus::parse(&current) else {
        tracing::warn!("project {project_id} has unknown status {current:?}; skipping cascade");
        return Ok(());
    };
    if current.is_administrative() {
        return Ok(());
    }

    let mut stmt = tx.prepare("SELECT status FROM activities WHERE project_id = ?1")?;
    let statuses: Vec<ActivityStatus> = stmt
        .query_map([project_id], |r| r.get::<_, String>(0))?
        .filter_map(|r| r.ok())
        .filter_map(|s| ActivityStatus::parse(&s))
        .collect();
    if statuses.is_empty() {
        return Ok(());
    }

    let all_complete = statuses.iter().all(|s| *s == ActivityStatus::Complete);
    let any_started = statuses
        .iter()
        .any(|s| matches!(s, ActivityStatus::InProgress | ActivityStatus::Complete));

    let next = if all_complete && auto_complete_projects {
        Some(ProjectStatus::Complete)
    } else if any_started {
        Some(ProjectStatus::Active)
    } else {
        None
    };

    if let Some(next) = next
        && next != current
    {
        tx.execute(
            "UPDATE projects SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            rusqlite::params![next.as_str(), project_id],
        )?;
        tracing::info!(
            "project {project_id} status {} → {} (cascade)",
            current.as_str(),
            next.as_str()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::store::Database;
    use tracklab_core::error::TrackLabError;
    use tracklab_core::types::{Activity, ActivityStatus, NewWorkLog, Plan, Project, ProjectStatus};

    fn seed(db: &Database) -> (Plan, Project, Activity) {
        let plan = db.create_plan("Sprint 12", None, "2026-02-16", "2026-02-27").unwrap();
        let project = db.create_project(plan.id, "Genome Assembly", None, None, None).unwrap();
        let activity = db.create_activity(project.id, "QC raw reads", None, 4.0).unwrap();
        (plan, project, activity)
    }

    fn log_against(db: &Database, plan: i64, project: i64, activity: Option<i64>) {
        db.insert_work_log(
            &NewWorkLog {
                plan_id: plan,
                project_id: project,
                activity_id: activity,
                comment: "worked".into(),
                duration_minutes: 60,
                timestamp: None,
            },
            false,
        )
        .unwrap();
    }

    #[test]
    fn test_first_log_auto_starts_activity_and_project() {
        let db = Database::open_in_memory().unwrap();
        let (plan, project, activity) = seed(&db);
        assert_eq!(activity.status, ActivityStatus::NotStarted);
        assert_eq!(project.status, ProjectStatus::NotStarted);

        log_against(&db, plan.id, project.id, Some(activity.id));

        let activity = db.get_activity(activity.id).unwrap().unwrap();
        let project = db.get_project(project.id).unwrap().unwrap();
        assert_eq!(activity.status, ActivityStatus::InProgress);
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn test_second_log_leaves_statuses_alone() {
        let db = Database::open_in_memory().unwrap();
        let (plan, project, activity) = seed(&db);
        log_against(&db, plan.id, project.id, Some(activity.id));
        log_against(&db, plan.id, project.id, Some(activity.id));

        let activity = db.get_activity(activity.id).unwrap().unwrap();
        assert_eq!(activity.status, ActivityStatus::InProgress);
    }

    #[test]
    fn test_log_without_activity_skips_cascade() {
        let db = Database::open_in_memory().unwrap();
        let (plan, project, _) = seed(&db);
        log_against(&db, plan.id, project.id, None);
        let project = db.get_project(project.id).unwrap().unwrap();
        assert_eq!(project.status, ProjectStatus::NotStarted);
    }

    #[test]
    fn test_log_against_deleted_activity_still_succeeds() {
        let db = Database::open_in_memory().unwrap();
        let (plan, project, activity) = seed(&db);
        {
            let conn = db.conn.lock().unwrap();
            conn.execute("DELETE FROM activities WHERE id = ?1", [activity.id]).unwrap();
        }
        // the cascade becomes a no-op but the write itself must go through
        db.insert_work_log(
            &NewWorkLog {
                plan_id: plan.id,
                project_id: project.id,
                activity_id: Some(activity.id),
                comment: "orphaned".into(),
                duration_minutes: 30,
                timestamp: None,
            },
            false,
        )
        .unwrap();
        assert_eq!(db.list_work_logs(None, None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_all_complete_without_auto_complete_policy() {
        let db = Database::open_in_memory().unwrap();
        let (_, project, a1) = seed(&db);
        let a2 = db.create_activity(project.id, "Trim adapters", None, 2.0).unwrap();

        db.update_activity_status(a1.id, ActivityStatus::Complete, false).unwrap();
        db.update_activity_status(a2.id, ActivityStatus::Complete, false).unwrap();

        // work clearly happened, but the project stays out of Complete
        let project = db.get_project(project.id).unwrap().unwrap();
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn test_all_complete_with_auto_complete_policy() {
        let db = Database::open_in_memory().unwrap();
        let (_, project, a1) = seed(&db);
        let a2 = db.create_activity(project.id, "Trim adapters", None, 2.0).unwrap();

        db.update_activity_status(a1.id, ActivityStatus::Complete, true).unwrap();
        let mid = db.get_project(project.id).unwrap().unwrap();
        assert_eq!(mid.status, ProjectStatus::Active);

        db.update_activity_status(a2.id, ActivityStatus::Complete, true).unwrap();
        let done = db.get_project(project.id).unwrap().unwrap();
        assert_eq!(done.status, ProjectStatus::Complete);
    }

    #[test]
    fn test_administrative_status_wins_over_cascade() {
        let db = Database::open_in_memory().unwrap();
        let (plan, project, activity) = seed(&db);
        for admin in [ProjectStatus::OnHold, ProjectStatus::Archived] {
            db.set_project_status(project.id, admin).unwrap();
            log_against(&db, plan.id, project.id, Some(activity.id));
            assert_eq!(db.get_project(project.id).unwrap().unwrap().status, admin);
            // reset for the next round
            db.update_activity_status(activity.id, ActivityStatus::NotStarted, false).unwrap();
        }
    }

    #[test]
    fn test_manually_completed_project_not_reopened() {
        let db = Database::open_in_memory().unwrap();
        let (plan, project, activity) = seed(&db);
        db.set_project_status(project.id, ProjectStatus::Complete).unwrap();

        log_against(&db, plan.id, project.id, Some(activity.id));

        // the activity still auto-starts; the completed project is untouched
        assert_eq!(
            db.get_activity(activity.id).unwrap().unwrap().status,
            ActivityStatus::InProgress
        );
        assert_eq!(
            db.get_project(project.id).unwrap().unwrap().status,
            ProjectStatus::Complete
        );
    }

    #[test]
    fn test_explicit_edit_on_missing_activity_errors() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let err = db.update_activity_status(999, ActivityStatus::Complete, false).unwrap_err();
        assert!(matches!(err, TrackLabError::NotFound { .. }));
    }
}
