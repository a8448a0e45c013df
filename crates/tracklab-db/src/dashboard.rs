//! Dashboard aggregation — the single payload the frontend polls.

use chrono::NaiveDate;
use serde::Serialize;

use tracklab_core::error::Result;
use tracklab_core::types::{ActivityStatus, DailySummary, Project, ProjectStatus};

use crate::store::{Database, db_err};

/// Complete dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardPayload {
    pub active_plan: Option<PlanOverview>,
    pub projects: Vec<ProjectSummary>,
    pub sprint_activities: Vec<SprintActivityView>,
    pub today_summary: TodaySummary,
    pub daily_summary: Option<DailySummary>,
}

#[derive(Debug, Serialize)]
pub struct PlanOverview {
    pub id: i64,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub days_remaining: i64,
    pub sprint_activity_count: usize,
    /// Percent of the plan's sprint activities whose activity is Complete.
    pub overall_completion: f64,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub activities_count: usize,
    pub completed_count: usize,
    pub completion_percent: f64,
    pub hours_logged: f64,
    pub hours_estimated: f64,
}

#[derive(Debug, Serialize)]
pub struct SprintActivityView {
    pub id: i64,
    pub plan_id: i64,
    pub activity_id: i64,
    pub notes: Option<String>,
    pub activity_name: String,
    pub activity_status: ActivityStatus,
    pub project_id: i64,
    pub project_name: String,
}

#[derive(Debug, Serialize)]
pub struct TodaySummary {
    pub date: String,
    pub total_hours_logged: f64,
    pub activities_logged: usize,
    pub projects_worked_on: Vec<String>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn days_remaining(end_date: &str, today: &str) -> i64 {
    let (Ok(end), Ok(now)) = (
        NaiveDate::parse_from_str(end_date, "%Y-%m-%d"),
        NaiveDate::parse_from_str(today, "%Y-%m-%d"),
    ) else {
        return 0;
    };
    (end - now).num_days().max(0)
}

impl Database {
    /// Build the dashboard payload for `today` (`YYYY-MM-DD`).
    pub fn dashboard(&self, today: &str) -> Result<DashboardPayload> {
        let active_plan = self.active_plan()?;

        let (active_plan, sprint_activities) = match active_plan {
            Some(plan) => {
                let views = self.sprint_activity_views(plan.id)?;
                let total = views.len();
                let done = views
                    .iter()
                    .filter(|v| v.activity_status == ActivityStatus::Complete)
                    .count();
                let completion = if total > 0 {
                    round1(done as f64 / total as f64 * 100.0)
                } else {
                    0.0
                };
                let overview = PlanOverview {
                    id: plan.id,
                    name: plan.name,
                    start_date: plan.start_date.clone(),
                    end_date: plan.end_date.clone(),
                    days_remaining: days_remaining(&plan.end_date, today),
                    sprint_activity_count: total,
                    overall_completion: completion,
                };
                (Some(overview), views)
            }
            None => (None, Vec::new()),
        };

        let mut projects = Vec::new();
        for project in self.list_projects(Some(ProjectStatus::Active))? {
            let activities = self.list_activities(project.id)?;
            let total = activities.len();
            let completed = activities
                .iter()
                .filter(|a| a.status == ActivityStatus::Complete)
                .count();
            let hours_estimated: f64 = activities.iter().map(|a| a.estimated_hours).sum();
            let hours_logged = self.logged_minutes_for_project(project.id)? as f64 / 60.0;
            projects.push(ProjectSummary {
                activities_count: total,
                completed_count: completed,
                completion_percent: if total > 0 {
                    round1(completed as f64 / total as f64 * 100.0)
                } else {
                    0.0
                },
                hours_logged: round2(hours_logged),
                hours_estimated: round2(hours_estimated),
                project,
            });
        }

        let today_logs = self.list_work_logs(Some(today), None, None)?;
        let total_minutes: i64 = today_logs.iter().map(|l| l.duration_minutes).sum();
        let mut projects_worked_on: Vec<String> =
            today_logs.iter().filter_map(|l| l.project_name.clone()).collect();
        projects_worked_on.sort();
        projects_worked_on.dedup();

        let today_summary = TodaySummary {
            date: today.to_string(),
            total_hours_logged: round2(total_minutes as f64 / 60.0),
            activities_logged: today_logs.len(),
            projects_worked_on,
        };

        let daily_summary = self.get_daily_summary(today)?;

        Ok(DashboardPayload {
            active_plan,
            projects,
            sprint_activities,
            today_summary,
            daily_summary,
        })
    }

    fn sprint_activity_views(&self, plan_id: i64) -> Result<Vec<SprintActivityView>> {
        let conn = self.conn.lock().map_err(|e| {
            tracklab_core::error::TrackLabError::Db(format!("connection lock poisoned: {e}"))
        })?;
        let mut stmt = conn
            .prepare(
                "SELECT sa.id, sa.plan_id, sa.activity_id, sa.notes,
                        a.name, a.status, a.project_id, p.name
                 FROM sprint_activities sa
                 JOIN activities a ON a.id = sa.activity_id
                 JOIN projects p ON p.id = a.project_id
                 WHERE sa.plan_id = ?1
                 ORDER BY sa.id",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([plan_id], |row| {
                let status: String = row.get(5)?;
                Ok(SprintActivityView {
                    id: row.get(0)?,
                    plan_id: row.get(1)?,
                    activity_id: row.get(2)?,
                    notes: row.get(3)?,
                    activity_name: row.get(4)?,
                    activity_status: ActivityStatus::parse(&status)
                        .unwrap_or(ActivityStatus::NotStarted),
                    project_id: row.get(6)?,
                    project_name: row.get(7)?,
                })
            })
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracklab_core::types::NewWorkLog;

    #[test]
    fn test_dashboard_aggregation() {
        let db = Database::open_in_memory().unwrap();
        let plan = db.create_plan("Sprint 12", None, "2026-02-16", "2026-02-27").unwrap();
        let project = db.create_project(plan.id, "Genome Assembly", None, None, None).unwrap();
        let a1 = db.create_activity(project.id, "QC raw reads", None, 4.0).unwrap();
        let a2 = db.create_activity(project.id, "Trim adapters", None, 2.0).unwrap();
        db.add_sprint_activity(plan.id, a1.id, None).unwrap();
        db.add_sprint_activity(plan.id, a2.id, Some("stretch goal")).unwrap();

        db.update_activity_status(a1.id, ActivityStatus::Complete, false).unwrap();
        db.insert_work_log(
            &NewWorkLog {
                plan_id: plan.id,
                project_id: project.id,
                activity_id: Some(a2.id),
                comment: "trimming".into(),
                duration_minutes: 90,
                timestamp: Some("2026-02-24T10:30:00+00:00".into()),
            },
            false,
        )
        .unwrap();

        let dash = db.dashboard("2026-02-24").unwrap();

        let overview = dash.active_plan.unwrap();
        assert_eq!(overview.sprint_activity_count, 2);
        assert_eq!(overview.overall_completion, 50.0);
        assert_eq!(overview.days_remaining, 3);

        assert_eq!(dash.projects.len(), 1);
        let proj = &dash.projects[0];
        assert_eq!(proj.activities_count, 2);
        assert_eq!(proj.completed_count, 1);
        assert_eq!(proj.hours_estimated, 6.0);
        assert_eq!(proj.hours_logged, 1.5);

        assert_eq!(dash.today_summary.activities_logged, 1);
        assert_eq!(dash.today_summary.total_hours_logged, 1.5);
        assert_eq!(dash.today_summary.projects_worked_on, vec!["Genome Assembly"]);
        assert!(dash.daily_summary.is_none());
        assert_eq!(dash.sprint_activities.len(), 2);
    }
}
