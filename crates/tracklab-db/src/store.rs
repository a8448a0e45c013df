//! SQLite database — schema, migrations, and entity CRUD.
//!
//! A single `Mutex<Connection>` serves both the request path and the
//! scheduler thread; every multi-statement mutation (work-log insert plus
//! cascade) runs inside one transaction so a concurrent cascade on a sibling
//! activity can never observe a half-applied state.

use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Mutex;

use tracklab_core::error::{Result, TrackLabError};
use tracklab_core::types::{
    Activity, ActivityStatus, AnalysisReport, DailySummary, MAX_LOG_MINUTES, MIN_LOG_MINUTES,
    NewWorkLog, Plan, PlanStatus, Project, ProjectStatus, SprintActivity, WorkLog,
};

use crate::cascade;

pub(crate) fn db_err(e: rusqlite::Error) -> TrackLabError {
    TrackLabError::Db(e.to_string())
}

/// TrackLab database handle.
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        Self::from_connection(conn)
    }

    /// In-memory database (tests, throwaway runs).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Foreign keys are declared in the schema for documentation but are not
        // PRAGMA-enforced (see DESIGN.md): the missing-entity cascade path is a
        // real runtime case (warn + no-op, write still succeeds). Set this
        // explicitly so the behavior does not depend on the bundled SQLite's
        // compile-time foreign_keys default.
        conn.execute_batch("PRAGMA foreign_keys=OFF;").ok();
        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TrackLabError::Db(format!("connection lock poisoned: {e}")))
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Active',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                goal TEXT,
                status TEXT NOT NULL DEFAULT 'Not Started',
                color_tag TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (plan_id, name)
            );

            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'Not Started',
                estimated_hours REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS sprint_activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
                activity_id INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
                notes TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (plan_id, activity_id)
            );

            CREATE TABLE IF NOT EXISTS work_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                activity_id INTEGER REFERENCES activities(id) ON DELETE SET NULL,
                comment TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_work_logs_timestamp ON work_logs(timestamp);
            CREATE INDEX IF NOT EXISTS idx_work_logs_activity ON work_logs(activity_id);

            CREATE TABLE IF NOT EXISTS daily_summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER REFERENCES plans(id) ON DELETE SET NULL,
                date TEXT NOT NULL UNIQUE,
                summary_text TEXT NOT NULL DEFAULT '',
                blockers TEXT NOT NULL DEFAULT '[]',
                highlights TEXT NOT NULL DEFAULT '[]',
                suggestions TEXT NOT NULL DEFAULT '[]',
                patterns TEXT NOT NULL DEFAULT '[]',
                generated_at TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )
        .map_err(db_err)?;
        Ok(())
    }

    // ── Plans ───────────────────────────────────────────────────────────────

    pub fn create_plan(
        &self,
        name: &str,
        description: Option<&str>,
        start_date: &str,
        end_date: &str,
    ) -> Result<Plan> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO plans (name, description, start_date, end_date) VALUES (?1, ?2, ?3, ?4)",
                params![name, description, start_date, end_date],
            )
            .map_err(db_err)?;
            conn.last_insert_rowid()
        };
        self.get_plan(id)?.ok_or(TrackLabError::NotFound { entity: "plan", id })
    }

    pub fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        let conn = self.lock()?;
        conn.query_row("SELECT * FROM plans WHERE id = ?1", [id], map_plan)
            .optional()
            .map_err(db_err)
    }

    /// The single Active plan, if any.
    pub fn active_plan(&self) -> Result<Option<Plan>> {
        let conn = self.lock()?;
        conn.query_row("SELECT * FROM plans WHERE status = 'Active' LIMIT 1", [], map_plan)
            .optional()
            .map_err(db_err)
    }

    pub fn list_plans(&self, status: Option<PlanStatus>) -> Result<Vec<Plan>> {
        let conn = self.lock()?;
        let mut out = Vec::new();
        match status {
            Some(s) => {
                let mut stmt = conn
                    .prepare("SELECT * FROM plans WHERE status = ?1 ORDER BY created_at DESC")
                    .map_err(db_err)?;
                let rows = stmt.query_map([s.as_str()], map_plan).map_err(db_err)?;
                for row in rows {
                    out.push(row.map_err(db_err)?);
                }
            }
            None => {
                let mut stmt = conn
                    .prepare("SELECT * FROM plans ORDER BY created_at DESC")
                    .map_err(db_err)?;
                let rows = stmt.query_map([], map_plan).map_err(db_err)?;
                for row in rows {
                    out.push(row.map_err(db_err)?);
                }
            }
        }
        Ok(out)
    }

    /// Set a plan's status. Activating a plan demotes any other Active plan
    /// to Paused so the one-active-plan invariant holds.
    pub fn set_plan_status(&self, id: i64, status: PlanStatus) -> Result<Plan> {
        {
            let mut conn = self.lock()?;
            let tx = conn.transaction().map_err(db_err)?;
            if status == PlanStatus::Active {
                tx.execute(
                    "UPDATE plans SET status = 'Paused', updated_at = datetime('now')
                     WHERE status = 'Active' AND id != ?1",
                    [id],
                )
                .map_err(db_err)?;
            }
            let n = tx
                .execute(
                    "UPDATE plans SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
                    params![status.as_str(), id],
                )
                .map_err(db_err)?;
            if n == 0 {
                return Err(TrackLabError::NotFound { entity: "plan", id });
            }
            tx.commit().map_err(db_err)?;
        }
        self.get_plan(id)?.ok_or(TrackLabError::NotFound { entity: "plan", id })
    }

    // ── Projects ────────────────────────────────────────────────────────────

    pub fn create_project(
        &self,
        plan_id: i64,
        name: &str,
        description: Option<&str>,
        goal: Option<&str>,
        color_tag: Option<&str>,
    ) -> Result<Project> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO projects (plan_id, name, description, goal, color_tag)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![plan_id, name, description, goal, color_tag],
            )
            .map_err(db_err)?;
            conn.last_insert_rowid()
        };
        self.get_project(id)?.ok_or(TrackLabError::NotFound { entity: "project", id })
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.lock()?;
        conn.query_row("SELECT * FROM projects WHERE id = ?1", [id], map_project)
            .optional()
            .map_err(db_err)
    }

    pub fn list_projects(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>> {
        let conn = self.lock()?;
        let mut out = Vec::new();
        match status {
            Some(s) => {
                let mut stmt = conn
                    .prepare("SELECT * FROM projects WHERE status = ?1 ORDER BY id")
                    .map_err(db_err)?;
                let rows = stmt.query_map([s.as_str()], map_project).map_err(db_err)?;
                for row in rows {
                    out.push(row.map_err(db_err)?);
                }
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM projects ORDER BY id").map_err(db_err)?;
                let rows = stmt.query_map([], map_project).map_err(db_err)?;
                for row in rows {
                    out.push(row.map_err(db_err)?);
                }
            }
        }
        Ok(out)
    }

    /// Direct operator edit of a project's status. Does not consult the
    /// cascade: administrative states set here stay until edited again.
    pub fn set_project_status(&self, id: i64, status: ProjectStatus) -> Result<Project> {
        {
            let conn = self.lock()?;
            let n = conn
                .execute(
                    "UPDATE projects SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
                    params![status.as_str(), id],
                )
                .map_err(db_err)?;
            if n == 0 {
                return Err(TrackLabError::NotFound { entity: "project", id });
            }
        }
        self.get_project(id)?.ok_or(TrackLabError::NotFound { entity: "project", id })
    }

    // ── Activities ──────────────────────────────────────────────────────────

    pub fn create_activity(
        &self,
        project_id: i64,
        name: &str,
        description: Option<&str>,
        estimated_hours: f64,
    ) -> Result<Activity> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO activities (project_id, name, description, estimated_hours)
                 VALUES (?1, ?2, ?3, ?4)",
                params![project_id, name, description, estimated_hours],
            )
            .map_err(db_err)?;
            conn.last_insert_rowid()
        };
        self.get_activity(id)?.ok_or(TrackLabError::NotFound { entity: "activity", id })
    }

    pub fn get_activity(&self, id: i64) -> Result<Option<Activity>> {
        let conn = self.lock()?;
        conn.query_row("SELECT * FROM activities WHERE id = ?1", [id], map_activity)
            .optional()
            .map_err(db_err)
    }

    pub fn list_activities(&self, project_id: i64) -> Result<Vec<Activity>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT * FROM activities WHERE project_id = ?1 ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt.query_map([project_id], map_activity).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)?);
        }
        Ok(out)
    }

    /// Explicit activity status edit. Runs the parent-project recomputation
    /// in the same transaction as the edit.
    pub fn update_activity_status(
        &self,
        id: i64,
        status: ActivityStatus,
        auto_complete_projects: bool,
    ) -> Result<Activity> {
        {
            let mut conn = self.lock()?;
            let tx = conn.transaction().map_err(db_err)?;
            let n = tx
                .execute(
                    "UPDATE activities SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
                    params![status.as_str(), id],
                )
                .map_err(db_err)?;
            if n == 0 {
                return Err(TrackLabError::NotFound { entity: "activity", id });
            }
            let project_id: i64 = tx
                .query_row("SELECT project_id FROM activities WHERE id = ?1", [id], |r| r.get(0))
                .map_err(db_err)?;
            cascade::recompute_project_status(&tx, project_id, auto_complete_projects)
                .map_err(db_err)?;
            tx.commit().map_err(db_err)?;
        }
        self.get_activity(id)?.ok_or(TrackLabError::NotFound { entity: "activity", id })
    }

    // ── Sprint selections ───────────────────────────────────────────────────

    pub fn add_sprint_activity(
        &self,
        plan_id: i64,
        activity_id: i64,
        notes: Option<&str>,
    ) -> Result<SprintActivity> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO sprint_activities (plan_id, activity_id, notes) VALUES (?1, ?2, ?3)",
                params![plan_id, activity_id, notes],
            )
            .map_err(db_err)?;
            conn.last_insert_rowid()
        };
        let conn = self.lock()?;
        conn.query_row("SELECT * FROM sprint_activities WHERE id = ?1", [id], map_sprint_activity)
            .map_err(db_err)
    }

    pub fn remove_sprint_activity(&self, plan_id: i64, activity_id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let n = conn
            .execute(
                "DELETE FROM sprint_activities WHERE plan_id = ?1 AND activity_id = ?2",
                params![plan_id, activity_id],
            )
            .map_err(db_err)?;
        Ok(n > 0)
    }

    pub fn list_sprint_activities(&self, plan_id: i64) -> Result<Vec<SprintActivity>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT * FROM sprint_activities WHERE plan_id = ?1 ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt.query_map([plan_id], map_sprint_activity).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)?);
        }
        Ok(out)
    }

    // ── Work logs ───────────────────────────────────────────────────────────

    /// Record a work log. The insert, the first-log auto-start of the linked
    /// activity, and the parent-project recomputation commit atomically.
    pub fn insert_work_log(&self, new: &NewWorkLog, auto_complete_projects: bool) -> Result<WorkLog> {
        if !(MIN_LOG_MINUTES..=MAX_LOG_MINUTES).contains(&new.duration_minutes) {
            return Err(TrackLabError::InvalidDuration {
                got: new.duration_minutes,
                min: MIN_LOG_MINUTES,
                max: MAX_LOG_MINUTES,
            });
        }
        let timestamp = new
            .timestamp
            .clone()
            .unwrap_or_else(|| chrono::Local::now().to_rfc3339());

        let id = {
            let mut conn = self.lock()?;
            let tx = conn.transaction().map_err(db_err)?;
            tx.execute(
                "INSERT INTO work_logs (plan_id, project_id, activity_id, comment, duration_minutes, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.plan_id,
                    new.project_id,
                    new.activity_id,
                    new.comment,
                    new.duration_minutes,
                    timestamp
                ],
            )
            .map_err(db_err)?;
            let id = tx.last_insert_rowid();

            if let Some(activity_id) = new.activity_id {
                cascade::on_work_logged(&tx, activity_id, auto_complete_projects).map_err(db_err)?;
            }
            tx.commit().map_err(db_err)?;
            id
        };
        self.get_work_log(id)?.ok_or(TrackLabError::NotFound { entity: "work log", id })
    }

    pub fn get_work_log(&self, id: i64) -> Result<Option<WorkLog>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{WORK_LOG_SELECT} WHERE l.id = ?1"),
            [id],
            map_work_log,
        )
        .optional()
        .map_err(db_err)
    }

    /// Logs filtered by date (`YYYY-MM-DD` prefix match on the timestamp),
    /// project, and/or plan, in timestamp order.
    pub fn list_work_logs(
        &self,
        date: Option<&str>,
        project_id: Option<i64>,
        plan_id: Option<i64>,
    ) -> Result<Vec<WorkLog>> {
        let conn = self.lock()?;
        let mut sql = format!("{WORK_LOG_SELECT} WHERE 1=1");
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(d) = date {
            sql.push_str(&format!(" AND l.timestamp LIKE ?{}", args.len() + 1));
            args.push(Box::new(format!("{d}%")));
        }
        if let Some(p) = project_id {
            sql.push_str(&format!(" AND l.project_id = ?{}", args.len() + 1));
            args.push(Box::new(p));
        }
        if let Some(p) = plan_id {
            sql.push_str(&format!(" AND l.plan_id = ?{}", args.len() + 1));
            args.push(Box::new(p));
        }
        sql.push_str(" ORDER BY l.timestamp ASC");

        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())), map_work_log)
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)?);
        }
        Ok(out)
    }

    pub fn logged_minutes_for_activity(&self, activity_id: i64) -> Result<i64> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM work_logs WHERE activity_id = ?1",
            [activity_id],
            |r| r.get(0),
        )
        .map_err(db_err)
    }

    pub fn logged_minutes_for_project(&self, project_id: i64) -> Result<i64> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM work_logs WHERE project_id = ?1",
            [project_id],
            |r| r.get(0),
        )
        .map_err(db_err)
    }

    // ── Daily summaries ─────────────────────────────────────────────────────

    pub fn get_daily_summary(&self, date: &str) -> Result<Option<DailySummary>> {
        let conn = self.lock()?;
        conn.query_row("SELECT * FROM daily_summaries WHERE date = ?1", [date], map_daily_summary)
            .optional()
            .map_err(db_err)
    }

    /// Insert or replace the analysis for a date. A second upsert for the
    /// same date keeps the row identity and `created_at`, replacing the
    /// content and `generated_at`.
    pub fn upsert_daily_summary(
        &self,
        plan_id: Option<i64>,
        date: &str,
        report: &AnalysisReport,
    ) -> Result<DailySummary> {
        let generated_at = chrono::Utc::now().to_rfc3339();
        let blockers = serde_json::to_string(&report.blockers).unwrap_or_else(|_| "[]".into());
        let highlights = serde_json::to_string(&report.highlights).unwrap_or_else(|_| "[]".into());
        let suggestions = serde_json::to_string(&report.suggestions).unwrap_or_else(|_| "[]".into());
        let patterns = serde_json::to_string(&report.patterns).unwrap_or_else(|_| "[]".into());
        {
            let conn = self.lock()?;
            let updated = conn
                .execute(
                    "UPDATE daily_summaries
                     SET plan_id = ?1, summary_text = ?2, blockers = ?3, highlights = ?4,
                         suggestions = ?5, patterns = ?6, generated_at = ?7
                     WHERE date = ?8",
                    params![
                        plan_id,
                        report.summary,
                        blockers,
                        highlights,
                        suggestions,
                        patterns,
                        generated_at,
                        date
                    ],
                )
                .map_err(db_err)?;
            if updated == 0 {
                conn.execute(
                    "INSERT INTO daily_summaries
                     (plan_id, date, summary_text, blockers, highlights, suggestions, patterns, generated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        plan_id,
                        date,
                        report.summary,
                        blockers,
                        highlights,
                        suggestions,
                        patterns,
                        generated_at
                    ],
                )
                .map_err(db_err)?;
            }
        }
        self.get_daily_summary(date)?
            .ok_or(TrackLabError::NotFound { entity: "daily summary", id: 0 })
    }
}

const WORK_LOG_SELECT: &str = "
    SELECT l.id, l.plan_id, l.project_id, l.activity_id, l.comment,
           l.duration_minutes, l.timestamp, l.created_at, p.name, a.name
    FROM work_logs l
    LEFT JOIN projects p ON p.id = l.project_id
    LEFT JOIN activities a ON a.id = l.activity_id";

fn map_plan(row: &Row) -> rusqlite::Result<Plan> {
    let status: String = row.get("status")?;
    Ok(Plan {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        status: PlanStatus::parse(&status).unwrap_or(PlanStatus::Paused),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_project(row: &Row) -> rusqlite::Result<Project> {
    let status: String = row.get("status")?;
    Ok(Project {
        id: row.get("id")?,
        plan_id: row.get("plan_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        goal: row.get("goal")?,
        status: ProjectStatus::parse(&status).unwrap_or(ProjectStatus::NotStarted),
        color_tag: row.get("color_tag")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_activity(row: &Row) -> rusqlite::Result<Activity> {
    let status: String = row.get("status")?;
    Ok(Activity {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: ActivityStatus::parse(&status).unwrap_or(ActivityStatus::NotStarted),
        estimated_hours: row.get("estimated_hours")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_sprint_activity(row: &Row) -> rusqlite::Result<SprintActivity> {
    Ok(SprintActivity {
        id: row.get("id")?,
        plan_id: row.get("plan_id")?,
        activity_id: row.get("activity_id")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}

fn map_work_log(row: &Row) -> rusqlite::Result<WorkLog> {
    Ok(WorkLog {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        project_id: row.get(2)?,
        activity_id: row.get(3)?,
        comment: row.get(4)?,
        duration_minutes: row.get(5)?,
        timestamp: row.get(6)?,
        created_at: row.get(7)?,
        project_name: row.get(8)?,
        activity_name: row.get(9)?,
    })
}

fn map_daily_summary(row: &Row) -> rusqlite::Result<DailySummary> {
    let parse_list = |text: String| serde_json::from_str(&text).unwrap_or_default();
    let blockers: String = row.get("blockers")?;
    let highlights: String = row.get("highlights")?;
    let suggestions: String = row.get("suggestions")?;
    let patterns: String = row.get("patterns")?;
    Ok(DailySummary {
        id: row.get("id")?,
        plan_id: row.get("plan_id")?,
        date: row.get("date")?,
        summary_text: row.get("summary_text")?,
        blockers: parse_list(blockers),
        highlights: parse_list(highlights),
        suggestions: parse_list(suggestions),
        patterns: parse_list(patterns),
        generated_at: row.get("generated_at")?,
        created_at: row.get("created_at")?,
    })
}
