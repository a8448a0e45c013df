//! Domain entities and the WebSocket event schema.
//!
//! Statuses are stored in SQLite as their display strings ("Not Started",
//! "In Progress", ...) so the database stays readable with plain sqlite3.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Smallest accepted work-log duration, in minutes.
pub const MIN_LOG_MINUTES: i64 = 1;
/// Largest accepted work-log duration, in minutes (8 hours).
pub const MAX_LOG_MINUTES: i64 = 480;

/// Biweekly plan lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Active,
    Completed,
    Paused,
    Archived,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
            Self::Archived => "Archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(Self::Active),
            "Completed" => Some(Self::Completed),
            "Paused" => Some(Self::Paused),
            "Archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Project status. `Complete`, `OnHold`, and `Archived` are administrative:
/// the cascade engine never moves a project out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Active,
    Blocked,
    #[serde(rename = "On Hold")]
    OnHold,
    Complete,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Active => "Active",
            Self::Blocked => "Blocked",
            Self::OnHold => "On Hold",
            Self::Complete => "Complete",
            Self::Archived => "Archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Not Started" => Some(Self::NotStarted),
            "Active" => Some(Self::Active),
            "Blocked" => Some(Self::Blocked),
            "On Hold" => Some(Self::OnHold),
            "Complete" => Some(Self::Complete),
            "Archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// States an operator set deliberately; the cascade must not override them.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Self::Complete | Self::OnHold | Self::Archived)
    }
}

/// Activity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Complete,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Complete => "Complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Not Started" => Some(Self::NotStarted),
            "In Progress" => Some(Self::InProgress),
            "Complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

/// A biweekly plan — a fixed `[start_date, end_date]` window of work.
/// Dates are ISO `YYYY-MM-DD` strings; at most one plan is Active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub status: PlanStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// A project within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub status: ProjectStatus,
    pub color_tag: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A leaf unit of planned work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: ActivityStatus,
    pub estimated_hours: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// A sprint selection — links an activity into the active plan's flat
/// dashboard view without changing project ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintActivity {
    pub id: i64,
    pub plan_id: i64,
    pub activity_id: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A timestamped work-log entry. Immutable once recorded as far as the
/// automation core is concerned; `project_name`/`activity_name` are joined in
/// for API responses and the analysis transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLog {
    pub id: i64,
    pub plan_id: i64,
    pub project_id: i64,
    pub activity_id: Option<i64>,
    pub comment: String,
    pub duration_minutes: i64,
    /// RFC 3339 with offset, e.g. `2026-02-24T10:30:00+05:30`.
    pub timestamp: String,
    pub created_at: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub activity_name: Option<String>,
}

/// Input for recording a work log.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkLog {
    pub plan_id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub activity_id: Option<i64>,
    pub comment: String,
    pub duration_minutes: i64,
    /// Defaults to now (local time) when omitted.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Structured content of a daily analysis. The four lists hold whatever shape
/// the model produced (structured objects or plain strings) — only the
/// envelope is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub blockers: Vec<Value>,
    #[serde(default)]
    pub highlights: Vec<Value>,
    #[serde(default)]
    pub suggestions: Vec<Value>,
    #[serde(default)]
    pub patterns: Vec<Value>,
}

impl AnalysisReport {
    /// A structurally valid report with all four lists empty.
    pub fn empty(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            blockers: Vec::new(),
            highlights: Vec::new(),
            suggestions: Vec::new(),
            patterns: Vec::new(),
        }
    }
}

/// One stored analysis per calendar date (unique key = `date`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: i64,
    pub plan_id: Option<i64>,
    pub date: String,
    pub summary_text: String,
    pub blockers: Vec<Value>,
    pub highlights: Vec<Value>,
    pub suggestions: Vec<Value>,
    pub patterns: Vec<Value>,
    pub generated_at: String,
    pub created_at: String,
}

/// Popup actions pushed to UI clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PopupAction {
    ShowActivityPopup,
    ShowDailyNotePrompt,
}

/// Events broadcast to every connected WebSocket client.
///
/// Wire format (matched by the frontend):
/// ```json
/// {"type":"activity_logged","data":{...}}
/// {"type":"summary_ready","data":{"date":"2026-02-24"}}
/// {"type":"plan_updated","data":{"plan_id":1,"status":"Active"}}
/// {"type":"notification","action":"SHOW_ACTIVITY_POPUP","message":"..."}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusEvent {
    ActivityLogged {
        data: WorkLog,
    },
    SummaryReady {
        data: SummaryReadyData,
    },
    PlanUpdated {
        data: PlanUpdatedData,
    },
    Notification {
        action: PopupAction,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        date: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReadyData {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdatedData {
    pub plan_id: i64,
    pub status: PlanStatus,
}

impl BusEvent {
    pub fn activity_logged(log: WorkLog) -> Self {
        Self::ActivityLogged { data: log }
    }

    pub fn summary_ready(date: impl Into<String>) -> Self {
        Self::SummaryReady {
            data: SummaryReadyData { date: date.into() },
        }
    }

    pub fn plan_updated(plan_id: i64, status: PlanStatus) -> Self {
        Self::PlanUpdated {
            data: PlanUpdatedData { plan_id, status },
        }
    }

    pub fn activity_popup() -> Self {
        Self::Notification {
            action: PopupAction::ShowActivityPopup,
            message: "What are you working on right now?".to_string(),
            date: None,
        }
    }

    pub fn daily_note_prompt(date: impl Into<String>) -> Self {
        Self::Notification {
            action: PopupAction::ShowDailyNotePrompt,
            message: "Time to write today's project notes.".to_string(),
            date: Some(date.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            ProjectStatus::NotStarted,
            ProjectStatus::Active,
            ProjectStatus::Blocked,
            ProjectStatus::OnHold,
            ProjectStatus::Complete,
            ProjectStatus::Archived,
        ] {
            assert_eq!(ProjectStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ActivityStatus::parse("In Progress"), Some(ActivityStatus::InProgress));
        assert_eq!(ActivityStatus::parse("bogus"), None);
    }

    #[test]
    fn test_administrative_statuses() {
        assert!(ProjectStatus::OnHold.is_administrative());
        assert!(ProjectStatus::Archived.is_administrative());
        assert!(ProjectStatus::Complete.is_administrative());
        assert!(!ProjectStatus::Active.is_administrative());
        assert!(!ProjectStatus::NotStarted.is_administrative());
    }

    #[test]
    fn test_event_wire_format() {
        let ev = BusEvent::summary_ready("2026-02-24");
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "summary_ready");
        assert_eq!(json["data"]["date"], "2026-02-24");

        let popup = serde_json::to_value(BusEvent::activity_popup()).unwrap();
        assert_eq!(popup["type"], "notification");
        assert_eq!(popup["action"], "SHOW_ACTIVITY_POPUP");
        assert!(popup.get("date").is_none());

        let prompt = serde_json::to_value(BusEvent::daily_note_prompt("2026-02-24")).unwrap();
        assert_eq!(prompt["action"], "SHOW_DAILY_NOTE_PROMPT");
        assert_eq!(prompt["date"], "2026-02-24");
    }

    #[test]
    fn test_analysis_report_defaults() {
        let report: AnalysisReport = serde_json::from_str(r#"{"summary":"did things"}"#).unwrap();
        assert_eq!(report.summary, "did things");
        assert!(report.blockers.is_empty());
        assert!(report.patterns.is_empty());
    }
}
