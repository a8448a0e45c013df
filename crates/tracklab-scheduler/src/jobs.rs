//! Job definitions — what fires, when, and with how much misfire tolerance.

use chrono::{DateTime, Duration, Local};

use tracklab_core::error::Result;

use crate::spec::WeekdaySchedule;

/// What a job does when it fires. All side effects leave the scheduler
/// context through the event bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    /// Broadcast the hourly "what are you working on?" popup.
    ShowPopup,
    /// Broadcast the end-of-day note prompt with today's date.
    DailyNotePrompt,
    /// Run the Ollama analysis pipeline for today, then broadcast readiness.
    RunAnalysis,
}

/// When a job fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Recurring(WeekdaySchedule),
    Once(DateTime<Local>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Scheduled,
    Firing,
    Completed,
    Failed(String),
}

/// A scheduled job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub trigger: Trigger,
    pub action: JobAction,
    pub status: JobStatus,
    /// How long past `next_run` a firing is still honored. Beyond this the
    /// occurrence is skipped, never replayed.
    pub grace: Duration,
    pub next_run: Option<DateTime<Local>>,
    pub last_run: Option<DateTime<Local>>,
    pub run_count: u32,
}

impl Job {
    /// A recurring job. The schedule is validated here so a bad config
    /// fails at registration, and `next_run` is computed from `now`.
    pub fn recurring(
        id: &str,
        name: &str,
        schedule: WeekdaySchedule,
        action: JobAction,
        grace_secs: i64,
        now: DateTime<Local>,
    ) -> Result<Self> {
        schedule.validate()?;
        let next_run = schedule.next_fire(now);
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            trigger: Trigger::Recurring(schedule),
            action,
            status: JobStatus::Scheduled,
            grace: Duration::seconds(grace_secs),
            next_run,
            last_run: None,
            run_count: 0,
        })
    }

    /// A one-shot job: fires at `at`, then is discarded.
    pub fn once(id: &str, name: &str, at: DateTime<Local>, action: JobAction) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            trigger: Trigger::Once(at),
            action,
            status: JobStatus::Scheduled,
            grace: Duration::seconds(60),
            next_run: Some(at),
            last_run: None,
            run_count: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        matches!(self.next_run, Some(next) if now >= next)
    }

    pub fn misfired(&self, now: DateTime<Local>) -> bool {
        matches!(self.next_run, Some(next) if now - next > self.grace)
    }

    /// Advance to the next occurrence (or clear it for a one-shot).
    pub fn advance(&mut self, after: DateTime<Local>) {
        self.next_run = match &self.trigger {
            Trigger::Recurring(schedule) => schedule.next_fire(after),
            Trigger::Once(_) => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::WeekdaySchedule;
    use chrono::TimeZone;

    #[test]
    fn test_due_and_misfire_windows() {
        let now = Local.with_ymd_and_hms(2026, 2, 24, 17, 0, 0).unwrap();
        let mut job = Job::recurring(
            "daily_analysis",
            "Daily analysis",
            WeekdaySchedule::weekdays_at(17, 0),
            JobAction::RunAnalysis,
            600,
            now - Duration::hours(1),
        )
        .unwrap();
        assert_eq!(job.next_run, Some(now));

        assert!(!job.is_due(now - Duration::minutes(1)));
        assert!(job.is_due(now));
        assert!(job.is_due(now + Duration::minutes(5)));
        assert!(!job.misfired(now + Duration::minutes(5)));
        assert!(job.misfired(now + Duration::minutes(11)));

        job.advance(now);
        assert_eq!(job.next_run, Some(now + Duration::days(1)));
    }

    #[test]
    fn test_one_shot_clears_after_advance() {
        let at = Local.with_ymd_and_hms(2026, 2, 24, 12, 0, 0).unwrap();
        let mut job = Job::once("oneshot-1", "Debug popup", at, JobAction::ShowPopup);
        assert!(job.is_due(at));
        job.advance(at);
        assert_eq!(job.next_run, None);
    }

    #[test]
    fn test_invalid_schedule_rejected_at_registration() {
        let bad = WeekdaySchedule::weekdays_at(25, 0);
        let err = Job::recurring("x", "x", bad, JobAction::ShowPopup, 300, Local::now());
        assert!(err.is_err());
    }
}
