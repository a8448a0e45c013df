//! Scheduler engine — due-job checking, firing, and the dedicated thread.
//!
//! The engine runs on its own thread with a current-thread tokio runtime so
//! a slow analysis call can never stall the gateway, and the gateway's
//! runtime never executes scheduler code. The only traffic between the two
//! is the command channel (in) and the event bridge (out).

use std::sync::Arc;

use chrono::{DateTime, Duration, Local};
use tokio::sync::mpsc;

use tracklab_analysis::{OllamaClient, run_daily_analysis};
use tracklab_core::config::SchedulerConfig;
use tracklab_core::error::Result;
use tracklab_core::types::{AnalysisReport, BusEvent};
use tracklab_db::Database;

use crate::bridge::EventBridge;
use crate::jobs::{Job, JobAction, JobStatus, Trigger};
use crate::spec::WeekdaySchedule;

const POPUP_GRACE_SECS: i64 = 300;
const DAILY_NOTE_GRACE_SECS: i64 = 300;
const ANALYSIS_GRACE_SECS: i64 = 600;

/// Shared resources a firing job may need.
pub struct JobContext {
    pub db: Arc<Database>,
    pub ollama: Arc<OllamaClient>,
    pub analysis_enabled: bool,
}

/// The scheduler engine — owns the job list and executes due jobs.
pub struct SchedulerEngine {
    jobs: Vec<Job>,
    ctx: JobContext,
    bridge: EventBridge,
    oneshot_seq: u64,
}

enum Disposition {
    Skip,
    Fire(JobAction, String),
}

impl SchedulerEngine {
    pub fn new(ctx: JobContext, bridge: EventBridge) -> Self {
        Self {
            jobs: Vec::new(),
            ctx,
            bridge,
            oneshot_seq: 0,
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn register(&mut self, job: Job) {
        tracing::info!(
            "job '{}' registered — next run {}",
            job.name,
            job.next_run.map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
        );
        self.jobs.push(job);
    }

    /// Register the three built-in jobs from config. Schedules are validated
    /// here; a bad config fails the boot.
    pub fn register_defaults(&mut self, cfg: &SchedulerConfig, now: DateTime<Local>) -> Result<()> {
        self.register(Job::recurring(
            "hourly_popup",
            "Hourly activity popup",
            WeekdaySchedule::weekdays_between(cfg.popup_start_hour, cfg.popup_end_hour, cfg.popup_minute),
            JobAction::ShowPopup,
            POPUP_GRACE_SECS,
            now,
        )?);
        self.register(Job::recurring(
            "daily_note_prompt",
            "Daily note prompt",
            WeekdaySchedule::weekdays_at(cfg.daily_note_hour, cfg.daily_note_minute),
            JobAction::DailyNotePrompt,
            DAILY_NOTE_GRACE_SECS,
            now,
        )?);
        self.register(Job::recurring(
            "daily_analysis",
            "Daily analysis",
            WeekdaySchedule::weekdays_at(cfg.analysis_hour, cfg.analysis_minute),
            JobAction::RunAnalysis,
            ANALYSIS_GRACE_SECS,
            now,
        )?);
        tracing::info!(
            "Scheduler jobs registered — popup {:02}:{:02}–{:02}:{:02}, note {:02}:{:02}, analysis {:02}:{:02}",
            cfg.popup_start_hour,
            cfg.popup_minute,
            cfg.popup_end_hour,
            cfg.popup_minute,
            cfg.daily_note_hour,
            cfg.daily_note_minute,
            cfg.analysis_hour,
            cfg.analysis_minute,
        );
        Ok(())
    }

    /// Register a one-shot popup `minutes` from now (debug/manual trigger).
    pub fn schedule_popup_in(&mut self, minutes: i64, now: DateTime<Local>) {
        self.oneshot_seq += 1;
        let id = format!("oneshot-popup-{}", self.oneshot_seq);
        self.register(Job::once(
            &id,
            "One-shot activity popup",
            now + Duration::minutes(minutes.max(0)),
            JobAction::ShowPopup,
        ));
    }

    /// Check every job against `now` and fire the due ones. One pass, in
    /// registration order; fired one-shots are dropped at the end.
    pub async fn tick(&mut self, now: DateTime<Local>) {
        for idx in 0..self.jobs.len() {
            let disposition = {
                let job = &mut self.jobs[idx];
                if !job.is_due(now) {
                    Disposition::Skip
                } else if job.misfired(now) {
                    tracing::warn!(
                        "job '{}' missed its slot by more than {}s — skipping this occurrence",
                        job.name,
                        job.grace.num_seconds()
                    );
                    job.advance(now);
                    Disposition::Skip
                } else {
                    job.status = JobStatus::Firing;
                    job.last_run = Some(now);
                    job.run_count += 1;
                    Disposition::Fire(job.action, job.name.clone())
                }
            };
            let (action, name) = match disposition {
                Disposition::Skip => continue,
                Disposition::Fire(action, name) => (action, name),
            };

            tracing::info!("job '{name}' fired");
            let result = Self::run_action(&self.ctx, &self.bridge, action, now).await;

            let job = &mut self.jobs[idx];
            match result {
                Ok(()) => job.status = JobStatus::Completed,
                Err(e) => {
                    tracing::error!("job '{name}' failed: {e}");
                    job.status = JobStatus::Failed(e.to_string());
                }
            }
            job.advance(now);
            if job.next_run.is_some() {
                job.status = JobStatus::Scheduled;
            }
        }
        self.jobs.retain(|j| {
            if j.next_run.is_none() && matches!(j.trigger, Trigger::Recurring(_)) {
                tracing::warn!("recurring job '{}' has no next occurrence — dropping", j.name);
            }
            j.next_run.is_some()
        });
    }

    async fn run_action(
        ctx: &JobContext,
        bridge: &EventBridge,
        action: JobAction,
        now: DateTime<Local>,
    ) -> Result<()> {
        let date = now.format("%Y-%m-%d").to_string();
        match action {
            JobAction::ShowPopup => {
                bridge.post(BusEvent::activity_popup());
                Ok(())
            }
            JobAction::DailyNotePrompt => {
                bridge.post(BusEvent::daily_note_prompt(date));
                Ok(())
            }
            JobAction::RunAnalysis => {
                let outcome =
                    run_daily_analysis(&ctx.db, &ctx.ollama, &date, ctx.analysis_enabled).await;
                let result = match outcome {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        // leave a degraded record so the date is never blank
                        let report = AnalysisReport::empty(format!(
                            "Analysis could not be completed: {e}"
                        ));
                        let plan_id = ctx.db.active_plan().ok().flatten().map(|p| p.id);
                        if let Err(store_err) = ctx.db.upsert_daily_summary(plan_id, &date, &report)
                        {
                            tracing::error!("failed to store degraded summary: {store_err}");
                        }
                        Err(e)
                    }
                };
                // the frontend stops waiting on this event either way
                bridge.post(BusEvent::summary_ready(date));
                result
            }
        }
    }
}

/// Commands accepted by the scheduler thread.
pub enum SchedulerCommand {
    PopupIn { minutes: i64 },
    Shutdown,
}

/// Cheap clonable handle for registering triggers from the gateway.
#[derive(Clone)]
pub struct SchedulerClient {
    tx: mpsc::UnboundedSender<SchedulerCommand>,
}

impl SchedulerClient {
    /// Create a client and the command receiver it feeds. `spawn` wires the
    /// receiver to the scheduler thread; tests can drain it directly.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SchedulerCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn schedule_popup_in(&self, minutes: i64) {
        if self.tx.send(SchedulerCommand::PopupIn { minutes }).is_err() {
            tracing::warn!("scheduler is not running — popup request dropped");
        }
    }
}

/// Owns the scheduler thread; dropping without `shutdown` detaches it.
pub struct SchedulerHandle {
    client: SchedulerClient,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn client(&self) -> SchedulerClient {
        self.client.clone()
    }

    /// Stop accepting triggers, let any in-flight job finish, and join the
    /// thread.
    pub fn shutdown(mut self) {
        let _ = self.client.tx.send(SchedulerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("scheduler thread panicked");
            }
        }
        tracing::info!("Scheduler stopped.");
    }
}

/// Start the scheduler on a dedicated thread with its own current-thread
/// runtime, ticking every `tick_secs`.
pub fn spawn(mut engine: SchedulerEngine, tick_secs: u64) -> SchedulerHandle {
    let (client, mut rx) = SchedulerClient::channel();

    let spawned = std::thread::Builder::new()
        .name("tracklab-scheduler".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("scheduler runtime failed to start: {e}");
                    return;
                }
            };
            runtime.block_on(async move {
                let mut interval =
                    tokio::time::interval(std::time::Duration::from_secs(tick_secs.max(1)));
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                tracing::info!("Scheduler started (check every {}s)", tick_secs.max(1));
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            engine.tick(Local::now()).await;
                        }
                        cmd = rx.recv() => match cmd {
                            Some(SchedulerCommand::PopupIn { minutes }) => {
                                engine.schedule_popup_in(minutes, Local::now());
                            }
                            Some(SchedulerCommand::Shutdown) | None => break,
                        }
                    }
                }
            });
        });

    let thread = match spawned {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::error!("failed to spawn scheduler thread: {e}");
            None
        }
    };
    SchedulerHandle { client, thread }
}
