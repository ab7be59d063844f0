//! Report schedule: fires a callback at each matching wall-clock instant in a fixed
//! timezone. Cron expressions use the 7-field form `sec min hour day month dow year`;
//! 5-field expressions are accepted and normalised.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use ledger_core::ReportKind;

use crate::error::BotError;

/// Sundays at 20:00.
pub const WEEKLY_CRON: &str = "0 0 20 * * Sun *";
/// First day of the month at 07:00.
pub const MONTHLY_CRON: &str = "0 0 7 1 * * *";

#[derive(Debug, Clone)]
pub struct ReportSchedule {
    kind: ReportKind,
    schedule: Schedule,
}

impl ReportSchedule {
    pub fn new(kind: ReportKind, cron_expr: &str) -> Result<Self, BotError> {
        let cron_expr = cron_expr.trim();
        let cron_expr = if cron_expr.split_whitespace().count() == 5 {
            format!("0 {} *", cron_expr)
        } else {
            cron_expr.to_string()
        };
        let schedule = Schedule::from_str(&cron_expr)
            .map_err(|e| BotError::Schedule(format!("'{}': {}", cron_expr, e)))?;
        Ok(Self { kind, schedule })
    }

    pub fn weekly() -> Result<Self, BotError> {
        Self::new(ReportKind::Weekly, WEEKLY_CRON)
    }

    pub fn monthly() -> Result<Self, BotError> {
        Self::new(ReportKind::Monthly, MONTHLY_CRON)
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// First fire time strictly after `after`.
    pub fn next_after(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(after).next()
    }

    /// Run `callback` at every fire time until the task is aborted or the schedule ends.
    pub fn spawn<F, Fut>(self, tz: Tz, callback: F) -> JoinHandle<()>
    where
        F: Fn(ReportKind) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut cursor = Utc::now().with_timezone(&tz);
            loop {
                let now = Utc::now().with_timezone(&tz);
                let from = if now > cursor { now } else { cursor };
                let Some(next) = self.next_after(&from) else {
                    break;
                };
                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                debug!(
                    event = "schedule.waiting",
                    domain = "schedule",
                    report = self.kind.name(),
                    next = %next,
                    wait_ms = wait.as_millis() as u64
                );
                tokio::time::sleep(wait).await;
                info!(
                    event = "schedule.fired",
                    domain = "schedule",
                    report = self.kind.name(),
                    at = %next
                );
                callback(self.kind).await;
                cursor = next;
            }
        })
    }
}
