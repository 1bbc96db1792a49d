//! Plan sink interface and a JSON Lines plan store.
//!
//! A [`PlanSink`] stands in for the platform that runs or schedules a plan.
//! [`JsonlPlanStore`] is the file-backed implementation: each saved plan is
//! appended as one JSON line under an exclusive file lock.

use crate::{ExecutionPlan, Result};
use chrono::{DateTime, Local, NaiveDateTime, Timelike, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A plan accepted by a sink, with the time it is scheduled for
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPlan {
    pub id: Uuid,
    pub scheduled_for: NaiveDateTime,
    pub saved_at: DateTime<Utc>,
    pub plan: ExecutionPlan,
}

/// Destination for built plans
///
/// The plan is moved into the sink. When `schedule_at` is `None` the sink
/// picks the time itself.
pub trait PlanSink {
    fn save(
        &mut self,
        plan: ExecutionPlan,
        schedule_at: Option<NaiveDateTime>,
    ) -> Result<ScheduledPlan>;
}

/// Current local time truncated to the minute
pub fn default_schedule_time() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// JSONL-based plan store with file locking
pub struct JsonlPlanStore {
    path: PathBuf,
}

impl JsonlPlanStore {
    /// Create a new store writing to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store file inside a data directory
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("scheduled_plans.jsonl"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn append(&self, record: &ScheduledPlan) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;
        Ok(())
    }
}

impl PlanSink for JsonlPlanStore {
    fn save(
        &mut self,
        plan: ExecutionPlan,
        schedule_at: Option<NaiveDateTime>,
    ) -> Result<ScheduledPlan> {
        let record = ScheduledPlan {
            id: Uuid::new_v4(),
            scheduled_for: schedule_at.unwrap_or_else(default_schedule_time),
            saved_at: Utc::now(),
            plan,
        };

        self.append(&record)?;

        tracing::info!(
            "Scheduled plan {:?} ({}) for {}",
            record.plan.title,
            record.id,
            record.scheduled_for
        );
        Ok(record)
    }
}

/// Read all scheduled plans from a store file
///
/// Unparsable lines, including ones that are not valid UTF-8, are logged and
/// skipped.
pub fn read_scheduled(path: &Path) -> Result<Vec<ScheduledPlan>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut plans = Vec::new();

    for (line_num, line_result) in reader.split(b'\n').enumerate() {
        let line = line_result?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<ScheduledPlan>(&line) {
            Ok(plan) => plans.push(plan),
            Err(e) => {
                tracing::warn!("Failed to parse scheduled plan at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} scheduled plans from {:?}", plans.len(), path);
    Ok(plans)
}
