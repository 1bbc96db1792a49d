//! Core domain types for workout plan sync.
//!
//! This module defines both ends of the pipeline:
//! - The decoded document tree (intervals, steps, targets)
//! - The normalized execution plan (blocks of work/recovery steps)

use crate::sport::Activity;
use serde::{Deserialize, Serialize};

// ============================================================================
// Decoded Document Types
// ============================================================================

/// A workout plan as described by the incoming JSON document
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutPlanDocument {
    pub title: String,
    /// Free-form sport tag, resolved against the known sports at build time
    pub sport_type: String,
    /// Carried through untouched; never interpreted by the decoder or builder
    pub schedule: Option<Schedule>,
    pub intervals: Vec<IntervalNode>,
}

/// Optional scheduling hint attached to a document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "startLocal", default)]
    pub start_local: Option<String>,
}

/// One top-level scheduling unit of a document
#[derive(Clone, Debug, PartialEq)]
pub enum IntervalNode {
    Warmup {
        duration_seconds: u32,
        target: Option<Target>,
    },
    Cooldown {
        duration_seconds: u32,
        target: Option<Target>,
    },
    /// Children are always plain steps; repeats do not nest
    RepeatSet {
        repetitions: u32,
        children: Vec<StepNode>,
    },
    Step(StepNode),
}

/// Primary measure declared by a step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Reps,
    Distance,
    #[default]
    Time,
}

impl StepKind {
    /// Resolve a raw `kind` tag, if it names a step measure
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "reps" => Some(StepKind::Reps),
            "distance" => Some(StepKind::Distance),
            "time" => Some(StepKind::Time),
            _ => None,
        }
    }
}

/// A single step, either bare or inside a repeat set
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepNode {
    pub kind: StepKind,
    pub duration_seconds: Option<u32>,
    pub distance_meters: Option<f64>,
    /// Inert for the builder; any integer is accepted
    pub reps: Option<i64>,
    pub name: Option<String>,
    /// Values at or below zero never produce a recovery step
    pub rest_seconds: Option<i64>,
    /// Decoded for forward compatibility; the builder does not read it
    pub load: Option<Load>,
    pub target: Option<Target>,
}

/// External load for a step (e.g. kettlebell weight)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub value: f64,
    pub unit: String,
}

/// Intensity target for a step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "hrZone", default)]
    pub heart_rate_zone: Option<i64>,
    #[serde(default)]
    pub pace: Option<f64>,
}

// ============================================================================
// Execution Plan Types
// ============================================================================

/// Whether a step is effort or rest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRole {
    Work,
    Recovery,
}

/// Completion criterion for a step
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    Time { seconds: u32 },
    Distance { meters: f64 },
    Open,
}

/// Runtime feedback condition attached to a step
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Alert {
    HeartRateZone { zone: i64 },
    /// Current speed threshold in meters per second
    Pace { value: f64 },
}

/// A normalized step ready for the execution platform
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkStep {
    pub role: StepRole,
    pub goal: Goal,
    pub alert: Option<Alert>,
    pub display_name: Option<String>,
}

/// A run of steps executed `iterations` times
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub steps: Vec<WorkStep>,
    pub iterations: u32,
}

/// The normalized, platform-neutral workout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub title: String,
    pub activity: Activity,
    pub warmup: Option<WorkStep>,
    pub blocks: Vec<Block>,
    pub cooldown: Option<WorkStep>,
}

impl ExecutionPlan {
    /// Number of steps across all blocks (warmup and cooldown excluded)
    pub fn step_count(&self) -> usize {
        self.blocks.iter().map(|b| b.steps.len()).sum()
    }

    /// Total seconds of time-goal steps, with block steps counted once per iteration
    ///
    /// Saturates at `u64::MAX`.
    pub fn timed_seconds(&self) -> u64 {
        fn seconds_of(step: &WorkStep) -> u64 {
            match step.goal {
                Goal::Time { seconds } => u64::from(seconds),
                Goal::Distance { .. } | Goal::Open => 0,
            }
        }

        let edges = self
            .warmup
            .iter()
            .chain(self.cooldown.iter())
            .map(seconds_of)
            .fold(0u64, u64::saturating_add);

        self.blocks.iter().fold(edges, |total, b| {
            let per_iteration = b.steps.iter().map(seconds_of).fold(0u64, u64::saturating_add);
            total.saturating_add(per_iteration.saturating_mul(u64::from(b.iterations)))
        })
    }
}
