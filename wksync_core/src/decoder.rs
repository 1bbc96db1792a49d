//! Interval decoder.
//!
//! Turns raw JSON into a [`WorkoutPlanDocument`]. Each element of the
//! top-level `intervals` array is polymorphic: its `kind` tag is read first
//! and the object is then decoded into exactly one of four shapes:
//! - `"warmup"` / `"cooldown"`: duration plus optional target
//! - `"repeat"`: repetition count plus child steps
//! - anything else (including no `kind`): a bare step
//!
//! Optional `target` objects are decoded best-effort. A malformed target is
//! dropped with a warning instead of failing the surrounding interval.

use crate::error::DecodeError;
use crate::types::{IntervalNode, Load, Schedule, StepKind, StepNode, Target, WorkoutPlanDocument};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Top-level document envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    title: String,
    sport_type: String,
    #[serde(default)]
    schedule: Option<Schedule>,
    intervals: Vec<Value>,
}

/// Warmup or cooldown body
#[derive(Debug, Deserialize)]
struct RawEdge {
    seconds: Option<u32>,
    target: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRepeat {
    reps: Option<i64>,
    intervals: Option<Vec<RawStep>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    kind: Option<String>,
    seconds: Option<u32>,
    meters: Option<f64>,
    reps: Option<i64>,
    name: Option<String>,
    load: Option<Load>,
    rest_sec: Option<i64>,
    target: Option<Value>,
}

/// Which shape an interval object is decoded as
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Warmup,
    Cooldown,
    Repeat,
    Step,
}

impl Shape {
    fn read(index: usize, object: &Map<String, Value>) -> Result<Self, DecodeError> {
        match object.get("kind") {
            None | Some(Value::Null) => Ok(Shape::Step),
            Some(Value::String(tag)) => Ok(match tag.as_str() {
                "warmup" => Shape::Warmup,
                "cooldown" => Shape::Cooldown,
                "repeat" => Shape::Repeat,
                _ => Shape::Step,
            }),
            Some(_) => Err(DecodeError::InvalidKind { index }),
        }
    }
}

/// Decode a workout plan from raw JSON bytes
pub fn decode(bytes: &[u8]) -> Result<WorkoutPlanDocument, DecodeError> {
    let raw: RawPlan = serde_json::from_slice(bytes).map_err(DecodeError::from_envelope)?;
    assemble(raw)
}

/// Decode a workout plan from JSON text
pub fn decode_str(text: &str) -> Result<WorkoutPlanDocument, DecodeError> {
    decode(text.as_bytes())
}

fn assemble(raw: RawPlan) -> Result<WorkoutPlanDocument, DecodeError> {
    let intervals = raw
        .intervals
        .into_iter()
        .enumerate()
        .map(|(index, value)| decode_interval(index, value))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "Decoded workout {:?} ({}) with {} intervals",
        raw.title,
        raw.sport_type,
        intervals.len()
    );

    Ok(WorkoutPlanDocument {
        title: raw.title,
        sport_type: raw.sport_type,
        schedule: raw.schedule,
        intervals,
    })
}

fn decode_interval(index: usize, value: Value) -> Result<IntervalNode, DecodeError> {
    let Value::Object(object) = value else {
        return Err(DecodeError::NotAnObject { index });
    };

    let shape = Shape::read(index, &object)?;
    let value = Value::Object(object);
    let mistyped = |source: serde_json::Error| DecodeError::Interval { index, source };

    tracing::debug!("Interval {} decoded as {:?}", index, shape);

    match shape {
        Shape::Warmup => {
            let raw: RawEdge = serde_json::from_value(value).map_err(mistyped)?;
            Ok(IntervalNode::Warmup {
                duration_seconds: raw.seconds.unwrap_or(0),
                target: lenient_target(index, raw.target),
            })
        }
        Shape::Cooldown => {
            let raw: RawEdge = serde_json::from_value(value).map_err(mistyped)?;
            Ok(IntervalNode::Cooldown {
                duration_seconds: raw.seconds.unwrap_or(0),
                target: lenient_target(index, raw.target),
            })
        }
        Shape::Repeat => {
            let raw: RawRepeat = serde_json::from_value(value).map_err(mistyped)?;
            let reps = raw
                .reps
                .ok_or(DecodeError::MissingField { index, field: "reps" })?;
            let repetitions = u32::try_from(reps)
                .ok()
                .filter(|r| *r >= 1)
                .ok_or(DecodeError::InvalidRepetitions { index, reps })?;
            let children = raw.intervals.ok_or(DecodeError::MissingField {
                index,
                field: "intervals",
            })?;

            Ok(IntervalNode::RepeatSet {
                repetitions,
                children: children
                    .into_iter()
                    .map(|step| step.into_node(index))
                    .collect(),
            })
        }
        Shape::Step => {
            let raw: RawStep = serde_json::from_value(value).map_err(mistyped)?;
            Ok(IntervalNode::Step(raw.into_node(index)))
        }
    }
}

impl RawStep {
    fn into_node(self, index: usize) -> StepNode {
        let kind = match self.kind.as_deref() {
            Some(tag) => StepKind::from_tag(tag).unwrap_or_else(|| {
                tracing::debug!(
                    "Interval {}: unrecognized step kind {:?}, using {:?}",
                    index,
                    tag,
                    StepKind::default()
                );
                StepKind::default()
            }),
            None => StepKind::default(),
        };

        StepNode {
            kind,
            duration_seconds: self.seconds,
            distance_meters: self.meters,
            reps: self.reps,
            name: self.name,
            rest_seconds: self.rest_sec,
            load: self.load,
            target: lenient_target(index, self.target),
        }
    }
}

/// Decode an optional target, substituting absence for anything unparsable
fn lenient_target(index: usize, raw: Option<Value>) -> Option<Target> {
    let value = raw?;
    match serde_json::from_value::<Target>(value) {
        Ok(target) => Some(target),
        Err(e) => {
            tracing::warn!(
                "Interval {}: ignoring malformed target: {}",
                index,
                e
            );
            None
        }
    }
}
