//! Plan builder: restructures a decoded document into an [`ExecutionPlan`].
//!
//! Traversal rules:
//! - The first warmup and first cooldown are lifted out of the sequence;
//!   later ones are demoted to ordinary work steps where they occur.
//! - Consecutive bare steps coalesce into a single block run once.
//! - Each repeat set closes any pending bare steps, then becomes its own
//!   block run `repetitions` times.
//! - A step with a positive rest is followed by a synthesized recovery step.

use crate::config::BuilderConfig;
use crate::error::BuildError;
use crate::sport::SportType;
use crate::types::{
    Alert, Block, ExecutionPlan, Goal, IntervalNode, StepNode, StepRole, Target, WorkStep,
    WorkoutPlanDocument,
};

const WARMUP_NAME: &str = "Warmup";
const COOLDOWN_NAME: &str = "Cooldown";
const RECOVERY_NAME: &str = "Recovery";

/// Converts decoded documents into execution plans
#[derive(Clone, Debug, Default)]
pub struct PlanBuilder {
    options: BuilderConfig,
}

/// Build a plan with default options
pub fn build(document: &WorkoutPlanDocument) -> Result<ExecutionPlan, BuildError> {
    PlanBuilder::default().build(document)
}

/// Plan under construction
#[derive(Default)]
struct Assembly {
    warmup: Option<WorkStep>,
    cooldown: Option<WorkStep>,
    blocks: Vec<Block>,
    loose: Vec<WorkStep>,
}

impl Assembly {
    /// Close pending bare steps as a single-iteration block
    fn flush(&mut self) {
        if !self.loose.is_empty() {
            let steps = std::mem::take(&mut self.loose);
            self.blocks.push(Block {
                steps,
                iterations: 1,
            });
        }
    }
}

impl PlanBuilder {
    pub fn new(options: BuilderConfig) -> Self {
        Self { options }
    }

    pub fn build(&self, document: &WorkoutPlanDocument) -> Result<ExecutionPlan, BuildError> {
        let sport = self.resolve_sport(&document.sport_type)?;
        let mut assembly = Assembly::default();

        for (index, interval) in document.intervals.iter().enumerate() {
            match interval {
                IntervalNode::Warmup {
                    duration_seconds,
                    target,
                } => {
                    let step = edge_step(*duration_seconds, target.as_ref(), WARMUP_NAME);
                    if assembly.warmup.is_none() {
                        assembly.warmup = Some(step);
                    } else {
                        tracing::debug!("Interval {}: extra warmup demoted to work step", index);
                        assembly.loose.push(step);
                    }
                }
                IntervalNode::Cooldown {
                    duration_seconds,
                    target,
                } => {
                    let step = edge_step(*duration_seconds, target.as_ref(), COOLDOWN_NAME);
                    if assembly.cooldown.is_none() {
                        assembly.cooldown = Some(step);
                    } else {
                        tracing::debug!("Interval {}: extra cooldown demoted to work step", index);
                        assembly.loose.push(step);
                    }
                }
                IntervalNode::RepeatSet {
                    repetitions,
                    children,
                } => {
                    assembly.flush();

                    let mut steps = Vec::new();
                    for child in children {
                        self.expand_step(sport, child, &mut steps);
                    }

                    if steps.is_empty() {
                        tracing::debug!("Interval {}: repeat set has no steps, skipping", index);
                        continue;
                    }

                    assembly.blocks.push(Block {
                        steps,
                        iterations: *repetitions,
                    });
                }
                IntervalNode::Step(step) => {
                    self.expand_step(sport, step, &mut assembly.loose);
                }
            }
        }

        assembly.flush();

        let plan = ExecutionPlan {
            title: document.title.clone(),
            activity: sport.activity(),
            warmup: assembly.warmup,
            blocks: assembly.blocks,
            cooldown: assembly.cooldown,
        };

        tracing::info!(
            "Built plan {:?}: {:?}, {} blocks, {} steps",
            plan.title,
            plan.activity,
            plan.blocks.len(),
            plan.step_count()
        );

        Ok(plan)
    }

    fn resolve_sport(&self, tag: &str) -> Result<SportType, BuildError> {
        match SportType::from_tag(tag) {
            Some(sport) => Ok(sport),
            None if self.options.strict_sport_types => {
                Err(BuildError::UnknownSportType(tag.to_string()))
            }
            None => {
                tracing::warn!("Unknown sport type {:?}, using {:?}", tag, SportType::Other);
                Ok(SportType::Other)
            }
        }
    }

    /// Append the work step for `step`, plus its recovery step when it rests
    fn expand_step(&self, sport: SportType, step: &StepNode, out: &mut Vec<WorkStep>) {
        out.push(WorkStep {
            role: StepRole::Work,
            goal: self.goal_for(sport, step),
            alert: alert_for(step.target.as_ref()),
            display_name: step.name.clone(),
        });

        if let Some(rest) = step.rest_seconds.filter(|r| *r > 0) {
            let seconds = u32::try_from(rest).unwrap_or_else(|_| {
                tracing::warn!(
                    "Rest of {}s exceeds the longest time goal, clamping to {}s",
                    rest,
                    u32::MAX
                );
                u32::MAX
            });
            out.push(WorkStep {
                role: StepRole::Recovery,
                goal: Goal::Time { seconds },
                alert: None,
                display_name: Some(RECOVERY_NAME.to_string()),
            });
        }
    }

    /// Duration wins over distance; neither gives an open goal
    fn goal_for(&self, sport: SportType, step: &StepNode) -> Goal {
        match (step.duration_seconds, step.distance_meters) {
            (Some(seconds), _) => Goal::Time { seconds },
            (None, Some(_))
                if self.options.open_unsupported_distance_goals
                    && !sport.supports_distance_goals() =>
            {
                Goal::Open
            }
            (None, Some(meters)) => Goal::Distance { meters },
            (None, None) => Goal::Open,
        }
    }
}

fn edge_step(duration_seconds: u32, target: Option<&Target>, name: &str) -> WorkStep {
    WorkStep {
        role: StepRole::Work,
        goal: Goal::Time {
            seconds: duration_seconds,
        },
        alert: alert_for(target),
        display_name: Some(name.to_string()),
    }
}

/// Heart-rate zone takes precedence over pace
fn alert_for(target: Option<&Target>) -> Option<Alert> {
    let target = target?;
    if let Some(zone) = target.heart_rate_zone {
        return Some(Alert::HeartRateZone { zone });
    }
    target.pace.map(|value| Alert::Pace { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_str;
    use crate::sport::Activity;

    fn doc(sport: &str, intervals: Vec<IntervalNode>) -> WorkoutPlanDocument {
        WorkoutPlanDocument {
            title: "Test".into(),
            sport_type: sport.into(),
            schedule: None,
            intervals,
        }
    }

    fn timed_step(seconds: u32, name: &str) -> StepNode {
        StepNode {
            duration_seconds: Some(seconds),
            name: Some(name.into()),
            ..StepNode::default()
        }
    }

    fn work(goal: Goal, alert: Option<Alert>, name: Option<&str>) -> WorkStep {
        WorkStep {
            role: StepRole::Work,
            goal,
            alert,
            display_name: name.map(String::from),
        }
    }

    fn recovery(seconds: u32) -> WorkStep {
        WorkStep {
            role: StepRole::Recovery,
            goal: Goal::Time { seconds },
            alert: None,
            display_name: Some("Recovery".into()),
        }
    }

    #[test]
    fn test_sample_document_structure() {
        let document = decode_str(
            r#"{"title":"T","sportType":"running","intervals":[{"kind":"warmup","seconds":300},{"kind":"time","seconds":60,"name":"Build"},{"kind":"repeat","reps":2,"intervals":[{"kind":"time","seconds":45,"name":"Fast"},{"kind":"time","seconds":30,"restSec":15,"name":"Slow","target":{"pace":3.5}}]},{"kind":"cooldown","seconds":180}]}"#,
        )
        .unwrap();

        let plan = build(&document).unwrap();

        assert_eq!(plan.title, "T");
        assert_eq!(plan.activity, Activity::Running);
        assert_eq!(
            plan.warmup,
            Some(work(Goal::Time { seconds: 300 }, None, Some("Warmup")))
        );
        assert_eq!(
            plan.cooldown,
            Some(work(Goal::Time { seconds: 180 }, None, Some("Cooldown")))
        );
        assert_eq!(
            plan.blocks,
            vec![
                Block {
                    steps: vec![work(Goal::Time { seconds: 60 }, None, Some("Build"))],
                    iterations: 1,
                },
                Block {
                    steps: vec![
                        work(Goal::Time { seconds: 45 }, None, Some("Fast")),
                        work(
                            Goal::Time { seconds: 30 },
                            Some(Alert::Pace { value: 3.5 }),
                            Some("Slow")
                        ),
                        recovery(15),
                    ],
                    iterations: 2,
                },
            ]
        );
    }

    #[test]
    fn test_empty_intervals_builds_empty_plan() {
        let plan = build(&doc("running", vec![])).unwrap();
        assert!(plan.warmup.is_none());
        assert!(plan.cooldown.is_none());
        assert!(plan.blocks.is_empty());
    }

    #[test]
    fn test_second_warmup_and_cooldown_are_demoted() {
        let plan = build(&doc(
            "running",
            vec![
                IntervalNode::Warmup {
                    duration_seconds: 300,
                    target: None,
                },
                IntervalNode::Warmup {
                    duration_seconds: 120,
                    target: Some(Target {
                        heart_rate_zone: Some(2),
                        pace: None,
                    }),
                },
                IntervalNode::Cooldown {
                    duration_seconds: 200,
                    target: None,
                },
                IntervalNode::Cooldown {
                    duration_seconds: 100,
                    target: None,
                },
            ],
        ))
        .unwrap();

        assert_eq!(
            plan.warmup,
            Some(work(Goal::Time { seconds: 300 }, None, Some("Warmup")))
        );
        assert_eq!(
            plan.cooldown,
            Some(work(Goal::Time { seconds: 200 }, None, Some("Cooldown")))
        );
        assert_eq!(plan.blocks.len(), 1);
        assert_eq!(plan.blocks[0].iterations, 1);
        assert_eq!(
            plan.blocks[0].steps,
            vec![
                work(
                    Goal::Time { seconds: 120 },
                    Some(Alert::HeartRateZone { zone: 2 }),
                    Some("Warmup")
                ),
                work(Goal::Time { seconds: 100 }, None, Some("Cooldown")),
            ]
        );
    }

    #[test]
    fn test_bare_steps_coalesce_across_edges() {
        let plan = build(&doc(
            "running",
            vec![
                IntervalNode::Step(timed_step(10, "A")),
                IntervalNode::Cooldown {
                    duration_seconds: 60,
                    target: None,
                },
                IntervalNode::Step(timed_step(20, "B")),
            ],
        ))
        .unwrap();

        assert_eq!(plan.blocks.len(), 1);
        assert_eq!(plan.blocks[0].steps.len(), 2);
        assert_eq!(plan.blocks[0].steps[1].display_name.as_deref(), Some("B"));
        assert!(plan.cooldown.is_some());
    }

    #[test]
    fn test_repeat_flushes_and_preserves_order() {
        let plan = build(&doc(
            "cycling",
            vec![
                IntervalNode::Step(timed_step(10, "A")),
                IntervalNode::RepeatSet {
                    repetitions: 4,
                    children: vec![timed_step(30, "R")],
                },
                IntervalNode::Step(timed_step(20, "B")),
                IntervalNode::Step(timed_step(25, "C")),
            ],
        ))
        .unwrap();

        let shape: Vec<(u32, usize)> = plan
            .blocks
            .iter()
            .map(|b| (b.iterations, b.steps.len()))
            .collect();
        assert_eq!(shape, vec![(1, 1), (4, 1), (1, 2)]);
        assert_eq!(plan.activity, Activity::Cycling);
    }

    #[test]
    fn test_empty_repeat_emits_no_block_but_still_flushes() {
        let plan = build(&doc(
            "running",
            vec![
                IntervalNode::Step(timed_step(10, "A")),
                IntervalNode::RepeatSet {
                    repetitions: 3,
                    children: vec![],
                },
                IntervalNode::Step(timed_step(20, "B")),
            ],
        ))
        .unwrap();

        assert_eq!(plan.blocks.len(), 2);
        assert!(plan.blocks.iter().all(|b| b.iterations == 1));
    }

    #[test]
    fn test_repeat_step_count_includes_recoveries() {
        let mut rested = timed_step(30, "Rested");
        rested.rest_seconds = Some(20);
        let mut zero_rest = timed_step(30, "Zero");
        zero_rest.rest_seconds = Some(0);
        let mut negative_rest = timed_step(30, "Negative");
        negative_rest.rest_seconds = Some(-5);

        let plan = build(&doc(
            "running",
            vec![IntervalNode::RepeatSet {
                repetitions: 5,
                children: vec![rested, zero_rest, negative_rest, timed_step(10, "Plain")],
            }],
        ))
        .unwrap();

        assert_eq!(plan.blocks.len(), 1);
        assert_eq!(plan.blocks[0].iterations, 5);
        assert_eq!(plan.blocks[0].steps.len(), 4 + 1);
        assert_eq!(plan.blocks[0].steps[1], recovery(20));
    }

    #[test]
    fn test_duration_wins_over_distance() {
        let step = StepNode {
            duration_seconds: Some(90),
            distance_meters: Some(400.0),
            ..StepNode::default()
        };
        let plan = build(&doc("running", vec![IntervalNode::Step(step)])).unwrap();
        assert_eq!(plan.blocks[0].steps[0].goal, Goal::Time { seconds: 90 });
    }

    #[test]
    fn test_distance_and_open_goals() {
        let distance = StepNode {
            distance_meters: Some(400.0),
            ..StepNode::default()
        };
        let reps_only = StepNode {
            reps: Some(12),
            ..StepNode::default()
        };
        let plan = build(&doc(
            "running",
            vec![IntervalNode::Step(distance), IntervalNode::Step(reps_only)],
        ))
        .unwrap();

        assert_eq!(
            plan.blocks[0].steps[0].goal,
            Goal::Distance { meters: 400.0 }
        );
        assert_eq!(plan.blocks[0].steps[1].goal, Goal::Open);
    }

    #[test]
    fn test_heart_rate_zone_beats_pace() {
        let step = StepNode {
            duration_seconds: Some(60),
            target: Some(Target {
                heart_rate_zone: Some(4),
                pace: Some(3.2),
            }),
            ..StepNode::default()
        };
        let empty_target = StepNode {
            duration_seconds: Some(60),
            target: Some(Target::default()),
            ..StepNode::default()
        };
        let plan = build(&doc(
            "running",
            vec![IntervalNode::Step(step), IntervalNode::Step(empty_target)],
        ))
        .unwrap();

        assert_eq!(
            plan.blocks[0].steps[0].alert,
            Some(Alert::HeartRateZone { zone: 4 })
        );
        assert_eq!(plan.blocks[0].steps[1].alert, None);
    }

    #[test]
    fn test_out_of_range_zone_keeps_alert_and_pace_is_fallback() {
        let document = decode_str(
            r#"{"title": "T", "sportType": "running", "intervals": [
                {"kind": "time", "seconds": 60, "target": {"hrZone": 300, "pace": 3.0}},
                {"kind": "time", "seconds": 60, "target": {"pace": 3.0}}
            ]}"#,
        )
        .unwrap();
        let plan = build(&document).unwrap();

        assert_eq!(
            plan.blocks[0].steps[0].alert,
            Some(Alert::HeartRateZone { zone: 300 })
        );
        assert_eq!(
            plan.blocks[0].steps[1].alert,
            Some(Alert::Pace { value: 3.0 })
        );
    }

    #[test]
    fn test_oversized_rest_is_clamped() {
        let step = StepNode {
            duration_seconds: Some(30),
            rest_seconds: Some(i64::from(u32::MAX) + 1),
            ..StepNode::default()
        };
        let plan = build(&doc("running", vec![IntervalNode::Step(step)])).unwrap();

        let recovery = &plan.blocks[0].steps[1];
        assert_eq!(recovery.role, StepRole::Recovery);
        assert_eq!(recovery.goal, Goal::Time { seconds: u32::MAX });
    }

    #[test]
    fn test_unknown_sport_maps_to_other() {
        let plan = build(&doc("underwater_hockey", vec![])).unwrap();
        assert_eq!(plan.activity, Activity::Other);
    }

    #[test]
    fn test_strict_sport_types_rejects_unknown() {
        let builder = PlanBuilder::new(BuilderConfig {
            strict_sport_types: true,
            ..BuilderConfig::default()
        });

        let err = builder.build(&doc("underwater_hockey", vec![])).unwrap_err();
        assert!(matches!(err, BuildError::UnknownSportType(ref tag) if tag == "underwater_hockey"));

        let plan = builder.build(&doc("swimming", vec![])).unwrap();
        assert_eq!(plan.activity, Activity::Swimming);
    }

    #[test]
    fn test_open_unsupported_distance_goals() {
        let document = decode_str(
            r#"{"title": "Strength Workout", "sportType": "strengthTraining", "intervals": [
                {"kind": "repeat", "reps": 1, "intervals": [
                    {"kind": "distance", "meters": 20},
                    {"kind": "reps", "reps": 10, "name": "Push Ups"}
                ]}
            ]}"#,
        )
        .unwrap();

        let lenient = build(&document).unwrap();
        assert_eq!(lenient.activity, Activity::TraditionalStrengthTraining);
        assert_eq!(lenient.step_count(), 2);
        assert_eq!(
            lenient.blocks[0].steps[0].goal,
            Goal::Distance { meters: 20.0 }
        );

        let builder = PlanBuilder::new(BuilderConfig {
            open_unsupported_distance_goals: true,
            ..BuilderConfig::default()
        });
        let opened = builder.build(&document).unwrap();
        assert_eq!(opened.blocks[0].steps[0].goal, Goal::Open);

        // Sports with distance support keep their distance goals
        let mut running = document.clone();
        running.sport_type = "running".into();
        let kept = builder.build(&running).unwrap();
        assert_eq!(kept.blocks[0].steps[0].goal, Goal::Distance { meters: 20.0 });
    }
}
