//! Service facade chaining decode → build → save.

use crate::builder::PlanBuilder;
use crate::config::BuilderConfig;
use crate::decoder;
use crate::store::{PlanSink, ScheduledPlan};
use crate::{ExecutionPlan, Result, WorkoutPlanDocument};
use chrono::NaiveDateTime;

/// Entry point for turning workout JSON into scheduled plans
pub struct WorkoutSync<S: PlanSink> {
    builder: PlanBuilder,
    sink: S,
}

impl<S: PlanSink> WorkoutSync<S> {
    pub fn new(sink: S) -> Self {
        Self::with_builder(PlanBuilder::default(), sink)
    }

    pub fn with_options(options: BuilderConfig, sink: S) -> Self {
        Self::with_builder(PlanBuilder::new(options), sink)
    }

    pub fn with_builder(builder: PlanBuilder, sink: S) -> Self {
        Self { builder, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Decode JSON bytes into a document
    pub fn parse(&self, bytes: &[u8]) -> Result<WorkoutPlanDocument> {
        Ok(decoder::decode(bytes)?)
    }

    /// Decode JSON text into a document
    pub fn parse_str(&self, text: &str) -> Result<WorkoutPlanDocument> {
        Ok(decoder::decode_str(text)?)
    }

    /// Build the execution plan for a document
    pub fn convert(&self, document: &WorkoutPlanDocument) -> Result<ExecutionPlan> {
        Ok(self.builder.build(document)?)
    }

    /// Build a document's plan and hand it to the sink
    pub fn save(
        &mut self,
        document: &WorkoutPlanDocument,
        schedule_at: Option<NaiveDateTime>,
    ) -> Result<ScheduledPlan> {
        let plan = self.convert(document)?;
        self.sink.save(plan, schedule_at)
    }

    pub fn parse_and_save(
        &mut self,
        bytes: &[u8],
        schedule_at: Option<NaiveDateTime>,
    ) -> Result<ScheduledPlan> {
        let document = self.parse(bytes)?;
        self.save(&document, schedule_at)
    }

    pub fn parse_str_and_save(
        &mut self,
        text: &str,
        schedule_at: Option<NaiveDateTime>,
    ) -> Result<ScheduledPlan> {
        self.parse_and_save(text.as_bytes(), schedule_at)
    }
}
