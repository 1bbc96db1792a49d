#![forbid(unsafe_code)]

//! Core of the workout plan sync pipeline.
//!
//! This crate provides:
//! - Decoding of workout JSON with polymorphic intervals
//! - Restructuring into a platform-neutral execution plan
//! - Sport to activity mapping
//! - A plan sink interface with a JSON Lines store
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod sport;
pub mod config;
pub mod logging;
pub mod decoder;
pub mod builder;
pub mod store;
pub mod service;

// Re-export commonly used types
pub use error::{BuildError, DecodeError, Error, Result};
pub use types::*;
pub use sport::{Activity, SportType};
pub use config::{BuilderConfig, Config};
pub use decoder::{decode, decode_str};
pub use builder::{build, PlanBuilder};
pub use store::{read_scheduled, JsonlPlanStore, PlanSink, ScheduledPlan};
pub use service::WorkoutSync;
