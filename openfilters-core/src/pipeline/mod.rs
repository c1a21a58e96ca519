//! Generic pipeline engine for open filters.
//!
//! This module provides a trait-based pipeline system where:
//! - Steps are defined via the `PipelineStep` trait and registered by name
//! - Each filter type's step list comes from a `ConfigProvider`
//! - Steps return a `StepOutcome`: leave the arguments alone, merge new ones, or halt
//! - `fail_silently` decides whether a failing step aborts the run or is skipped

mod executor;
mod step;
pub mod steps;

pub use executor::{PipelineOutput, PipelineRunner, StepRegistry};
pub use step::{PipelineStep, StepContext, StepMetadata, StepOutcome};
