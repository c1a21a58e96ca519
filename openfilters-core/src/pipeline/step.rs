//! Pipeline step trait and supporting types.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::args::FilterArgs;
use crate::error::StepError;

/// Metadata about a pipeline step.
#[derive(Debug, Clone)]
pub struct StepMetadata {
    /// Identifier used in pipeline configuration (e.g., "fetch_templates")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// What a step asks the runner to do with the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Leave the argument mapping as it is.
    NoChange,
    /// Merge these keys into the argument mapping and run the next step.
    Continue(FilterArgs),
    /// Stop the pipeline; this value is the final result.
    Halt(JsonValue),
}

impl StepOutcome {
    /// Halt with a mapping as the final result.
    pub fn halt_with_args(args: FilterArgs) -> Self {
        StepOutcome::Halt(args.into())
    }
}

impl From<FilterArgs> for StepOutcome {
    fn from(args: FilterArgs) -> Self {
        StepOutcome::Continue(args)
    }
}

/// Context provided to steps during execution.
pub struct StepContext<'a> {
    /// Filter type whose pipeline is running
    pub filter_type: &'a str,
    /// Arguments accumulated so far
    pub args: &'a FilterArgs,
    /// The filter's `extra_config`, shared by all of its steps
    pub extra_config: &'a Map<String, JsonValue>,
}

/// The main trait for pipeline steps.
///
/// Steps are registered once and shared across invocations, so they must not
/// keep per-invocation state.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Return metadata about this step.
    fn metadata(&self) -> StepMetadata;

    /// Run the step against the current arguments.
    async fn run_filter(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError>;
}
