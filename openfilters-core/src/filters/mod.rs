//! Typed filter definitions on top of the pipeline engine.
//!
//! A filter names an extension point, builds the initial arguments from its
//! declared parameters, and unpacks the pipeline's final mapping into its
//! return type. With no pipeline configured every filter is the identity.

mod course_authoring;

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;

use crate::args::FilterArgs;
use crate::error::FilterError;
use crate::pipeline::{PipelineOutput, PipelineRunner};

pub use course_authoring::{CourseTemplateRequested, LmsPageUrlRequested};

/// Future returned by [`OpenFilter::run_pipeline`].
pub type PipelineFuture<'a> =
    Pin<Box<dyn Future<Output = Result<PipelineOutput, FilterError>> + Send + 'a>>;

/// A named extension point.
pub trait OpenFilter {
    /// Identifier used to look up this filter's pipeline.
    const FILTER_TYPE: &'static str;

    /// Run the pipeline configured for this filter over `args`.
    fn run_pipeline(runner: &PipelineRunner, args: FilterArgs) -> PipelineFuture<'_> {
        Box::pin(runner.run_pipeline(Self::FILTER_TYPE, args))
    }
}

/// Final mapping of a run; an object halt value overrides the keys it names.
pub(crate) fn output_args(
    filter_type: &str,
    output: PipelineOutput,
) -> Result<FilterArgs, FilterError> {
    let step = match &output {
        PipelineOutput::Halted { step, .. } => step.clone(),
        PipelineOutput::Completed(_) => String::new(),
    };
    output.into_args().ok_or_else(|| FilterError::InvalidOutput {
        filter_type: filter_type.to_string(),
        field: "*".to_string(),
        reason: format!("halt value from step '{}' is not an object", step),
    })
}

/// Read `field` from the final mapping, or `default` if no step set it.
pub(crate) fn extract_field<T: DeserializeOwned>(
    filter_type: &str,
    args: &FilterArgs,
    field: &str,
    default: T,
) -> Result<T, FilterError> {
    match args.get(field) {
        None => Ok(default),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| FilterError::InvalidOutput {
                filter_type: filter_type.to_string(),
                field: field.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
