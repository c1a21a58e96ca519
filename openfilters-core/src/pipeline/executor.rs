//! Pipeline runner and step registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{info_span, Instrument};

use crate::args::FilterArgs;
use crate::config::{ConfigProvider, FiltersConfig};
use crate::error::FilterError;
use crate::pipeline::step::{PipelineStep, StepContext, StepOutcome};

/// Registry that maps step names to their implementations.
#[derive(Default, Clone)]
pub struct StepRegistry {
    steps: BTreeMap<String, Arc<dyn PipelineStep>>,
}

impl StepRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step under its metadata name.
    pub fn register(&mut self, step: Arc<dyn PipelineStep>) {
        let name = step.metadata().name.to_string();
        self.steps.insert(name, step);
    }

    /// Register a step under an explicit identifier, e.g. a namespaced path.
    pub fn register_as(&mut self, name: impl Into<String>, step: Arc<dyn PipelineStep>) {
        self.steps.insert(name.into(), step);
    }

    /// Builder-style [`StepRegistry::register`].
    pub fn with_step(mut self, step: impl PipelineStep + 'static) -> Self {
        self.register(Arc::new(step));
        self
    }

    /// Get a step by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn PipelineStep>> {
        self.steps.get(name)
    }

    /// Registered step names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    /// Resolve every configured step for a filter type, in order.
    pub fn resolve(
        &self,
        filter_type: &str,
        pipeline: &[String],
    ) -> Result<Vec<(String, Arc<dyn PipelineStep>)>, FilterError> {
        pipeline
            .iter()
            .map(|name| {
                self.get(name)
                    .map(|step| (name.clone(), Arc::clone(step)))
                    .ok_or_else(|| FilterError::StepResolution {
                        filter_type: filter_type.to_string(),
                        step: name.clone(),
                    })
            })
            .collect()
    }

    /// Check a whole configuration against this registry.
    ///
    /// Returns every `StepResolution` error found, sorted by filter type.
    pub fn validate(&self, config: &FiltersConfig) -> Result<(), Vec<FilterError>> {
        let mut entries: Vec<_> = config.iter().collect();
        entries.sort_by_key(|(filter_type, _)| *filter_type);

        let errors: Vec<FilterError> = entries
            .into_iter()
            .flat_map(|(filter_type, filter)| {
                filter
                    .pipeline
                    .iter()
                    .filter(|name| self.get(name).is_none())
                    .map(move |name| FilterError::StepResolution {
                        filter_type: filter_type.to_string(),
                        step: name.clone(),
                    })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Final result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    /// Every step ran (or none was configured).
    Completed(FilterArgs),
    /// A step halted the pipeline with a final value. `args` is the mapping
    /// as it stood when the step ran.
    Halted {
        step: String,
        value: JsonValue,
        args: FilterArgs,
    },
}

impl PipelineOutput {
    pub fn is_halted(&self) -> bool {
        matches!(self, PipelineOutput::Halted { .. })
    }

    /// The result as a mapping.
    ///
    /// An object halt value is laid over the mapping accumulated before the
    /// halt, so keys it leaves out keep what earlier steps set. Any other
    /// halt value has no mapping form.
    pub fn into_args(self) -> Option<FilterArgs> {
        match self {
            PipelineOutput::Completed(args) => Some(args),
            PipelineOutput::Halted {
                value: JsonValue::Object(map),
                mut args,
                ..
            } => {
                args.merge(map.into());
                Some(args)
            }
            PipelineOutput::Halted { .. } => None,
        }
    }

    /// The result as a single JSON value.
    pub fn into_value(self) -> JsonValue {
        match self {
            PipelineOutput::Completed(args) => args.into(),
            PipelineOutput::Halted { value, .. } => value,
        }
    }
}

/// Runs the configured pipeline for a filter type.
#[derive(Clone)]
pub struct PipelineRunner {
    config: Arc<dyn ConfigProvider>,
    registry: Arc<StepRegistry>,
}

impl PipelineRunner {
    pub fn new(config: Arc<dyn ConfigProvider>, registry: Arc<StepRegistry>) -> Self {
        Self { config, registry }
    }

    /// Run the pipeline configured for `filter_type` over `args`.
    ///
    /// With no configuration the arguments come back unchanged. All steps are
    /// resolved before the first one runs; an unknown step is always an error.
    /// A failing step aborts the run unless the filter is `fail_silently`, in
    /// which case it is skipped and the mapping is left as it was.
    pub async fn run_pipeline(
        &self,
        filter_type: &str,
        args: FilterArgs,
    ) -> Result<PipelineOutput, FilterError> {
        let Some(config) = self.config.filter_config(filter_type)? else {
            tracing::debug!(filter_type, "no pipeline configured");
            return Ok(PipelineOutput::Completed(args));
        };

        let steps = self.registry.resolve(filter_type, &config.pipeline)?;
        let mut args = args;

        for (name, step) in steps {
            let ctx = StepContext {
                filter_type,
                args: &args,
                extra_config: &config.extra_config,
            };
            let result = step
                .run_filter(&ctx)
                .instrument(info_span!("pipeline_step", filter_type, step = %name))
                .await;

            match result {
                Ok(StepOutcome::NoChange) => {}
                Ok(StepOutcome::Continue(partial)) => {
                    tracing::debug!(filter_type, step = %name, keys = partial.len(), "merging step output");
                    args.merge(partial);
                }
                Ok(StepOutcome::Halt(value)) => {
                    tracing::info!(filter_type, step = %name, "pipeline halted");
                    return Ok(PipelineOutput::Halted {
                        step: name,
                        value,
                        args,
                    });
                }
                Err(e) if config.fail_silently => {
                    tracing::warn!(filter_type, step = %name, error = %e, "step failed, skipping");
                }
                Err(source) => {
                    return Err(FilterError::StepExecution {
                        filter_type: filter_type.to_string(),
                        step: name,
                        source,
                    });
                }
            }
        }

        Ok(PipelineOutput::Completed(args))
    }
}
