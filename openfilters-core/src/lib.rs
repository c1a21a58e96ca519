pub mod args;
pub mod config;
pub mod error;
pub mod filters;
pub mod http;
pub mod pipeline;

pub use args::FilterArgs;
pub use config::{ConfigProvider, FileConfigProvider, FilterConfig, FiltersConfig};
pub use error::{ConfigError, FetchError, FilterError, StepError};
pub use filters::{CourseTemplateRequested, LmsPageUrlRequested, OpenFilter, PipelineFuture};
pub use http::{HttpClient, MockClient, MockResponse, ReqwestClient, ReqwestClientBuilder};
pub use pipeline::steps::{builtin_registry, FetchTemplatesStep};
pub use pipeline::{
    PipelineOutput, PipelineRunner, PipelineStep, StepContext, StepMetadata, StepOutcome,
    StepRegistry,
};
