//! Pipeline step implementations shipped with the crate.

mod fetch_templates;

use std::sync::Arc;

pub use fetch_templates::{FetchTemplatesStep, TemplateFetchError, FALLBACK_TEMPLATES_KEY};

use crate::http::HttpClient;
use crate::pipeline::StepRegistry;

/// Registry containing every built-in step, sharing one HTTP client.
pub fn builtin_registry<C: HttpClient + 'static>(client: C) -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register(Arc::new(FetchTemplatesStep::new(client)));
    registry
}
