//! Filters for the course authoring subdomain.

use crate::args::FilterArgs;
use crate::error::FilterError;
use crate::filters::{extract_field, output_args, OpenFilter};
use crate::pipeline::{PipelineOutput, PipelineRunner};

/// Lets steps rewrite an LMS page URL, with the course org as context.
pub struct LmsPageUrlRequested;

impl OpenFilter for LmsPageUrlRequested {
    const FILTER_TYPE: &'static str = "org.openedx.course_authoring.lms.page.url.requested.v1";
}

impl LmsPageUrlRequested {
    /// Run the filter and return the (possibly rewritten) `(url, org)`.
    ///
    /// A field no step touched comes back as it was passed in.
    pub async fn run_filter(
        runner: &PipelineRunner,
        url: impl Into<String>,
        org: impl Into<String>,
    ) -> Result<(String, String), FilterError> {
        let url = url.into();
        let org = org.into();
        let args = FilterArgs::new()
            .with("url", url.clone())
            .with("org", org.clone());

        let output = Self::run_pipeline(runner, args).await?;
        let data = output_args(Self::FILTER_TYPE, output)?;

        Ok((
            extract_field(Self::FILTER_TYPE, &data, "url", url)?,
            extract_field(Self::FILTER_TYPE, &data, "org", org)?,
        ))
    }
}

/// Fetches course templates from a dynamic source.
///
/// `source_type` names the source (e.g. "github"); the remaining arguments,
/// usually `source_config`, describe where to fetch from. Steps replace
/// `source_config` with the fetched templates.
pub struct CourseTemplateRequested;

impl OpenFilter for CourseTemplateRequested {
    const FILTER_TYPE: &'static str = "org.openedx.templates.fetch.requested.v1";
}

impl CourseTemplateRequested {
    /// Run the filter and return the pipeline's output as-is.
    ///
    /// `source_type` wins over a `source_type` key in `extra`.
    pub async fn run_filter(
        runner: &PipelineRunner,
        source_type: impl Into<String>,
        extra: FilterArgs,
    ) -> Result<PipelineOutput, FilterError> {
        let mut args = FilterArgs::new().with("source_type", source_type.into());
        for (key, value) in extra {
            if !args.contains_key(&key) {
                args.insert(key, value);
            }
        }

        Self::run_pipeline(runner, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, FiltersConfig};
    use crate::error::StepError;
    use crate::pipeline::{PipelineStep, StepContext, StepMetadata, StepOutcome, StepRegistry};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ForceHttps;

    #[async_trait]
    impl PipelineStep for ForceHttps {
        fn metadata(&self) -> StepMetadata {
            StepMetadata {
                name: "force_https",
                description: "Rewrite http:// URLs to https://",
            }
        }

        async fn run_filter(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
            let url = ctx.args.get_str("url").ok_or("url missing")?;
            match url.strip_prefix("http://") {
                Some(rest) => {
                    let https = format!("https://{}", rest);
                    Ok(FilterArgs::new().with("url", https).into())
                }
                None => Ok(StepOutcome::NoChange),
            }
        }
    }

    struct Rewrite;

    #[async_trait]
    impl PipelineStep for Rewrite {
        fn metadata(&self) -> StepMetadata {
            StepMetadata {
                name: "rewrite",
                description: "Point the URL at a fixed host",
            }
        }

        async fn run_filter(&self, _ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
            Ok(FilterArgs::new().with("url", "https://rewritten").into())
        }
    }

    struct HaltOrg;

    #[async_trait]
    impl PipelineStep for HaltOrg {
        fn metadata(&self) -> StepMetadata {
            StepMetadata {
                name: "halt_org",
                description: "Halt with only the org replaced",
            }
        }

        async fn run_filter(&self, _ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
            Ok(StepOutcome::halt_with_args(FilterArgs::new().with("org", "Y")))
        }
    }

    struct Count(Arc<AtomicUsize>);

    #[async_trait]
    impl PipelineStep for Count {
        fn metadata(&self) -> StepMetadata {
            StepMetadata {
                name: "count",
                description: "Counts its runs",
            }
        }

        async fn run_filter(&self, _ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(StepOutcome::NoChange)
        }
    }

    fn runner_with(filter_type: &str, steps: &[&str]) -> PipelineRunner {
        let config =
            FiltersConfig::new().with_filter(filter_type, FilterConfig::new(steps.to_vec()));
        let registry = StepRegistry::new().with_step(ForceHttps);
        PipelineRunner::new(Arc::new(config), Arc::new(registry))
    }

    #[tokio::test]
    async fn test_lms_page_url_identity_without_pipeline() {
        let runner = runner_with("unrelated.filter.v1", &["force_https"]);
        let result = LmsPageUrlRequested::run_filter(&runner, "http://lms.example.com", "edX")
            .await
            .unwrap();
        assert_eq!(
            result,
            ("http://lms.example.com".to_string(), "edX".to_string())
        );
    }

    #[tokio::test]
    async fn test_lms_page_url_rewritten_by_step() {
        let runner = runner_with(LmsPageUrlRequested::FILTER_TYPE, &["force_https"]);
        let (url, org) = LmsPageUrlRequested::run_filter(&runner, "http://lms.example.com/x", "edX")
            .await
            .unwrap();
        assert_eq!(url, "https://lms.example.com/x");
        assert_eq!(org, "edX");
    }

    #[tokio::test]
    async fn test_lms_page_url_halt_keeps_earlier_rewrite() {
        let runs = Arc::new(AtomicUsize::new(0));
        let config = FiltersConfig::new().with_filter(
            LmsPageUrlRequested::FILTER_TYPE,
            FilterConfig::new(["rewrite", "halt_org", "count"]),
        );
        let registry = StepRegistry::new()
            .with_step(Rewrite)
            .with_step(HaltOrg)
            .with_step(Count(Arc::clone(&runs)));
        let runner = PipelineRunner::new(Arc::new(config), Arc::new(registry));

        let result = LmsPageUrlRequested::run_filter(&runner, "http://orig", "edX")
            .await
            .unwrap();
        assert_eq!(result, ("https://rewritten".to_string(), "Y".to_string()));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_course_template_declared_source_type_wins() {
        let runner = runner_with("unrelated.filter.v1", &[]);
        let extra = FilterArgs::new()
            .with("source_type", "s3")
            .with("source_config", "https://example.com/t.json");

        let output = CourseTemplateRequested::run_filter(&runner, "github", extra)
            .await
            .unwrap();
        assert_eq!(
            output.into_value(),
            json!({"source_type": "github", "source_config": "https://example.com/t.json"})
        );
    }
}
