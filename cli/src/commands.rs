//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use openfilters_core::{
    builtin_registry, FilterArgs, FiltersConfig, PipelineOutput, PipelineRunner, ReqwestClient,
    StepRegistry,
};
use serde_json::Value as JsonValue;

fn load_config(path: Option<&Path>) -> Result<FiltersConfig> {
    let config = match path {
        Some(path) => FiltersConfig::from_file(path)?,
        None => FiltersConfig::from_env()?,
    };
    if config.is_empty() {
        tracing::warn!("no filters configured, every filter passes its arguments through");
    }
    Ok(config)
}

fn registry() -> Result<StepRegistry> {
    let client = ReqwestClient::new().context("Failed to build HTTP client")?;
    Ok(builtin_registry(client))
}

/// Parse a `key=value` argument. The value is JSON if it parses, else a string.
pub fn parse_arg(raw: &str) -> Result<(String, JsonValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got: {}", raw))?;
    if key.is_empty() {
        bail!("Empty argument name in: {}", raw);
    }

    let value =
        serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub async fn run(
    filter_type: &str,
    raw_args: &[String],
    config: Option<&Path>,
) -> Result<JsonValue> {
    let config = load_config(config)?;
    let args = raw_args
        .iter()
        .map(|raw| parse_arg(raw))
        .collect::<Result<FilterArgs>>()?;

    let runner = PipelineRunner::new(Arc::new(config), Arc::new(registry()?));
    let output = runner.run_pipeline(filter_type, args).await?;

    if let PipelineOutput::Halted { step, .. } = &output {
        tracing::info!(filter_type, step = %step, "pipeline halted early");
    }
    Ok(output.into_value())
}

/// Validate the config against the built-in steps, returning the number of filters.
pub fn validate(config: Option<&Path>) -> Result<usize> {
    let config = load_config(config)?;
    let registry = registry()?;

    if let Err(errors) = registry.validate(&config) {
        let lines: Vec<String> = errors.iter().map(|e| format!("  {}", e)).collect();
        bail!("Invalid filters config:\n{}", lines.join("\n"));
    }

    Ok(config.iter().count())
}

/// Names and descriptions of the built-in steps.
pub fn steps() -> Result<Vec<(String, &'static str)>> {
    let registry = registry()?;
    Ok(registry
        .names()
        .filter_map(|name| {
            registry
                .get(name)
                .map(|step| (name.to_string(), step.metadata().description))
        })
        .collect())
}
