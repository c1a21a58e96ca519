mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "openfilters")]
#[command(about = "Run and check open filter pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline configured for a filter type and print the result as JSON
    Run {
        /// Filter type, e.g. org.openedx.templates.fetch.requested.v1
        filter_type: String,
        /// Argument as key=value; the value is parsed as JSON, else kept as a string
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
        /// Filters config file (default: $OPENFILTERS_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Check that every configured step is a registered step
    Validate {
        /// Filters config file (default: $OPENFILTERS_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the built-in steps
    Steps,
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            filter_type,
            args,
            config,
        } => {
            let output = commands::run(&filter_type, &args, config.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Validate { config } => {
            let count = commands::validate(config.as_deref())?;
            println!("{} filter(s) OK", count);
        }
        Commands::Steps => {
            for (name, description) in commands::steps()? {
                println!("{:<24} {}", name, description);
            }
        }
    }

    Ok(())
}
