//! fastapi-codegen CLI entrypoint
//! Parses command-line arguments and dispatches to the generator.
#![deny(unsafe_code)]

use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use fastapi_codegen::config::Config;
use fastapi_codegen::generation::{Generator, SchemaLoader};
use fastapi_codegen::infrastructure::openapi::CompositeSchemaLoader;
use fastapi_codegen::infrastructure::templates::BuiltinTemplates;

#[derive(Parser)]
#[command(name = "fastapi-codegen")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path or URL of the OpenAPI document (YAML or JSON), `-` for stdin
    #[arg(short, long, required = true)]
    input: Option<String>,
    /// Directory the generated files are written to
    #[arg(short, long, required = true)]
    output: Option<PathBuf>,
    /// Render this template tree instead of the built-in one
    #[arg(short, long)]
    template_dir: Option<PathBuf>,
    /// Configuration file (defaults to ./fastapi-codegen.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Leave the timestamp out of generated file headers
    #[arg(long)]
    disable_timestamp: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect or export the built-in templates
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// List the built-in template files
    List,
    /// Copy the built-in templates into a directory for customisation
    Export {
        /// Destination directory
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.generate.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Templates { action }) => match action {
            TemplateCommands::List => {
                for file in BuiltinTemplates::tree().files() {
                    println!("{}", file.name());
                }
            }
            TemplateCommands::Export { dir } => {
                let written = BuiltinTemplates::export(&dir)
                    .await
                    .with_context(|| format!("Failed to export templates to {}", dir.display()))?;
                for path in written {
                    println!("{}", path.display());
                }
            }
        },
        None => generate(cli.generate).await?,
    }
    Ok(())
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let input = args.input.context("--input is required")?;
    let output = args.output.context("--output is required")?;

    let mut config =
        Config::discover(args.config.as_deref()).context("Failed to load configuration")?;
    if args.template_dir.is_some() {
        config.template_dir = args.template_dir;
    }
    config.disable_timestamp |= args.disable_timestamp;

    let loader = CompositeSchemaLoader::new()?;
    let document = loader
        .load(&input)
        .await
        .with_context(|| format!("Failed to load OpenAPI document from {input}"))?;

    let generator = Generator::new(config).context("Invalid configuration")?;
    let report = generator
        .generate(&document, &output)
        .await
        .context("Failed to generate code")?;

    for path in report.files.iter().chain(&report.model_file) {
        info!(path = %path.display(), "Generated");
    }
    Ok(())
}
