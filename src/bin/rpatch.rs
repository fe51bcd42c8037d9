//! rpatch - apply patch configurations to a set of resources
//!
//! Reads a multi-document YAML file of resources, applies a patch or a
//! strategic-merge configuration to it and prints the result.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use resource_patch::loader::FileLoader;
use resource_patch::resource::ResourceCollection;
use resource_patch::transform::{
    PatchConfig, PatchStrategicMergeConfig, PatchTransformer, StrategicMergeTransformer,
    Transformer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConfigKind {
    /// A single strategic-merge or JSON-Patch patch with an optional target
    Patch,
    /// Strategic-merge patches addressing resources by their own identity
    StrategicMerge,
}

#[derive(Debug, Parser)]
#[command(name = "rpatch", version, about = "Apply patches to resource documents")]
struct Cli {
    /// Multi-document YAML file holding the resources
    #[arg(short, long)]
    resources: PathBuf,

    /// Patch configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Shape of the configuration file
    #[arg(short, long, value_enum, default_value = "patch")]
    kind: ConfigKind,

    /// Directory patch paths are resolved against (default: the config's directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output location. Use '-' for stdout
    #[arg(short, long, default_value = "-")]
    output: String,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resource_patch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let resources = fs::read_to_string(&cli.resources)
        .map_err(|e| format!("Failed to read resources file {:?}: {}", cli.resources, e))?;
    let config = fs::read_to_string(&cli.config)
        .map_err(|e| format!("Failed to read config file {:?}: {}", cli.config, e))?;

    let root = cli.root.clone().unwrap_or_else(|| {
        cli.config
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let loader = FileLoader::new(root);

    let transformer: Box<dyn Transformer> = match cli.kind {
        ConfigKind::Patch => Box::new(PatchTransformer::configure(
            &PatchConfig::from_yaml(&config)?,
            &loader,
        )?),
        ConfigKind::StrategicMerge => Box::new(StrategicMergeTransformer::configure(
            &PatchStrategicMergeConfig::from_yaml(&config)?,
            &loader,
        )?),
    };

    let mut collection = ResourceCollection::from_yaml(&resources)?;
    transformer.transform(&mut collection)?;

    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };
    write!(output, "{}", collection.to_yaml()?)?;
    Ok(())
}
