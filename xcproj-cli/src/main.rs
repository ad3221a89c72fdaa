//! xcproj CLI
//!
//! Command-line interface for inspecting and editing Xcode project graphs.
//! Input is the JSON form of a project file (`plutil -convert json`);
//! output is the textual project format.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use xcproj_core::{
    writer, BuildConfiguration, CodecConfig, ObjectReference, PbxProj, ProductType, TargetKind,
    CONFIG_FILE_NAME,
};

#[derive(Parser)]
#[command(name = "xcproj")]
#[command(about = "Xcode project graph inspection and editing tool")]
#[command(version)]
struct Cli {
    /// Config file (default: ./xcproj.json, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON project as a textual project file
    Encode {
        /// JSON project file
        input: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List targets
    Targets {
        /// JSON project file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the encoded record of one object
    Show {
        /// JSON project file
        input: PathBuf,

        /// Object identifier
        id: String,
    },

    /// Set a build setting on a configuration
    SetSetting {
        /// JSON project file
        input: PathBuf,

        /// Build configuration identifier
        #[arg(long)]
        configuration: String,

        key: String,

        value: String,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove a build setting from a configuration
    RemoveSetting {
        /// JSON project file
        input: PathBuf,

        /// Build configuration identifier
        #[arg(long)]
        configuration: String,

        key: String,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default xcproj.json
    InitConfig {
        /// Directory to write into (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("xcproj=info".parse().context("Invalid log directive")?)
                .add_directive("xcproj_core=info".parse().context("Invalid log directive")?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Encode { input, output } => cmd_encode(&input, output.as_deref(), &config),
        Commands::Targets { input, json } => cmd_targets(&input, json),
        Commands::Show { input, id } => cmd_show(&input, &id, &config),
        Commands::SetSetting {
            input,
            configuration,
            key,
            value,
            output,
        } => cmd_edit_setting(&input, &configuration, output.as_deref(), &config, |c| {
            c.adding_build(&key, value.as_str())
        }),
        Commands::RemoveSetting {
            input,
            configuration,
            key,
            output,
        } => cmd_edit_setting(&input, &configuration, output.as_deref(), &config, |c| {
            c.removing_build(&key)
        }),
        Commands::InitConfig { path } => cmd_init_config(path),
    }
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    match path {
        Some(path) => CodecConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            CodecConfig::discover(&cwd).context("Failed to load config")
        }
    }
}

/// Fill in the project name from `App.xcodeproj/project.json` or `App.json`
fn with_project_name(config: &CodecConfig, input: &Path) -> CodecConfig {
    let mut config = config.clone();
    if config.project_name.is_none() {
        let bundle = input
            .parent()
            .filter(|dir| dir.extension().is_some_and(|ext| ext == "xcodeproj"));
        config.project_name = bundle
            .unwrap_or(input)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }
    config
}

fn load_project(input: &Path) -> Result<PbxProj> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let project = PbxProj::from_json_str(&content)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    tracing::info!(
        "Loaded {} objects from {}",
        project.objects.len(),
        input.display()
    );
    Ok(project)
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Render a project as text
fn cmd_encode(input: &Path, output: Option<&Path>, config: &CodecConfig) -> Result<()> {
    let project = load_project(input)?;
    let config = with_project_name(config, input);
    let text = project.to_text(&config).context("Failed to encode project")?;
    emit(&text, output)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetSummary<'a> {
    id: &'a ObjectReference,
    name: &'a str,
    kind: TargetKind,
    product_type: Option<ProductType>,
    build_phases: usize,
    build_rules: usize,
    dependencies: usize,
}

/// List targets
fn cmd_targets(input: &Path, json: bool) -> Result<()> {
    let project = load_project(input)?;
    let summaries: Vec<TargetSummary<'_>> = project
        .objects
        .targets()
        .map(|(id, target)| TargetSummary {
            id,
            name: &target.name,
            kind: target.kind,
            product_type: target.product_type,
            build_phases: target.build_phases.len(),
            build_rules: target.build_rules.len(),
            dependencies: target.dependencies.len(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No targets.");
        return Ok(());
    }
    for summary in &summaries {
        println!(
            "{}  {:<24} {:<20} phases={} rules={} deps={}",
            summary.id,
            summary.name,
            summary.kind,
            summary.build_phases,
            summary.build_rules,
            summary.dependencies
        );
        if let Some(product_type) = summary.product_type {
            println!("    {}", product_type);
        }
    }
    Ok(())
}

/// Print one object's record
fn cmd_show(input: &Path, id: &str, config: &CodecConfig) -> Result<()> {
    let project = load_project(input)?;
    let Some(reference) = project.objects.reference(id) else {
        bail!("No object with identifier {}", id);
    };
    let (key, value) = project
        .encode_object(&reference, &with_project_name(config, input))
        .with_context(|| format!("Failed to encode {}", id))?;
    print!("{}", writer::write_record(&key, &value));
    Ok(())
}

/// Replace a build configuration with an edited copy and write the project
fn cmd_edit_setting<F>(
    input: &Path,
    configuration: &str,
    output: Option<&Path>,
    config: &CodecConfig,
    edit: F,
) -> Result<()>
where
    F: FnOnce(&BuildConfiguration) -> BuildConfiguration,
{
    let mut project = load_project(input)?;
    let Some(reference) = project.objects.reference(configuration) else {
        bail!("No object with identifier {}", configuration);
    };

    let current = project
        .objects
        .build_configuration_mut(&reference)
        .with_context(|| format!("{} is not a build configuration", configuration))?;
    let edited = edit(&*current);
    tracing::info!(
        "Configuration {} \"{}\": {} -> {} settings",
        reference,
        edited.name,
        current.build_settings.len(),
        edited.build_settings.len()
    );
    *current = edited;

    let config = with_project_name(config, input);
    let text = project.to_text(&config).context("Failed to encode project")?;
    emit(&text, output)
}

/// Write a default config file
fn cmd_init_config(path: Option<PathBuf>) -> Result<()> {
    let dir = match path {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }
    CodecConfig::default()
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Wrote {}", config_path.display());
    Ok(())
}
