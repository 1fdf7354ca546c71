use anyhow::Context;
use clap::{Parser, Subcommand};
use generator::profile::{build_metadata_stream, GeneratorConfig};
use std::fs;
use std::path::{Path, PathBuf};
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Inspect, normalize and generate analytics metadata streams")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long, global = true)]
    workflow: Option<PathBuf>,
    /// Seconds between repeated diagnostics from one failure site
    #[arg(long, default_value_t = 60, global = true)]
    throttle_secs: u64,
    /// Indent written documents
    #[arg(long, default_value_t = false, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a document and print a summary
    Inspect {
        input: PathBuf,
        /// Print the full parsed tree as JSON instead of the summary
        #[arg(long, default_value_t = false)]
        tree: bool,
    },
    /// Parse a document and write it back in canonical form
    Normalize {
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write a synthetic document
    Generate {
        /// Load generator settings from YAML
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        frames: Option<usize>,
        #[arg(long)]
        objects: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn emit(output: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.throttle_secs, args.pretty)
    };
    let runner = Runner::new(workflow_config);

    match args.command {
        Command::Inspect { input, tree } => {
            let raw = read_input(&input)?;
            let rendered = if tree {
                serde_json::to_string_pretty(&runner.parse(&raw)?)?
            } else {
                serde_json::to_string_pretty(&runner.inspect(&raw)?)?
            };
            println!("{rendered}");
        }
        Command::Normalize { input, output } => {
            let raw = read_input(&input)?;
            let normalized = runner.normalize(&raw)?;
            emit(output.as_deref(), &normalized)?;
        }
        Command::Generate {
            config,
            frames,
            objects,
            seed,
            output,
        } => {
            let mut generator_config = match config {
                Some(path) => GeneratorConfig::load(path)?,
                None => GeneratorConfig::default(),
            };
            if let Some(frames) = frames {
                generator_config.frames = frames;
            }
            if let Some(objects) = objects {
                generator_config.objects_per_frame = objects;
            }
            if let Some(seed) = seed {
                generator_config.seed = seed;
            }
            let stream = build_metadata_stream(&generator_config)?;
            log::info!(
                "generated {} frames with {} objects each",
                generator_config.frames,
                generator_config.objects_per_frame
            );
            emit(output.as_deref(), &runner.render(&stream)?)?;
        }
    }

    Ok(())
}
