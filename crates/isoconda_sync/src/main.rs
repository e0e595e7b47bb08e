use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use isoconda_channel::LocalChannelReader;
use isoconda_sync::{CliOverrides, FileConfig};
use isoconda_types::Subdir;
use tracing_subscriber::EnvFilter;

/// `isoconda-sync`: resolve a Conda package subset against an upstream
/// channel and maintain a local mirror's patch instructions.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    verbose: Verbosity,

    /// Optional TOML config file providing defaults; CLI flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the requested specs against an upstream channel and, with
    /// `--reference`, report the add/remove diff against an existing mirror.
    /// Writes nothing.
    Plan {
        /// The upstream channel directory to resolve against.
        #[arg(long)]
        channel: Option<PathBuf>,

        /// An existing local mirror to diff the resolution against.
        #[arg(long)]
        reference: Option<PathBuf>,

        /// A required match-specification (root requirement). Repeatable.
        #[arg(long = "requirement")]
        requirements: Vec<String>,

        /// A match-specification whose matches are excluded. Repeatable.
        #[arg(long = "exclude")]
        exclusions: Vec<String>,

        /// A match-specification that participates in resolution but is not
        /// emitted in the result. Repeatable.
        #[arg(long = "disposable")]
        disposables: Vec<String>,

        /// Restrict resolution to these subdirs. Repeatable.
        #[arg(long = "subdir")]
        subdirs: Vec<String>,

        /// Keep only the latest version/build per package name.
        #[arg(long)]
        latest: bool,
    },

    /// Appends filenames to one subdir's `remove` list, leaving every other
    /// patch-instructions field untouched. Intended to be run after an
    /// external downloader has acted on a `plan` diff's `to_remove` set.
    Patch {
        /// The local mirror directory to update.
        #[arg(long)]
        channel: PathBuf,

        /// The subdir whose patch instructions are being updated.
        #[arg(long)]
        subdir: String,

        /// A filename to append to `remove`. Repeatable.
        #[arg(long = "remove")]
        remove: Vec<String>,
    },
}

fn init_logging(verbose: &Verbosity) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(config_path: Option<&PathBuf>, overrides: CliOverrides) -> anyhow::Result<FileConfig> {
    let file = match config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    Ok(file.merge_cli_overrides(overrides))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.verbose);

    match cli.command {
        Commands::Plan { channel, reference, requirements, exclusions, disposables, subdirs, latest } => {
            let overrides = CliOverrides {
                channel: channel.as_ref().map(|p| p.display().to_string()),
                reference: reference.as_ref().map(|p| p.display().to_string()),
                requirements,
                exclusions,
                disposables,
                subdirs,
                latest,
            };
            let config = load_config(cli.config.as_ref(), overrides)?;

            let channel_path = config.channel.as_deref().ok_or_else(|| anyhow::anyhow!("no channel directory given (--channel or config file)"))?;
            let channel_reader = LocalChannelReader::new(channel_path);
            let reference_reader = config.reference.as_deref().map(LocalChannelReader::new);

            let outcome = isoconda_sync::plan(
                &channel_reader,
                reference_reader.as_ref().map(|r| r as &dyn isoconda_channel::ChannelReader),
                &config,
            )?;

            println!("resolved {} package(s)", outcome.records.len());
            if let Some(diff) = outcome.diff {
                println!(
                    "diff against reference: +{} -{} ={}",
                    diff.to_add.len(),
                    diff.to_remove.len(),
                    diff.unchanged.len()
                );
                for record in &diff.to_add {
                    println!("  {} {record}", console::style("+").bold().green());
                }
                for record in &diff.to_remove {
                    println!("  {} {record}", console::style("-").bold().red());
                }
            }
            Ok(())
        }

        Commands::Patch { channel, subdir, remove } => {
            let channel_reader = LocalChannelReader::new(&channel);
            let subdir = Subdir::new(subdir);
            let instructions = isoconda_sync::merge_removals(&channel_reader, &subdir, remove)?;
            isoconda_sync::write_instructions(&channel, &subdir, &instructions)?;
            println!("{} file(s) now recorded in `remove` for {}", instructions.remove.len(), subdir);
            Ok(())
        }
    }
}
