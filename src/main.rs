use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{info, warn};

use unet_graph::{
    BuildConfig, Result, build_unet,
    storage::{FsObjectStore, ObjectStore, StorageCredentials, stage_objects},
};

#[derive(Parser)]
#[command(name = "unet-graph", version, about = "Build and inspect U-Net segmentation graphs")]
struct Cli {
    /// JSON build configuration, defaults are used for missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the encoder depth
    #[arg(long)]
    num_layers: Option<usize>,

    /// Print the per-layer table
    #[arg(long)]
    summary: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Copy every object under a prefix from a directory bucket
    Stage {
        #[arg(long)]
        root: PathBuf,

        #[arg(long, default_value = "")]
        prefix: String,

        #[arg(long)]
        dest: PathBuf,

        /// Secrets file with an `s3` section
        #[arg(long)]
        credentials: Option<PathBuf>,
    },

    /// Store a local file in a directory bucket under `key`
    Upload {
        #[arg(long)]
        root: PathBuf,

        #[arg(long)]
        source: PathBuf,

        #[arg(long)]
        key: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Stage {
            root,
            prefix,
            dest,
            credentials,
        }) => stage(root, &prefix, dest, credentials),
        Some(Command::Upload { root, source, key }) => {
            FsObjectStore::new(root)?.upload_object(&source, &key)?;
            info!("Uploaded {} as {}", source.display(), key);
            Ok(())
        }
        None => build(cli.config, cli.num_layers, cli.summary),
    }
}

fn build(config: Option<PathBuf>, num_layers: Option<usize>, summary: bool) -> Result<()> {
    let mut config = match config {
        Some(path) => BuildConfig::from_file(path)?,
        None => BuildConfig::default(),
    };
    if let Some(num_layers) = num_layers {
        config.num_layers = num_layers;
    }

    let unet = build_unet(&config)?;

    if summary {
        print!("{}", unet.summary()?);
    } else {
        println!(
            "{} -> {} ({} layers, {} parameters)",
            unet.input_shape()?,
            unet.output_shape()?,
            unet.model.len(),
            unet.model.parameter_count()?
        );
    }

    Ok(())
}

fn stage(
    root: PathBuf,
    prefix: &str,
    dest: PathBuf,
    credentials: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = credentials {
        let credentials = StorageCredentials::from_file(path)?;
        info!("Using bucket {}", credentials.default_bucket);
    }

    let store = FsObjectStore::new(root)?;
    let report = stage_objects(&store, prefix, &dest)?;

    println!(
        "Staged {} objects into {}",
        report.downloaded.len(),
        dest.display()
    );
    for (key, err) in &report.failed {
        warn!("Skipped {}: {}", key, err);
    }

    Ok(())
}
