mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use namefaces_core::images::{RepositoryConfig, DEFAULT_JPEG_QUALITY};
use namefaces_core::Roster;
use tracing_subscriber::EnvFilter;

/// Names to Faces: put names to photos of people
#[derive(Parser)]
#[command(name = "nfaces", version, about)]
struct Cli {
    /// Directory holding the stored images
    #[arg(long, env = "NAMEFACES_IMAGES_DIR", default_value_os_t = RepositoryConfig::default_root())]
    images_dir: PathBuf,

    /// JPEG quality used when storing photos (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (the default)
    Shell,
    /// Inspect or clean up the image directory
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
}

#[derive(Subcommand)]
enum ImagesAction {
    /// List every stored image
    List,
    /// Delete stored images that no person refers to
    Prune {
        /// Actually delete; without it only the count is shown
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = RepositoryConfig::new(cli.images_dir).with_quality(cli.quality);
    let mut roster = Roster::open(config)?;

    match cli.command {
        None | Some(Commands::Shell) => commands::session::run(&mut roster)?,
        Some(Commands::Images { action }) => match action {
            ImagesAction::List => commands::images::list(&roster)?,
            ImagesAction::Prune { yes } => commands::images::prune(&roster, yes)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_images_dir_is_path() {
        let cli = Cli::try_parse_from(["nfaces", "--images-dir", "/tmp/my images", "shell"]).unwrap();
        assert_eq!(cli.images_dir, PathBuf::from("/tmp/my images"));
        assert!(matches!(cli.command, Some(Commands::Shell)));
    }
}
