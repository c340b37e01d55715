// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use bandwerk_core::config::OutputFormat;
use bandwerk_core::keys::album_id_from_url;
use bandwerk_core::{BandwerkError, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "bandwerk", version, about = "Restore images that were cut into bands and reordered")]
pub struct Cli {
    /// JSON config file (see `AppConfig`); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the band count for an album/photo pair
    Plan(PlanArgs),
    /// Restore a single image file
    Restore(RestoreArgs),
    /// Restore every numbered image in a directory
    Batch(BatchArgs),
}

/// Album id, given directly or as the album page URL.
#[derive(Args, Debug)]
pub struct AlbumArgs {
    /// Numeric album id
    #[arg(short, long, required_unless_present = "album_url", conflicts_with = "album_url")]
    pub album_id: Option<u64>,

    /// Album page URL containing `/photo/<id>`
    #[arg(long)]
    pub album_url: Option<String>,
}

impl AlbumArgs {
    pub fn resolve(&self) -> Result<u64> {
        match (self.album_id, &self.album_url) {
            (Some(id), _) => Ok(id),
            (None, Some(url)) => album_id_from_url(url),
            (None, None) => Err(BandwerkError::InvalidKey(
                "album id or album url is required".into(),
            )),
        }
    }
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub album: AlbumArgs,

    /// Photo id, verbatim (e.g. 00001)
    #[arg(short, long)]
    pub photo_id: String,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Scrambled input image
    pub input: PathBuf,

    /// Where to write the restored image; format follows the extension
    pub output: PathBuf,

    #[command(flatten)]
    pub album: AlbumArgs,

    /// Photo id; defaults to the input file stem
    #[arg(short, long)]
    pub photo_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory of scrambled images named by photo id (00001.webp, ...)
    pub input_dir: PathBuf,

    /// Directory for restored images
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub album: AlbumArgs,

    /// Output image format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Overwrite existing outputs instead of skipping them
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Keep,
    Png,
    Webp,
    Jpeg,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Keep => OutputFormat::Keep,
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Webp => OutputFormat::Webp,
            FormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}
