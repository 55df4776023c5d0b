use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use faceswap_core::encoding::read_image;
use faceswap_core::types::ImageReference;
use faceswap_pipeline::stage::{ImageSwapInput, JobInput, VideoSwapInput};

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "faceswap", author, version, about = "Run face-swap jobs against the remote service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the remaining account credit.
    Quota,
    /// Swap the source face onto a target image.
    Image(ImageArgs),
    /// Swap the source face into a target video.
    Video(VideoArgs),
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Target image: a local file or a URL.
    #[arg(long)]
    pub target: String,

    /// Source face image: a local file or a URL.
    #[arg(long)]
    pub source: String,

    /// Swap every detected face instead of only the first.
    #[arg(long)]
    pub multi_face: bool,

    /// Enhance the swapped face.
    #[arg(long)]
    pub enhance: bool,

    /// Save the result into this directory.
    #[arg(long, value_name = "DIR")]
    pub download: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VideoArgs {
    /// URL of the image holding the face to replace.
    #[arg(long)]
    pub target: String,

    /// URL of the source face image.
    #[arg(long)]
    pub source: String,

    /// URL of the video to modify.
    #[arg(long)]
    pub video: String,

    /// Skip face enhancement.
    #[arg(long)]
    pub no_enhance: bool,

    /// Save the result into this directory.
    #[arg(long, value_name = "DIR")]
    pub download: Option<PathBuf>,
}

impl ImageArgs {
    pub async fn to_input(&self) -> Result<JobInput, CliError> {
        Ok(JobInput::Image(ImageSwapInput {
            target: resolve_reference(&self.target).await?,
            source: resolve_reference(&self.source).await?,
            single_face: !self.multi_face,
            enhance: self.enhance,
        }))
    }
}

impl VideoArgs {
    pub fn to_input(&self) -> JobInput {
        JobInput::Video(VideoSwapInput {
            target: self.target.clone(),
            source: self.source.clone(),
            video: self.video.clone(),
            enhance: !self.no_enhance,
        })
    }
}

/// An existing file is read and sent inline; anything else is a URL.
pub async fn resolve_reference(arg: &str) -> Result<ImageReference, CliError> {
    let path = Path::new(arg);
    if !path.is_file() {
        return Ok(ImageReference::Url(arg.to_string()));
    }
    Ok(ImageReference::Binary(read_image(path).await?))
}
