//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// nim-vision: classify images with a NIM-hosted vision language model
#[derive(Parser, Debug)]
#[command(name = "nim-vision")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify an image file or a camera frame
    Classify(ClassifyArgs),

    /// Capture a camera frame, optionally saving and classifying it
    Capture(CaptureArgs),

    /// Show the capabilities advertised to the host
    Properties(PropertiesArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image file to classify (PNG or JPEG)
    #[arg(long, conflicts_with = "camera")]
    pub image: Option<PathBuf>,

    /// Allow-listed camera to capture from
    #[arg(long, conflicts_with = "image")]
    pub camera: Option<String>,

    /// Question to ask instead of the configured default
    #[arg(short, long)]
    pub question: Option<String>,

    /// Deadline for the whole call, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Requested number of classifications (accepted, not used to bound results)
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Allow-listed camera to capture from
    #[arg(long)]
    pub camera: String,

    /// Write the captured frame to this path
    #[arg(long)]
    pub save_image: Option<PathBuf>,

    /// Skip classification of the captured frame
    #[arg(long)]
    pub no_classify: bool,

    /// Question to ask instead of the configured default
    #[arg(short, long)]
    pub question: Option<String>,

    /// Deadline for the whole call, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PropertiesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
