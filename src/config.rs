//! Configuration management for the conversion pipeline

use crate::error::{ConvertError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub block_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Target output MIME type.
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
            input_path: PathBuf::from("input.wav"),
            output_path: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { block_size: crate::audio::renderer::DEFAULT_BLOCK_SIZE }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: crate::audio::wav::WAV_MIME_TYPE.to_string() }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { verbose: false }
    }
}

impl Config {
    /// Get render block size (convenience method)
    pub fn block_size(&self) -> usize {
        self.render.block_size
    }

    /// Get target output MIME type (convenience method)
    pub fn target_format(&self) -> &str {
        &self.output.format
    }

    /// Get verbose mode (convenience method)
    pub fn verbose(&self) -> bool {
        self.processing.verbose
    }

    pub fn validate(&self) -> Result<()> {
        if self.render.block_size == 0 {
            return Err(ConvertError::config("render block size cannot be 0"));
        }
        if self.output.format.is_empty() {
            return Err(ConvertError::config("output format cannot be empty"));
        }
        Ok(())
    }

    /// Create config from command line arguments
    pub fn from_args() -> Result<Self> {
        let args = Args::parse();
        Self::from_args_and_config(args)
    }

    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: Args) -> Result<Self> {
        // Config file first (if provided); command line overrides it.
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        config.input_path = args.input;
        config.output_path = args.output;
        config.output.format = args.format;
        config.render.block_size = args.block_size;
        config.processing.verbose = args.verbose;

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ConvertError::config(format!("invalid config file {}: {}", path.display(), e))
        })?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "wavextract",
    about = "Extract the audio track from a media file and encode it as WAV",
    version
)]
pub struct Args {
    #[arg(short = 'i', long = "input", help = "Input media file path")]
    pub input: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        help = "Output file path (defaults to the input stem with the output extension)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'f',
        long = "format",
        default_value = "audio/wav",
        help = "Target output MIME type"
    )]
    pub format: String,

    #[arg(
        long = "block-size",
        default_value = "4096",
        help = "Offline render block size (frames)"
    )]
    pub block_size: usize,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(long = "probe", help = "Print input metadata without converting")]
    pub probe: bool,
}
