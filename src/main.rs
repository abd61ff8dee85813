//! WavExtract - Media-to-Audio Extraction CLI

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use wavextract::pipeline::request;
use wavextract::{
    Args, CancelToken, Config, ConversionRequest, MediaConverter, MediaInput, TargetFormat,
    init_logging,
};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let probe_only = args.probe;
    let config = Config::from_args_and_config(args)?;

    if config.verbose() {
        println!("{}", wavextract::get_library_info());
        println!();
    }

    if !config.input_path.exists() {
        anyhow::bail!("input file does not exist: {}", config.input_path.display());
    }

    let bytes = std::fs::read(&config.input_path)
        .with_context(|| format!("cannot read {}", config.input_path.display()))?;
    let mime = request::mime_for_path(&config.input_path);
    let source_name = config
        .input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let input = MediaInput::new(bytes, mime).with_source_name(source_name);

    let mut converter = MediaConverter::new(config.clone());

    if probe_only {
        let probe = converter.probe(&input)?;
        println!("=== Input Metadata ===");
        match probe.sample_rate {
            Some(rate) => println!("Sample rate: {} Hz", rate),
            None => println!("Sample rate: unknown"),
        }
        println!("Channels: {}", probe.channel_count);
        match probe.frame_count {
            Some(frames) => println!("Frames: {}", frames),
            None => println!("Frames: unknown"),
        }
        if let Some(duration) = probe.duration_seconds {
            println!("Duration: {:.2}s", duration);
        }
        return Ok(());
    }

    println!("=== WavExtract ===");
    println!("Input: {}", config.input_path.display());
    println!("Target format: {}", config.target_format());
    println!("==================\n");

    let target_format = TargetFormat::from_mime(config.target_format());
    let conversion_request = ConversionRequest { input, target_format };
    let (output, stats) = converter.convert_detailed(conversion_request, &CancelToken::new())?;

    let output_path = config
        .output_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&output.suggested_filename));
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }
    std::fs::write(&output_path, &output.blob)
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    println!("=== Conversion Complete ===");
    println!("Output: {} ({})", output_path.display(), output.mime_type);
    println!("Size: {} bytes", output.blob.len());
    println!(
        "Time: {:.2}s (RTF {:.3})",
        stats.decode_seconds + stats.render_seconds + stats.encode_seconds,
        stats.real_time_factor
    );
    if config.verbose() {
        println!("Decode: {:.3}s", stats.decode_seconds);
        println!("Render: {:.3}s", stats.render_seconds);
        println!("Encode: {:.3}s", stats.encode_seconds);
        println!("Duration: {:.2}s", stats.input_duration_seconds);
    }
    if let Some(warning) = &output.warning {
        println!("Warning: {}", warning);
    }

    Ok(())
}
