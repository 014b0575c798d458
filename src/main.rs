//! # chatstitch CLI
//!
//! Command-line interface for the chatstitch library.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatstitch::StitchError;
use chatstitch::cli::Args;
use chatstitch::config::{CONFIG_FILE_NAME, ProcessingConfig};
use chatstitch::core::ArchiveProcessor;
use chatstitch::format::{OutputFormat, write_to_format};
use chatstitch::parsing::load_export;
use chatstitch::progress::stderr_progress;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

/// `RUST_LOG` wins unless `-v` is given; default level is `info`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), StitchError> {
    if args.init {
        let path = Path::new(CONFIG_FILE_NAME);
        ProcessingConfig::write_template(path)?;
        println!("✅ Config written to {}", path.display());
        return Ok(());
    }

    let total_start = Instant::now();
    let input = args.input_path()?;
    let base_dir = args.base_dir();
    let output_path = args.output_path();
    let media_dir = args.media_dir();
    let format: OutputFormat = args.format.into();
    let config = args.processing_config()?;

    println!("📦 chatstitch v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", input.display());
    println!("💾 Output:  {}", output_path.display());
    println!("🖼️  Media:   {}", media_dir.display());
    println!("📄 Format:  {}", format);
    if config.mark_media {
        println!("🔏 Marking: requested");
    }
    if config.transcribe_media {
        println!("🎙️  Transcribe: requested ({})", config.transcription.model);
    }
    println!();

    println!("⏳ Loading export...");
    let load_start = Instant::now();
    let export = load_export(input)?;
    println!(
        "   Found {} records ({:.2}s)",
        export.messages.len(),
        load_start.elapsed().as_secs_f64()
    );

    // No marking service or speech engine is linked into the binary; the
    // processor logs a warning and runs copy-only when either is requested.
    println!("🧵 Stitching messages...");
    let stitch_start = Instant::now();
    let output = ArchiveProcessor::new(config)
        .with_progress(stderr_progress())
        .process_export(&export, &base_dir, &media_dir)?;
    let stats = &output.stats;
    println!(
        "   Compressed to {} messages ({:.1}% reduction, {:.2}s)",
        stats.stitched_count,
        stats.compression_ratio(),
        stitch_start.elapsed().as_secs_f64()
    );

    println!("💾 Writing {}...", format);
    let write_start = Instant::now();
    write_to_format(&output, &output_path, format)?;
    println!("   Written in {:.2}s", write_start.elapsed().as_secs_f64());

    println!();
    println!("✅ Done! Output saved to {}", output_path.display());

    println!();
    println!("📊 Summary:");
    println!("   Records:   {}", stats.source_count);
    println!("   Skipped:   {} service records", stats.skipped_count);
    println!("   Messages:  {}", stats.stitched_count);
    println!("   Absorbed:  {}", stats.absorbed_count);
    println!("   Replies:   {} redirected", stats.replies_rewritten);
    println!("   Authors:   {}", output.author_map.len());
    if stats.transcribed_count > 0 {
        println!("   Transcripts: {}", stats.transcribed_count);
    }
    if let (Some(first), Some(last)) = (stats.first_message, stats.last_message) {
        println!(
            "   Period:    {} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }

    println!();
    println!("⚡ Performance:");
    let total_time = total_start.elapsed();
    println!("   Total time:  {:.2}s", total_time.as_secs_f64());

    Ok(())
}
