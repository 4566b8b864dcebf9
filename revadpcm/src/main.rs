use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use revadpcm::{CodecConfig, EncodeOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "revadpcm")]
#[command(version)]
#[command(about = "N64 VADPCM AIFC converter", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an audio file to AIFC
    Encode {
        /// Input audio file (mp3, wav, flac, ogg, etc.)
        input: PathBuf,
        /// Output AIFC file
        output: PathBuf,
        /// Borrow the codebook of an existing VADPCM AIFC file
        #[arg(long, conflicts_with = "raw")]
        codebook: Option<PathBuf>,
        /// Write uncompressed 16-bit pcm instead of VADPCM
        #[arg(long)]
        raw: bool,
        /// First looped sample
        #[arg(long, requires = "loop_end")]
        loop_start: Option<u32>,
        /// Sample the loop jumps back from
        #[arg(long, requires = "loop_start")]
        loop_end: Option<u32>,
        /// Extra loop passes, -1 loops forever
        #[arg(long, default_value = "-1", allow_negative_numbers = true)]
        loop_count: i32,
    },
    /// Decode an AIFC file to WAV
    Decode {
        /// Input AIFC file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Passes to write for an infinite loop
        #[arg(long)]
        loop_repeats: Option<u32>,
    },
    /// Show information about an AIFC file
    Info {
        /// Input AIFC file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate an AIFC file
    Validate {
        /// Input AIFC file
        input: PathBuf,
    },
    /// Pack the sound data of AIFC files into one table
    Table {
        /// Output table file
        output: PathBuf,
        /// Input AIFC files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Encode {
            input,
            output,
            codebook,
            raw,
            loop_start,
            loop_end,
            loop_count,
        } => {
            encode(EncodeArgs {
                input,
                output,
                codebook,
                raw,
                loop_bounds: loop_start.zip(loop_end),
                loop_count,
            })?;
        }
        Commands::Decode {
            input,
            output,
            loop_repeats,
        } => {
            decode(&input, &output, loop_repeats)?;
        }
        Commands::Info { input, json } => {
            info(&input, json)?;
        }
        Commands::Validate { input } => {
            validate(&input)?;
        }
        Commands::Table { output, inputs } => {
            table(&output, &inputs)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

struct EncodeArgs {
    input: PathBuf,
    output: PathBuf,
    codebook: Option<PathBuf>,
    raw: bool,
    loop_bounds: Option<(u32, u32)>,
    loop_count: i32,
}

fn encode(args: EncodeArgs) -> Result<()> {
    println!("Reading {}...", args.input.display());

    let source = revadpcm::audio::read_audio_file(&args.input).context("Failed to read audio file")?;

    println!("  Sample rate: {} Hz", source.sample_rate);
    println!("  Channels: {}", source.source_channels);
    if let Some(ref format) = source.source_format {
        println!("  Format: {}", format);
    }
    println!(
        "  Duration: {:.2}s",
        source.samples.len() as f64 / source.sample_rate.max(1) as f64
    );

    let mut options = if args.raw {
        println!("Encoding to AIFC (uncompressed)...");
        EncodeOptions::raw()
    } else if let Some(ref path) = args.codebook {
        let data = fs::read(path).context("Failed to read codebook file")?;
        let codebook = revadpcm::codebook_from_aifc(&data)?;
        println!(
            "Encoding to AIFC (VADPCM, order {}, {} predictors from {})...",
            codebook.order(),
            codebook.predictors(),
            path.display()
        );
        EncodeOptions::vadpcm(codebook)
    } else {
        println!("Encoding to AIFC (VADPCM, default codebook)...");
        EncodeOptions::vadpcm(revadpcm::default_codebook()?)
    };

    if let Some((start, end)) = args.loop_bounds {
        if start >= end {
            bail!("Loop start {} must come before loop end {}", start, end);
        }
        options = options.with_loop(start, end, args.loop_count);
    }

    let data = revadpcm::encode_from_samples(&source.samples, source.sample_rate, options)
        .context("Failed to encode audio")?;

    fs::write(&args.output, &data).context("Failed to write output file")?;

    let original_size = source.samples.len() * 2;
    let ratio = original_size as f32 / data.len().max(1) as f32;

    println!("Done!");
    println!("  Output: {}", args.output.display());
    println!("  Size: {} bytes ({:.1}x compression)", data.len(), ratio);

    Ok(())
}

fn decode(input: &Path, output: &Path, loop_repeats: Option<u32>) -> Result<()> {
    println!("Reading {}...", input.display());

    let data = fs::read(input).context("Failed to read AIFC file")?;

    let file_info = revadpcm::get_aifc_info(&data)?;

    println!("  Sample rate: {} Hz", file_info.sample_rate);
    println!("  Compression: {}", file_info.compression);
    println!("  Duration: {:.2}s", file_info.duration_secs);

    let mut config = CodecConfig::new();
    if let Some(repeats) = loop_repeats {
        config = config.with_infinite_loop_repeats(repeats);
    }

    println!("Decoding...");

    let wav_bytes = revadpcm::decode_to_wav(&data, &config).context("Failed to decode AIFC file")?;

    println!("Writing WAV...");

    fs::write(output, wav_bytes).context("Failed to write WAV file")?;

    println!("Done!");
    println!("  Output: {}", output.display());

    Ok(())
}

fn info(input: &Path, json: bool) -> Result<()> {
    let data = fs::read(input).context("Failed to read AIFC file")?;

    let file_info = revadpcm::get_aifc_info(&data)?;

    if json {
        let json_str =
            serde_json::to_string_pretty(&file_info).context("Failed to serialize info")?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("AIFC Audio File");
    println!("───────────────────────────────");
    println!("  Compression: {}", file_info.compression);
    println!("  Sample rate: {} Hz", file_info.sample_rate);
    println!("  Channels:    {}", file_info.channels);
    println!("  Bit depth:   {}", file_info.bit_depth);
    println!("  Duration:    {:.2}s", file_info.duration_secs);
    println!("  Samples:     {}", file_info.total_samples);
    println!("  File size:   {} bytes", file_info.file_size);
    println!("  Sound data:  {} bytes", file_info.sound_bytes);

    if file_info.is_compressed {
        println!(
            "  Codebook:    order {}, {} predictors",
            file_info.order, file_info.predictors
        );
    }

    if file_info.has_loop {
        let count = if file_info.loop_count == -1 {
            "forever".to_string()
        } else {
            format!("{} extra passes", file_info.loop_count)
        };
        println!(
            "  Loop:        {}..{} ({})",
            file_info.loop_start, file_info.loop_end, count
        );
    } else {
        println!("  Loop:        none");
    }

    Ok(())
}

fn validate(input: &Path) -> Result<()> {
    let data = fs::read(input).context("Failed to read AIFC file")?;

    if revadpcm::validate_aifc(&data)? {
        println!("✓ {} is valid", input.display());
        Ok(())
    } else {
        bail!("{} is not a usable AIFC file", input.display());
    }
}

fn table(output: &Path, inputs: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(inputs.len());
    for path in inputs {
        files.push(fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?);
    }

    let (data, entries) = revadpcm::build_table(&files)?;

    for (path, entry) in inputs.iter().zip(entries.iter()) {
        println!(
            "  {:>8} {:>8}  {}",
            entry.offset,
            entry.length,
            path.display()
        );
    }

    fs::write(output, &data).context("Failed to write table file")?;

    println!("Done!");
    println!("  Output: {} ({} bytes)", output.display(), data.len());

    Ok(())
}
