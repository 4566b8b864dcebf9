//! Example: Convert an audio file to VADPCM AIFC and back to WAV
//!
//! Run with: cargo run --example convert_audio input.wav output.aifc

use revadpcm::{
    decode_to_wav, default_codebook, encode_from_audio, get_aifc_info, CodecConfig, EncodeOptions,
};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input-audio> <output-aifc>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    println!("Reading {}...", input_path);
    let audio_bytes = fs::read(input_path)?;

    println!("\nEncoding to AIFC (VADPCM, looping the whole sound forever)...");
    let source = revadpcm::audio::read_audio_from_bytes(&audio_bytes)?;
    let mut options = EncodeOptions::vadpcm(default_codebook()?);
    if source.samples.len() > 1 {
        options = options.with_loop(0, source.samples.len() as u32, -1);
    }

    let aifc_bytes = encode_from_audio(&audio_bytes, options)?;

    let original_size = audio_bytes.len();
    let compressed_size = aifc_bytes.len();
    let ratio = original_size as f32 / compressed_size as f32;

    println!("  Original: {} bytes", original_size);
    println!("  Compressed: {} bytes", compressed_size);
    println!("  Ratio: {:.1}x", ratio);

    fs::write(output_path, &aifc_bytes)?;
    println!("\nWrote AIFC file to {}", output_path);

    let info = get_aifc_info(&aifc_bytes)?;
    println!("\nAIFC File Info:");
    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Duration: {:.2}s", info.duration_secs);
    println!("  Compression: {}", info.compression);
    println!(
        "  Loop: {}..{} (count {})",
        info.loop_start, info.loop_end, info.loop_count
    );

    println!("\nDecoding back to WAV with two loop passes...");
    let config = CodecConfig::new().with_infinite_loop_repeats(2);
    let wav_bytes = decode_to_wav(&aifc_bytes, &config)?;
    let wav_path = format!("{}.wav", output_path);
    fs::write(&wav_path, &wav_bytes)?;
    println!("Wrote WAV file to {}", wav_path);

    Ok(())
}
