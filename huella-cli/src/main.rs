use clap::{Parser, Subcommand};
use std::path::PathBuf;

use huella_core::{EncoderConfig, FractalPattern, Seed};

#[derive(Parser)]
#[command(name = "huella", about = "Fractal phase-shift audio watermarking tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a seed-derived watermark into a WAV file
    Encode {
        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Seed the fractal pattern is derived from
        #[arg(short, long)]
        seed: String,

        /// Encoding strength in milliseconds (0.001 - 0.5)
        #[arg(long, default_value = "0.01")]
        strength_ms: f32,

        /// Chunk size in samples (must be even)
        #[arg(long, default_value = "2048")]
        chunk_size: usize,

        /// Fractal pattern length
        #[arg(long, default_value = "100")]
        pattern_len: usize,
    },
    /// Verify that an encoded WAV carries a seed's watermark
    Verify {
        /// Original (unencoded) WAV file
        #[arg(long)]
        original: PathBuf,

        /// Encoded WAV file
        #[arg(long)]
        encoded: PathBuf,

        /// Seed claimed to have produced the watermark
        #[arg(short, long)]
        seed: String,

        /// Strength in milliseconds the encoder used
        #[arg(long, default_value = "0.01")]
        strength_ms: f32,

        /// Chunk size in samples (must match the encoder's)
        #[arg(long, default_value = "2048")]
        chunk_size: usize,

        /// Fractal pattern length (must match the encoder's)
        #[arg(long, default_value = "100")]
        pattern_len: usize,

        /// Minimum correlation for the audio to count as preserved
        #[arg(long, default_value = "0.99")]
        correlation_threshold: f32,

        /// Minimum matched-filter correlation for detection
        #[arg(long, default_value = "0.5")]
        detection_threshold: f32,
    },
}

/// Full-scale value for signed integer samples of the given bit depth.
/// Widened to i64 so 32-bit WAVs don't overflow the shift.
fn int_scale(bits: u16) -> f32 {
    (1i64 << (bits - 1)) as f32
}

/// Read a WAV file as mono f32 samples, taking the first channel.
fn read_wav(path: &PathBuf) -> Result<(Vec<f32>, u32), Box<dyn std::error::Error>> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        eprintln!(
            "Warning: input has {} channels, only the first channel will be used.",
            spec.channels
        );
    }

    let mut samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            let max = int_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .collect::<Result<Vec<i32>, _>>()?
                .into_iter()
                .map(|s| s as f32 / max)
                .collect()
        }
    };

    if spec.channels > 1 {
        samples = samples
            .chunks(spec.channels as usize)
            .map(|c| c[0])
            .collect();
    }

    Ok((samples, spec.sample_rate))
}

fn write_wav(
    path: &PathBuf,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}


fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode {
            input,
            output,
            seed,
            strength_ms,
            chunk_size,
            pattern_len,
        } => {
            let (mut samples, sample_rate) = read_wav(&input)?;

            let config = EncoderConfig {
                sample_rate,
                strength_ms,
                chunk_size,
                pattern_len,
                ..Default::default()
            };
            let pattern = FractalPattern::generate(&Seed::from(seed), pattern_len)?;

            eprintln!(
                "Encoding {} ({} samples, {}Hz, strength {}ms)...",
                input.display(),
                samples.len(),
                sample_rate,
                strength_ms
            );

            let num_chunks = samples.len() / config.chunk_size;
            if num_chunks < 8 {
                eprintln!(
                    "Warning: only {} full chunks; detection needs more audio to be reliable.",
                    num_chunks
                );
            }

            huella_core::encode(&mut samples, &pattern, &config)?;
            write_wav(&output, &samples, sample_rate)?;

            eprintln!("Encoded audio written to {}", output.display());
        }
        Command::Verify {
            original,
            encoded,
            seed,
            strength_ms,
            chunk_size,
            pattern_len,
            correlation_threshold,
            detection_threshold,
        } => {
            let (original_samples, original_rate) = read_wav(&original)?;
            let (encoded_samples, encoded_rate) = read_wav(&encoded)?;

            if original_rate != encoded_rate {
                return Err(format!(
                    "sample rate mismatch: {original_rate}Hz vs {encoded_rate}Hz"
                )
                .into());
            }
            if original_samples.len() != encoded_samples.len() {
                eprintln!(
                    "Warning: buffer lengths differ ({} vs {} samples), comparing the shorter prefix.",
                    original_samples.len(),
                    encoded_samples.len()
                );
            }

            let config = EncoderConfig {
                sample_rate: original_rate,
                strength_ms,
                chunk_size,
                pattern_len,
                correlation_threshold,
                detection_threshold,
            };
            let pattern = FractalPattern::generate(&Seed::from(seed), pattern_len)?;

            let result =
                huella_core::verify(&original_samples, &encoded_samples, &pattern, &config)?;

            println!("Correlation:         {:.6}", result.correlation);
            println!("Pattern correlation: {:.4}", result.pattern_correlation);
            println!("Preserved:           {}", result.preserved);
            println!("Detected:            {}", result.detected);
            println!("Meets standards:     {}", result.meets_standards());

            if !result.meets_standards() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
