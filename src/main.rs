use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use pixel_points::{ColorKeys, OverlapPolicy, PixelExtractor, UsageLog};

#[derive(Parser)]
#[command(name = "pixel_points")]
#[command(about = "Extract labeled point locations from colored pixels in an image")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON file mapping labels to hex colors, e.g. {"Gold": ["#ffc90e"]}
    #[arg(long, value_name = "FILE")]
    keys: Option<PathBuf>,

    /// Color key as LABEL=#hex[,#hex...] (repeatable)
    #[arg(short, long = "key", value_name = "LABEL=COLORS")]
    key: Vec<String>,

    /// Maximum RGB distance for a pixel to match a reference color
    #[arg(long, default_value_t = 5.0)]
    color_threshold: f64,

    /// Maximum distance in pixels between neighbors of the same point
    #[arg(long, default_value_t = 10.0)]
    proximity_grouping: f64,

    /// How to resolve colors claimed by more than one label
    #[arg(long, value_enum, default_value_t = OverlapPolicy::LastWins)]
    overlap: OverlapPolicy,

    /// Directory for usage logs (defaults to the host log folder)
    #[arg(long, value_name = "DIR")]
    usage_log: Option<PathBuf>,

    /// Disable usage logging
    #[arg(long, conflicts_with = "usage_log")]
    no_usage_log: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_key_arg(arg: &str) -> anyhow::Result<(String, Vec<String>)> {
    let (label, colors) = arg
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected LABEL=#hex[,#hex...], got '{}'", arg))?;
    let colors = colors
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    Ok((label.trim().to_string(), colors))
}

fn load_keys(args: &Cli) -> anyhow::Result<ColorKeys> {
    let mut keys = match &args.keys {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read color keys from {}", path.display()))?;
            ColorKeys::from_json(&json)
                .with_context(|| format!("Invalid color keys in {}", path.display()))?
        }
        None => ColorKeys::new(),
    };

    // --key entries extend the file's keys, appending colors to shared labels
    let mut cli_keys = ColorKeys::new();
    for arg in &args.key {
        let (label, colors) = parse_key_arg(arg)?;
        cli_keys.insert(label, colors)?;
    }
    keys.merge(cli_keys);

    Ok(keys)
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let keys = load_keys(&args)?;

    let mut extractor = PixelExtractor::new(keys)
        .with_color_threshold(args.color_threshold)
        .with_proximity_grouping(args.proximity_grouping)
        .with_overlap_policy(args.overlap);

    if !args.no_usage_log {
        let usage = match &args.usage_log {
            Some(dir) => UsageLog::new(dir),
            None => UsageLog::default_location(),
        };
        extractor = extractor.with_usage_log(usage);
    }

    // Fail on bad keys before reading the image
    extractor.validate()?;

    if args.verbose {
        println!("Extracting points from {:?}", args.image_path);
    }

    let report = extractor.extract(&args.image_path)?;

    println!("\n=== Pixel Extraction Results ===");
    for label in &report.labels {
        println!("  {} ({}): {} point(s)", label.label, label.color, label.centroids.len());
        if args.verbose {
            for c in &label.centroids {
                println!("    ({:.1}, {:.1})", c.x, c.y);
            }
        }
    }
    println!("\nOutputs written to {}", report.output_dir.display());

    if !report.is_complete() {
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.label, failure.error);
        }
        anyhow::bail!("{} label(s) could not be clustered", report.failures.len());
    }

    Ok(())
}
