//! Command-line interface for paint_scan
//!
//! Scans one image and prints the result as JSON on stdout, with a
//! human-readable summary on stderr. Set `RUST_LOG=debug` for stage timings.

use paint_scan::{
    CancelToken, OfflineEngine, PaintDatabase, ScanConfig, ScanMode, ScanProvider, ScanRequest, ScanResult,
};
use std::sync::Arc;
use std::{env, path::Path, process};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut mode = ScanMode::Miniature;
    let mut config_path = None;
    let mut paints_path = None;
    let mut num_colors = None;
    let mut num_matches = None;
    let mut recipes = false;
    let mut image_path_arg = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--inspiration" => mode = ScanMode::Inspiration,
            "--miniature" => mode = ScanMode::Miniature,
            "--recipes" => recipes = true,
            "--colors" | "--matches" | "--config" | "--paints" => {
                let flag = args[i].clone();
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Error: {} expects a value", flag);
                    process::exit(1);
                };
                match flag.as_str() {
                    "--colors" => num_colors = Some(parse_count(&flag, value)),
                    "--matches" => num_matches = Some(parse_count(&flag, value)),
                    "--config" => config_path = Some(value.clone()),
                    _ => paints_path = Some(value.clone()),
                }
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let image_path_str = match image_path_arg {
        Some(path) => path,
        None => {
            print_help(&args[0]);
            process::exit(1);
        }
    };
    let image_path = Path::new(&image_path_str);

    let mut config = match config_path {
        Some(path) => ScanConfig::from_json_file(Path::new(&path)).unwrap_or_else(|e| fail(&e)),
        None => ScanConfig::for_mode(mode),
    };
    if let Some(n) = num_colors {
        config = config.with_num_colors(n);
    }
    if let Some(n) = num_matches {
        config = config.with_num_paint_matches(n);
    }
    if recipes {
        config = config.with_recipes(true);
    }

    let database = match paints_path {
        Some(path) => Arc::new(PaintDatabase::from_json_file(Path::new(&path)).unwrap_or_else(|e| fail(&e))),
        None => PaintDatabase::builtin(),
    };

    let image = std::fs::read(image_path).unwrap_or_else(|e| {
        eprintln!("Error: cannot read '{}': {}", image_path.display(), e);
        process::exit(1);
    });

    let request = ScanRequest::new(image, image_path.display().to_string()).with_config(config);
    match OfflineEngine::new(database).scan(&request, &CancelToken::new()) {
        Ok(result) => print_result(&result),
        Err(error) => fail(&error),
    }
}

fn parse_count(flag: &str, value: &str) -> usize {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: {} expects a positive integer, got '{}'", flag, value);
        process::exit(1);
    })
}

fn fail(error: &paint_scan::ScanError) -> ! {
    eprintln!("Scan failed: {}", error);
    if error.is_user_visible() {
        eprintln!("Suggestion: {}", error.user_message());
    }
    process::exit(1);
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Detect dominant colors in an image and match them to hobby paints.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --miniature        Remove the backdrop before clustering (default)");
    eprintln!("  --inspiration      Use the whole frame");
    eprintln!("  --colors N         Number of dominant colors (1-12)");
    eprintln!("  --matches N        Paint matches per brand");
    eprintln!("  --recipes          Attach base/shade/highlight/wash recipes");
    eprintln!("  --config FILE      Load a JSON scan configuration");
    eprintln!("  --paints FILE      Load a JSON paint table instead of the builtin one");
    eprintln!("  --help, -h         Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} mini.jpg", program_name);
    eprintln!("  {} --inspiration --colors 8 sunset.png", program_name);
}

fn print_result(result: &ScanResult) {
    // JSON on stdout for programmatic use
    match result.to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }

    // Summary on stderr for human reading
    eprintln!();
    eprintln!("Scan Summary ({}):", result.mode);
    if result.metadata.low_foreground {
        eprintln!("  Note: background removal failed, the full image was used");
    }
    for (color, matches) in result.detected_colors.iter().zip(&result.recommended_paints) {
        eprintln!("  {} {:>6.2}%  {}", color.hex, color.percentage, color.family);
        for (brand, paints) in &matches.brands {
            if let Some(best) = paints.first() {
                eprintln!("      {:<14} {} (ΔE {:.1})", brand, best.paint.name, best.distance);
            }
        }
    }
}
