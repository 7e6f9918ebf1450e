//! Generate a default scan configuration file
//!
//! Creates a JSON config with all default parameters for the chosen mode

use paint_scan::{ScanConfig, ScanMode};
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_config.json> [miniature|inspiration]", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} configs/miniature.json", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);
    let mode = match args.get(2).map(String::as_str) {
        None | Some("miniature") => ScanMode::Miniature,
        Some("inspiration") => ScanMode::Inspiration,
        Some(other) => {
            eprintln!("Unknown mode: {}", other);
            process::exit(1);
        }
    };

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let config = ScanConfig::for_mode(mode);

    match config.to_json_file(output_path) {
        Ok(_) => {
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!("  Mode: {}, {} colors, {} matches per brand",
                     config.mode, config.num_colors, config.num_paint_matches);
            eprintln!("  Sampler: max edge {} px, alpha cutoff {}",
                     config.sampler.max_edge, config.sampler.alpha_threshold);
            eprintln!("  Foreground: border {} px, ΔE tolerance {:.0}, min {:.0}%",
                     config.foreground.border_width,
                     config.foreground.tolerance,
                     config.foreground.min_foreground_fraction * 100.0);
            eprintln!("  Quantizer: {} iterations, merge ΔE < {:.0}, drop < {:.0}%",
                     config.quantizer.max_iterations,
                     config.quantizer.merge_threshold,
                     config.quantizer.min_percentage);
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e);
            process::exit(1);
        }
    }
}
