//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! landscape.jpg
//!     Original: 400x200 jpeg, 12.46 KB
//!     Output:   200x100 webp, 1.9 KB
//!     Saved:    10.56 KB (84.7%)
//!     Written:  out/landscape-200x100.webp
//! ```
//!
//! ## Failure
//!
//! ```text
//! landscape.jpg
//!     Error: File size exceeds the maximum allowed size (10MB)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::types::ImageMetadata;
use crate::workflow::CompressionStats;
use std::path::Path;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size, 1024-based, at most two decimals with trailing
/// zeros dropped: `0 Bytes`, `1 KB`, `1.5 KB`, `2.25 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

fn image_line(label: &str, meta: &ImageMetadata) -> String {
    format!(
        "    {label:<9} {}x{} {}, {}",
        meta.width,
        meta.height,
        meta.format,
        format_file_size(meta.size)
    )
}

/// Summary of one `process` run.
pub fn format_process_output(
    name: &str,
    original: &ImageMetadata,
    processed: &ImageMetadata,
    stats: &CompressionStats,
    written: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![
        name.to_string(),
        image_line("Original:", original),
        image_line("Output:", processed),
        format!(
            "    Saved:    {} ({:.1}%)",
            stats.savings_formatted, stats.percent_reduction
        ),
    ];
    if let Some(path) = written {
        lines.push(format!("    Written:  {}", path.display()));
    }
    lines
}

pub fn print_process_output(
    name: &str,
    original: &ImageMetadata,
    processed: &ImageMetadata,
    stats: &CompressionStats,
    written: Option<&Path>,
) {
    for line in format_process_output(name, original, processed, stats, written) {
        println!("{line}");
    }
}

pub fn format_failure(name: &str, message: &str) -> Vec<String> {
    vec![name.to_string(), format!("    Error: {message}")]
}

pub fn print_failure(name: &str, message: &str) {
    for line in format_failure(name, message) {
        eprintln!("{line}");
    }
}
