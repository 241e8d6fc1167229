use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::distance::DistanceResult;
use crate::scoring::DriverScore;

const NO_DRIVERS: &str = "No drivers available.";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
pub fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Score out of 100, e.g. "85/100"
pub fn format_score(score: u32) -> String {
    format!("{}/100", score)
}

/// "5 km, 6 min" when the distance was resolved, "-" otherwise
pub fn format_distance(scored: &DriverScore) -> String {
    match (scored.distance_km(), scored.duration_minutes()) {
        (Some(km), Some(minutes)) => format!("{} km, {} min", km, minutes),
        _ => "-".to_string(),
    }
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked drivers as a table: Index, Score, Name, Distance, Breakdown
/// No headers. The breakdown column is truncated to the terminal width.
pub fn format_ranked_table(scores: &[DriverScore], use_colors: bool) -> String {
    if scores.is_empty() {
        return NO_DRIVERS.to_string();
    }

    let term_width = get_terminal_width();

    let index_width = 3;
    let score_width = 7; // "100/100"
    let name_width = scores
        .iter()
        .map(|s| s.driver_name.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let distance_width = scores
        .iter()
        .map(|s| format_distance(s).len())
        .max()
        .unwrap_or(1);
    let separator = "  ";

    scores
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>width$}", format_score(scored.score), width = score_width);
            let name = format!(
                "{:<width$}",
                truncate(&scored.driver_name, name_width),
                width = name_width
            );
            let distance = format!("{:<width$}", format_distance(scored), width = distance_width);

            let fixed_width =
                index_width + 1 + score_width + name_width + distance_width + separator.len() * 3;
            let details = scored.details();
            let details = match term_width {
                Some(width) if width > fixed_width + 10 => truncate(&details, width - fixed_width),
                Some(_) => truncate(&details, 20),
                None => details,
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    name.cyan(),
                    separator,
                    distance,
                    separator,
                    details.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str, score_str, separator, name, separator, distance, separator, details
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single ranked driver with detailed multi-line output (for verbose mode)
pub fn format_driver_detail(scored: &DriverScore, use_colors: bool) -> String {
    let availability = if scored.available { "yes" } else { "no" };

    if use_colors {
        format!(
            "{} ({})\n  Score: {}\n  Distance: {}\n  Courses today: {}\n  Available: {}\n  Details: {}",
            scored.driver_name.bold(),
            scored.driver_id.dimmed(),
            format_score(scored.score).green(),
            format_distance(scored),
            scored.courses_today,
            availability,
            scored.details()
        )
    } else {
        format!(
            "{} ({})\n  Score: {}\n  Distance: {}\n  Courses today: {}\n  Available: {}\n  Details: {}",
            scored.driver_name,
            scored.driver_id,
            format_score(scored.score),
            format_distance(scored),
            scored.courses_today,
            availability,
            scored.details()
        )
    }
}

/// Format ranked drivers as tab-separated values for scripting
/// Columns: score, id, name, km, minutes, details (no headers, no colors)
pub fn format_tsv(scores: &[DriverScore]) -> String {
    scores
        .iter()
        .map(|scored| {
            let km = scored.distance_km().map(|km| km.to_string()).unwrap_or_default();
            let minutes = scored
                .duration_minutes()
                .map(|m| m.to_string())
                .unwrap_or_default();
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                scored.score,
                scored.driver_id,
                scored.driver_name,
                km,
                minutes,
                scored.details()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line verdict naming the top driver
pub fn format_recommendation(scores: &[DriverScore], use_colors: bool) -> String {
    match scores.first() {
        Some(best) if use_colors => format!(
            "Recommended: {} ({})",
            best.driver_name.bold().green(),
            format_score(best.score)
        ),
        Some(best) => format!(
            "Recommended: {} ({})",
            best.driver_name,
            format_score(best.score)
        ),
        None => NO_DRIVERS.to_string(),
    }
}

/// Result of a single distance lookup, e.g. "Brou -> Chartres: 7.5 km, 8 min"
pub fn format_lookup(origin: &str, destination: &str, result: &DistanceResult) -> String {
    match result {
        DistanceResult::Found(distance) => format!(
            "{} -> {}: {} km, {} min",
            origin,
            destination,
            distance.km(),
            distance.minutes()
        ),
        DistanceResult::Failed(err) => format!("{} -> {}: {}", origin, destination, err),
    }
}
