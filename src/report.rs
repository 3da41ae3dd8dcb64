//! Plain-text rendering of a forecast for terminal output.

use crate::models::{AppControls, DetectionResult, ForecastResult};
use std::fmt::Write;

/// Fixed-precision number with thousands separators, e.g. `1,234.50`
pub fn format_number(num: f64, precision: usize) -> String {
    if !num.is_finite() {
        return num.to_string();
    }

    let formatted = format!("{:.*}", precision, num.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = num < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn render(
    detection: &DetectionResult,
    controls: &AppControls,
    result: &ForecastResult,
) -> String {
    let mut out = String::new();
    let counts = &detection.stage_counts;
    let confidence = detection
        .confidence
        .map(|c| format!("{:.0}%", c * 100.0))
        .unwrap_or_else(|| "unknown".to_string());

    let _ = writeln!(out, "Yield forecast as of {}", result.as_of);
    let _ = writeln!(
        out,
        "Detection: {} fruit ({} immature, {} ripening, {} mature), stage {}, confidence {}",
        detection.detections,
        counts.immature,
        counts.ripening,
        counts.mature,
        detection.growth_stage,
        confidence
    );
    let _ = writeln!(
        out,
        "Plants: {} | Weather: {} | District: {}",
        controls.num_plants, result.weather_source, controls.district
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Ready now:     {} kg", format_number(result.yield_now_kg, 2));
    let _ = writeln!(out, "Sellable:      {} kg", format_number(result.sellable_kg, 2));
    if result.unharvested_kg > 0.0 {
        let _ = writeln!(
            out,
            "Unharvested:   {} kg",
            format_number(result.unharvested_kg, 2)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{:<12} {:>10} {:>10}", "Date", "Ready kg", "GDD cum");
    for day in &result.daily {
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10}",
            day.date.to_string(),
            format_number(day.ready_kg, 2),
            format_number(day.gdd_cum, 1)
        );
    }

    if !result.harvest_plan.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<12} {:>10}", "Harvest on", "kg");
        for task in &result.harvest_plan {
            let _ = writeln!(
                out,
                "{:<12} {:>10}",
                task.date.to_string(),
                format_number(task.harvest_kg, 2)
            );
        }
    }

    if !result.notes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Notes:");
        for note in &result.notes {
            let _ = writeln!(out, "  - {}", note);
        }
    }

    out
}
