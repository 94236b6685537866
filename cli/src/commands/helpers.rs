use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::{self, BufRead, Write};

/// Parse a volume string into milliliters.
/// Accepts: "500", "500ml", "500 ml", "0.5l", "1.5 L".
pub(crate) fn parse_quantity_ml(s: &str) -> Result<i64> {
    let s = s.trim();
    let lower = s.to_lowercase();

    let (number_part, multiplier) = if let Some(rest) = lower.strip_suffix("ml") {
        (rest.trim(), 1.0)
    } else if let Some(rest) = lower.strip_suffix('l') {
        (rest.trim(), 1000.0)
    } else {
        (lower.as_str(), 1.0)
    };

    let value: f64 = number_part
        .parse()
        .with_context(|| format!("Invalid quantity: '{s}'. Use '500', '500ml' or '0.5l'"))?;
    let ml = (value * multiplier).round();
    if ml <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    Ok(ml as i64)
}

/// "500 ml" below a liter, "1.50 L" from there up.
pub(crate) fn format_volume(ml: i64) -> String {
    if ml >= 1000 {
        #[allow(clippy::cast_precision_loss)]
        let liters = ml as f64 / 1000.0;
        format!("{liters:.2} L")
    } else {
        format!("{ml} ml")
    }
}

/// Keep only the date part of an RFC 3339 timestamp, and the HH:MM separately.
pub(crate) fn split_timestamp(recorded_at: &str) -> (String, String) {
    let date = recorded_at
        .split('T')
        .next()
        .unwrap_or(recorded_at)
        .to_string();
    let time = recorded_at
        .split('T')
        .nth(1)
        .map(|t| t.chars().take(5).collect())
        .unwrap_or_default();
    (date, time)
}

pub(crate) fn prompt_confirm(message: &str) -> Result<bool> {
    eprint!("{message} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

pub(crate) fn prompt_line(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(line.trim().to_string())
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
