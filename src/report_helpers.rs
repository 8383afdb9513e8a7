use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Print a horizontal separator of box-drawing chars.
pub fn separator(width: usize) -> String {
    "\u{2500}".repeat(width)
}

/// Serialize to pretty JSON and print to stdout.
pub fn print_json_stdout(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Pad `s` with spaces to `width` terminal columns, truncating with `…`
/// when it is wider. Uses display width, not byte length.
pub fn fit_width(s: &str, width: usize) -> String {
    let w = s.width();
    if w <= width {
        return format!("{s}{}", " ".repeat(width - w));
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw + 1 > width {
            break;
        }
        out.push(ch);
        used += cw;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Score in [0, 1] as a percentage, `-` when undefined.
pub fn format_percent(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.1}%", s * 100.0),
        None => "-".to_string(),
    }
}

/// Display label for an identifier; the root has an empty one.
pub fn display_id(id: &str) -> &str {
    if id.is_empty() { "(total)" } else { id }
}

#[cfg(test)]
#[path = "report_helpers_test.rs"]
mod tests;
