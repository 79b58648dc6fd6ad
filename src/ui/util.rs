use super::theme::Theme;
use ratatui::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Signed change, e.g. `+$1.25`.
pub fn format_change(delta: f64) -> String {
    if delta < 0.0 {
        format!("-${:.2}", delta.abs())
    } else {
        format!("+${:.2}", delta)
    }
}

pub fn format_optional_currency(amount: Option<f64>) -> String {
    amount.map(format_currency).unwrap_or_else(|| "-".to_string())
}

/// Percentage of the budget spent, when the key has a positive budget.
pub fn usage_percent(spend: f64, budget: Option<f64>) -> Option<f64> {
    match budget {
        Some(limit) if limit > 0.0 => Some(spend / limit * 100.0),
        _ => None,
    }
}

/// Red from 90%, yellow from 75%, green below.
pub fn usage_color(percent: f64, theme: &Theme) -> Color {
    if percent >= 90.0 {
        theme.error
    } else if percent >= 75.0 {
        theme.warning
    } else {
        theme.success
    }
}

pub fn status_color(status: &str, theme: &Theme) -> Color {
    match status {
        "active" => theme.success,
        "blocked" | "disabled" | "expired" => theme.error,
        _ => theme.warning,
    }
}

/// Pads `text` with spaces to `width` display columns, truncating with `…`
/// if it is wider.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let current = text.width();
    if current <= width {
        return format!("{}{}", text, " ".repeat(width - current));
    }
    if width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        result.push(c);
        used += w;
    }
    result.push('…');
    used += 1;
    result.push_str(&" ".repeat(width.saturating_sub(used)));
    result
}

/// Right-aligns `text` within `width` display columns.
pub fn align_right(text: &str, width: usize) -> String {
    let current = text.width();
    format!("{}{}", " ".repeat(width.saturating_sub(current)), text)
}
