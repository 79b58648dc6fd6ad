//! Terminal presentation: builds styled lines per view and prints them.

mod panels;
mod printer;
pub mod theme;
mod util;

use crate::dashboard::{KeyReport, TeamReport};
use crate::snapshot::TrackedKey;
use chrono::{DateTime, Utc};
use ratatui::text::Line;

pub use printer::{color_enabled, print_lines};
pub use theme::Theme;

/// Inputs shared by every view that are not part of the reports.
pub struct ViewContext<'a> {
    pub base_url: &'a str,
    pub hosted_prefix: &'a str,
    pub now: DateTime<Utc>,
    pub theme: Theme,
}

const TITLE: &str = "CBORG Model Dashboard";

pub fn render_single(report: &KeyReport, ctx: &ViewContext) -> Vec<Line<'static>> {
    let theme = &ctx.theme;
    let mut lines = panels::build_header(TITLE, "Key", &report.record.key_preview, theme);
    lines.push(panels::build_connection(&report.freshness, ctx));
    lines.extend(panels::build_notices(&report.notices, theme));
    lines.push(Line::from(""));
    lines.extend(panels::build_model_summary(report, ctx));
    lines.push(Line::from(""));
    lines.extend(panels::build_new_models(&report.new_models, &report.freshness, theme));
    lines.push(Line::from(""));
    lines.extend(panels::build_all_models(report, ctx));
    lines.push(Line::from(""));
    lines.extend(panels::build_spend_panel(report, ctx));
    lines.push(Line::from(""));
    lines.extend(panels::build_footer(theme));
    lines
}

pub fn render_team(report: &TeamReport, ctx: &ViewContext) -> Vec<Line<'static>> {
    let theme = &ctx.theme;
    let mut lines = panels::build_header(
        TITLE,
        "Team",
        &format!("{} of {} members refreshed", report.refreshed, report.summary.rows.len()),
        theme,
    );
    lines.extend(panels::build_notices(&report.notices, theme));
    lines.push(Line::from(""));
    lines.extend(panels::build_team_table(&report.summary, theme));
    lines
}

pub fn render_keys(keys: &[TrackedKey], ctx: &ViewContext) -> Vec<Line<'static>> {
    panels::build_keys_list(keys, ctx)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
