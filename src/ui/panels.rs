use super::theme::Theme;
use super::util::{
    align_right, format_change, format_currency, format_optional_currency, pad_to_width,
    status_color, usage_color, usage_percent,
};
use super::ViewContext;
use crate::analysis::{classify, format_relative_time, parse_timestamp, MemberRow, TeamSummary};
use crate::dashboard::{Freshness, KeyReport, Notice, NoticeLevel};
use crate::gateway::SpendInfo;
use crate::snapshot::{CredentialRecord, TrackedKey};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use std::collections::BTreeSet;
use unicode_width::UnicodeWidthStr;

const TOP_MODEL_SPEND: usize = 5;

fn section_title(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![Span::styled(format!("── {} ──", title), theme.title_style())])
}

fn field(label: &str, value: String, value_style: Style, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {}: ", label), theme.label_style()),
        Span::styled(value, value_style),
    ])
}

pub fn build_header(title: &str, label: &str, value: &str, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![Span::styled(
            format!("═══ {} ═══", title),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::styled(format!(" {}: ", label), theme.muted_style()),
            Span::styled(value.to_string(), theme.label_style()),
        ]),
    ]
}

pub fn build_connection(freshness: &Freshness, ctx: &ViewContext) -> Line<'static> {
    let theme = &ctx.theme;
    match freshness {
        Freshness::Live => Line::from(vec![
            Span::styled(" ✓ ", Style::default().fg(theme.success).add_modifier(Modifier::BOLD)),
            Span::styled(format!("Connected to {}", ctx.base_url), theme.label_style()),
        ]),
        Freshness::Stale { reason } => Line::from(vec![
            Span::styled(" ⚠ ", Style::default().fg(theme.warning).add_modifier(Modifier::BOLD)),
            Span::styled(
                "STALE DATA",
                Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({})", reason),
                Style::default().fg(theme.warning).add_modifier(Modifier::ITALIC),
            ),
        ]),
    }
}

pub fn build_notices(notices: &[Notice], theme: &Theme) -> Vec<Line<'static>> {
    notices
        .iter()
        .map(|notice| {
            let (marker, color) = match notice.level {
                NoticeLevel::Info => (" ℹ ", theme.accent),
                NoticeLevel::Warning => (" ⚠ ", theme.warning),
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(color)),
                Span::styled(notice.message.clone(), Style::default().fg(color)),
            ])
        })
        .collect()
}

pub fn build_model_summary(report: &KeyReport, ctx: &ViewContext) -> Vec<Line<'static>> {
    let theme = &ctx.theme;
    let partition = classify(&report.catalog, ctx.hosted_prefix);
    let new_style = if report.new_models.is_empty() {
        theme.muted_style()
    } else {
        Style::default().fg(theme.new_model).add_modifier(Modifier::BOLD)
    };

    let last_check = match report.previous_check {
        Some(checked) => Span::styled(format_relative_time(checked, ctx.now), theme.label_style()),
        None => Span::styled("First check", Style::default().fg(theme.accent)),
    };

    vec![
        section_title("Models", theme),
        Line::from(vec![
            Span::styled(" Total: ", theme.label_style()),
            Span::styled(
                partition.total().to_string(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  New: ", theme.label_style()),
            Span::styled(report.new_models.len().to_string(), new_style),
        ]),
        Line::from(vec![
            Span::styled(" Lab-hosted: ", theme.label_style()),
            Span::styled(partition.lbl_hosted.len().to_string(), Style::default().fg(theme.hosted)),
            Span::styled("  Commercial: ", theme.label_style()),
            Span::styled(
                partition.commercial.len().to_string(),
                Style::default().fg(theme.commercial),
            ),
        ]),
        build_last_check(report, last_check, theme),
    ]
}

fn build_last_check(
    report: &KeyReport,
    last_check: Span<'static>,
    theme: &Theme,
) -> Line<'static> {
    let mut spans = vec![Span::styled(" Last check: ", theme.label_style()), last_check];
    // Stale runs never write, so only a failed live save is flagged.
    if !report.saved && !report.freshness.is_stale() {
        spans.push(Span::styled(
            " (not saved, delta will repeat)",
            Style::default().fg(theme.warning),
        ));
    }
    Line::from(spans)
}

pub fn build_new_models(
    new_models: &BTreeSet<String>,
    freshness: &Freshness,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if new_models.is_empty() {
        return vec![Line::from(vec![Span::styled(
            " No new models since last check",
            theme.muted_style(),
        )])];
    }

    let title = if freshness.is_stale() {
        format!("New Models ({}, as of last successful check)", new_models.len())
    } else {
        format!("New Models ({})", new_models.len())
    };
    let mut lines = vec![Line::from(vec![Span::styled(
        format!("── {} ──", title),
        Style::default().fg(theme.new_model).add_modifier(Modifier::BOLD),
    )])];
    lines.extend(new_models.iter().map(|model| {
        Line::from(vec![
            Span::styled("  + ", Style::default().fg(theme.new_model)),
            Span::styled(model.clone(), Style::default().fg(theme.new_model)),
        ])
    }));
    lines
}

pub fn build_all_models(report: &KeyReport, ctx: &ViewContext) -> Vec<Line<'static>> {
    let theme = &ctx.theme;
    let partition = classify(&report.catalog, ctx.hosted_prefix);
    let mut lines = vec![section_title("All Models", theme)];

    if partition.total() == 0 {
        lines.push(Line::from(vec![Span::styled(" (none)", theme.muted_style())]));
        return lines;
    }

    let groups = [
        (&partition.lbl_hosted, theme.hosted, "Lab-hosted"),
        (&partition.commercial, theme.commercial, "Commercial"),
    ];
    for (models, color, label) in groups {
        if models.is_empty() {
            continue;
        }
        lines.push(Line::from(vec![Span::styled(
            format!(" {}", label),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )]));
        for model in models {
            let mut spans = vec![Span::styled(format!("  {}", model), Style::default().fg(color))];
            if report.new_models.contains(model) {
                spans.push(Span::styled(" (new)", Style::default().fg(theme.new_model)));
            }
            lines.push(Line::from(spans));
        }
    }
    lines
}

pub fn build_spend_panel(report: &KeyReport, ctx: &ViewContext) -> Vec<Line<'static>> {
    let theme = &ctx.theme;
    let mut lines = vec![section_title("Spending", theme)];

    let Some(info) = report.spend.as_ref() else {
        lines.push(Line::from(vec![Span::styled(
            " Unable to retrieve spending information",
            Style::default().fg(theme.warning),
        )]));
        if let Some(sample) = report.record.latest_sample() {
            lines.push(Line::from(vec![Span::styled(
                format!(
                    " Last recorded: {} ({})",
                    format_currency(sample.current_spend),
                    format_relative_time(sample.timestamp, ctx.now)
                ),
                theme.muted_style(),
            )]));
        }
        return lines;
    };

    lines.push(field(
        "Current spend",
        format_currency(info.current_spend),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        theme,
    ));
    lines.push(field(
        "Budget",
        info.budget_limit
            .map(format_currency)
            .unwrap_or_else(|| "no limit".to_string()),
        theme.label_style(),
        theme,
    ));
    if let Some(remaining) = info.remaining {
        lines.push(field("Remaining", format_currency(remaining), theme.label_style(), theme));
    }
    if let Some(pct) = usage_percent(info.current_spend, info.budget_limit) {
        lines.push(field(
            "Usage",
            format!("{:.1}%", pct),
            Style::default().fg(usage_color(pct, theme)).add_modifier(Modifier::BOLD),
            theme,
        ));
    }
    if let Some(alias) = &info.key_alias {
        lines.push(field("Alias", alias.clone(), theme.label_style(), theme));
    }
    if let Some(reset) = &info.budget_reset_at {
        let shown = parse_timestamp(reset)
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| reset.clone());
        lines.push(field("Budget resets", shown, theme.label_style(), theme));
    }
    if let Some(status) = &info.status {
        lines.push(field(
            "Status",
            status.clone(),
            Style::default().fg(status_color(status, theme)),
            theme,
        ));
    }
    if let Some(line) = build_spend_change(&report.record, info, ctx) {
        lines.push(line);
    }

    let top = info.top_model_spend(TOP_MODEL_SPEND);
    if !top.is_empty() {
        lines.push(Line::from(vec![Span::styled(" Top models:", theme.label_style())]));
        let width = top.iter().map(|(model, _)| model.width()).max().unwrap_or(0);
        for (model, spend) in top {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", pad_to_width(model, width)), theme.muted_style()),
                Span::styled(format!("  {}", format_currency(spend)), theme.label_style()),
            ]));
        }
    }
    lines
}

/// Change against the newest sample recorded before this run.
fn build_spend_change(
    record: &CredentialRecord,
    info: &SpendInfo,
    ctx: &ViewContext,
) -> Option<Line<'static>> {
    let theme = &ctx.theme;
    let baseline = record.sample_before(ctx.now)?;
    let delta = info.current_spend - baseline.current_spend;
    let color = if delta > 0.0 { theme.warning } else { theme.muted };
    Some(Line::from(vec![
        Span::styled(" Change: ", theme.label_style()),
        Span::styled(format_change(delta), Style::default().fg(color)),
        Span::styled(
            format!(" since {}", format_relative_time(baseline.timestamp, ctx.now)),
            theme.muted_style(),
        ),
    ]))
}

pub fn build_footer(theme: &Theme) -> Vec<Line<'static>> {
    vec![Line::from(vec![
        Span::styled(" Tip: ", theme.muted_style()),
        Span::styled("cborg-dash team <roster.yaml>", theme.label_style()),
        Span::styled(" shows spend for a whole team", theme.muted_style()),
    ])]
}

const TEAM_COLUMNS: usize = 8;
const TEAM_HEADERS: [&str; TEAM_COLUMNS] = [
    "Name",
    "Role",
    "Key",
    "Spend",
    "Budget",
    "Remaining",
    "Last active",
    "Status",
];

fn member_cells(row: &MemberRow) -> [String; TEAM_COLUMNS] {
    let mut name = row.name.clone();
    if row.is_pi {
        name.push_str(" ★");
    }
    [
        name,
        row.role.clone().unwrap_or_else(|| "-".to_string()),
        row.key_alias
            .clone()
            .or_else(|| row.key_preview.clone())
            .unwrap_or_else(|| "-".to_string()),
        format_optional_currency(row.current_spend),
        format_optional_currency(row.budget_limit),
        format_optional_currency(row.remaining),
        if row.resolved {
            row.activity.label.clone()
        } else {
            "-".to_string()
        },
        row.status.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

fn format_cells(cells: &[String; TEAM_COLUMNS], widths: &[usize; TEAM_COLUMNS]) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            // Money columns read better right-aligned.
            if (3..=5).contains(&i) {
                align_right(cell, *width)
            } else {
                pad_to_width(cell, *width)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn build_team_table(summary: &TeamSummary, theme: &Theme) -> Vec<Line<'static>> {
    let cells: Vec<[String; TEAM_COLUMNS]> = summary.rows.iter().map(member_cells).collect();
    let totals = &summary.totals;
    let totals_cells: [String; TEAM_COLUMNS] = [
        "Total".to_string(),
        String::new(),
        String::new(),
        format_currency(totals.current_spend),
        format_currency(totals.budget_limit),
        format_currency(totals.remaining),
        String::new(),
        String::new(),
    ];

    let mut widths = TEAM_HEADERS.map(|h| h.width());
    for row in cells.iter().chain(std::iter::once(&totals_cells)) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let headers = TEAM_HEADERS.map(String::from);
    let mut lines = vec![
        section_title("Team Spending", theme),
        Line::from(vec![Span::styled(
            format!(" {}", format_cells(&headers, &widths)),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )]),
    ];

    for (row, cells) in summary.rows.iter().zip(&cells) {
        let style = if row.activity.inactive {
            theme.dimmed_style()
        } else if row.is_pi {
            Style::default().fg(theme.accent)
        } else {
            theme.label_style()
        };
        let mut spans = vec![Span::styled(format!(" {}", format_cells(cells, &widths)), style)];
        if row.activity.inactive {
            spans.push(Span::styled(" [inactive]", theme.dimmed_style()));
        }
        if row.stale {
            spans.push(Span::styled(" [stale]", Style::default().fg(theme.warning)));
        }
        if !row.resolved {
            spans.push(Span::styled(" [no data]", theme.muted_style()));
        }
        lines.push(Line::from(spans));
    }

    let rule_width: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    lines.push(Line::from(vec![Span::styled(
        format!(" {}", "─".repeat(rule_width)),
        theme.muted_style(),
    )]));
    lines.push(Line::from(vec![Span::styled(
        format!(" {}", format_cells(&totals_cells, &widths)),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    )]));
    lines.push(Line::from(vec![Span::styled(
        format!(
            " {} members, {} with spend data, {} inactive",
            summary.rows.len(),
            totals.members_with_data,
            summary.inactive_count()
        ),
        theme.muted_style(),
    )]));
    lines
}

pub fn build_keys_list(keys: &[TrackedKey], ctx: &ViewContext) -> Vec<Line<'static>> {
    let theme = &ctx.theme;
    let mut lines = vec![section_title("Tracked Keys", theme)];
    if keys.is_empty() {
        lines.push(Line::from(vec![Span::styled(
            " No tracked keys yet",
            theme.muted_style(),
        )]));
        return lines;
    }

    for key in keys {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {}", key.preview),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({})", key.key_hash), theme.muted_style()),
        ]));
        lines.push(Line::from(vec![Span::styled(
            format!(
                "   {} models, {} spend samples, first seen {}, updated {}",
                key.model_count,
                key.spend_samples,
                key.first_seen.format("%Y-%m-%d"),
                format_relative_time(key.last_updated, ctx.now)
            ),
            theme.muted_style(),
        )]));
    }
    lines
}

#[cfg(test)]
#[path = "tests/panels_tests.rs"]
mod tests;
