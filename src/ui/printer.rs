use anyhow::{Context, Result};
use crossterm::{
    queue,
    style::{Attribute, Color as TermColor, Print, SetAttribute, SetForegroundColor},
};
use ratatui::style::{Color, Modifier};
use ratatui::text::Line;
use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};

/// Whether styled output should be written to stdout.
pub fn color_enabled(configured: bool, no_color_flag: bool) -> bool {
    color_allowed(
        configured,
        no_color_flag,
        std::env::var_os("NO_COLOR"),
        io::stdout().is_terminal(),
    )
}

fn color_allowed(
    configured: bool,
    no_color_flag: bool,
    no_color_env: Option<OsString>,
    is_tty: bool,
) -> bool {
    // NO_COLOR only counts when set to a non-empty value.
    let env_disabled = no_color_env.is_some_and(|v| !v.is_empty());
    configured && !no_color_flag && !env_disabled && is_tty
}

pub fn to_term_color(color: Color) -> TermColor {
    match color {
        Color::Reset => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    }
}

/// Writes lines to `out`, styled with ANSI escapes when `color` is set.
pub fn write_lines<W: Write>(out: &mut W, lines: &[Line<'_>], color: bool) -> io::Result<()> {
    for line in lines {
        for span in &line.spans {
            if !color {
                queue!(out, Print(span.content.as_ref()))?;
                continue;
            }

            let style = line.style.patch(span.style);
            let mut styled = false;
            if let Some(fg) = style.fg {
                queue!(out, SetForegroundColor(to_term_color(fg)))?;
                styled = true;
            }
            for (modifier, attribute) in [
                (Modifier::BOLD, Attribute::Bold),
                (Modifier::DIM, Attribute::Dim),
                (Modifier::ITALIC, Attribute::Italic),
                (Modifier::UNDERLINED, Attribute::Underlined),
            ] {
                if style.add_modifier.contains(modifier) {
                    queue!(out, SetAttribute(attribute))?;
                    styled = true;
                }
            }
            queue!(out, Print(span.content.as_ref()))?;
            if styled {
                queue!(out, SetAttribute(Attribute::Reset))?;
            }
        }
        writeln!(out)?;
    }
    out.flush()
}

pub fn print_lines(lines: &[Line<'_>], color: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_lines(&mut out, lines, color).context("Failed to write dashboard output")
}
