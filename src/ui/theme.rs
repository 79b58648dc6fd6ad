//! Color roles for the dashboard output.
//!
//! Semantic colors (success=green, warning=yellow, error=red) are fixed;
//! the model colors separate lab-hosted from commercial models.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Main text color
    pub text: Color,
    /// Secondary text (labels, hints)
    pub muted: Color,
    /// Section titles
    pub accent: Color,
    /// Models under the hosted prefix
    pub hosted: Color,
    /// Every other model
    pub commercial: Color,
    /// Models first seen this run
    pub new_model: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dashboard()
    }
}

impl Theme {
    pub fn dashboard() -> Self {
        Self {
            text: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            hosted: Color::Green,
            commercial: Color::Cyan,
            new_model: Color::Yellow,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Rows for members that have gone quiet.
    pub fn dimmed_style(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::DIM)
    }
}
