//! Parrot/neon theme tokens for the AgentBoard dashboard.
//!
//! # Color Palette
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (focus, highlights)
//! - **Positive**: neon green (gains, buys)
//! - **Negative**: hot pink (losses, sells)
//! - **Warning**: neon orange (alerts, the benchmark fallback)
//! - **Neutral**: cool purple (secondary info)
//! - **Muted**: steel blue (hints, axis labels)
//!
//! Series colors come from an 8-color cycle; the benchmark uses its
//! configured brand color.

use ratatui::style::{Color, Modifier, Style};

use agentboard_core::config::parse_hex_color;

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

/// Agent series colors, assigned by position and cycled.
pub const SERIES_PALETTE: [Color; 8] = [
    Color::Rgb(0x00, 0xd4, 0xff),
    Color::Rgb(0x00, 0xff, 0xcc),
    Color::Rgb(0xff, 0x00, 0x6e),
    Color::Rgb(0xff, 0xbe, 0x0b),
    Color::Rgb(0x83, 0x38, 0xec),
    Color::Rgb(0x3a, 0x86, 0xff),
    Color::Rgb(0xfb, 0x56, 0x07),
    Color::Rgb(0x06, 0xff, 0xa5),
];

/// Benchmark color when none is configured.
pub const BENCHMARK_FALLBACK: Color = Color::Rgb(0xff, 0x6b, 0x00);

/// Theme bundle, for widgets that take colors as data.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: BACKGROUND,
            accent: ACCENT,
            positive: POSITIVE,
            negative: NEGATIVE,
            warning: WARNING,
            neutral: NEUTRAL,
            muted: MUTED,
            text_primary: TEXT_PRIMARY,
            text_secondary: TEXT_SECONDARY,
        }
    }

    /// Green for gains (and zero), pink for losses.
    pub fn pnl_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }
}

pub fn palette_color(index: usize) -> Color {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

/// `#rrggbb` to a terminal color.
pub fn hex_color(raw: &str) -> Option<Color> {
    parse_hex_color(raw).map(|(r, g, b)| Color::Rgb(r, g, b))
}

/// Scale an RGB color toward black. Named colors pass through.
pub fn dim(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let f = factor.clamp(0.0, 1.0);
            Color::Rgb(
                (r as f32 * f) as u8,
                (g as f32 * f) as u8,
                (b as f32 * f) as u8,
            )
        }
        other => other,
    }
}

pub fn pnl(value: f64) -> Style {
    Style::default().fg(Theme::default().pnl_color(value))
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn text() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn text_secondary() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}
