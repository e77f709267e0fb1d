//! Neon-on-dark theme tokens for the blotter TUI.
//!
//! # Color Palette
//! - **Background**: near-black charcoal (base layer)
//! - **Accent**: electric cyan (focus, highlights, NEW orders)
//! - **Positive**: neon green (buys, filled orders)
//! - **Negative**: hot pink (sells, errors)
//! - **Warning**: neon orange (READY orders, alerts)
//! - **Neutral**: cool purple (WORKING orders, secondary info)
//! - **Muted**: steel blue (disabled, secondary text)

use blotter_core::domain::{OrderStatus, TransactionType};
use ratatui::style::Color;

/// Theme tokens shared by every widget.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Near-black background (primary surface)
    pub background: Color,
    /// Electric cyan accent (focus, highlights)
    pub accent: Color,
    /// Neon green (buys, fills)
    pub positive: Color,
    /// Hot pink (sells, errors)
    pub negative: Color,
    /// Neon orange (warnings, staged orders)
    pub warning: Color,
    /// Cool purple (in-flight state, secondary)
    pub neutral: Color,
    /// Steel blue (muted text, disabled)
    pub muted: Color,
    /// White (primary text)
    pub text_primary: Color,
    /// Light gray (secondary text)
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }
}

impl Theme {
    /// Color for an order's lifecycle status.
    pub fn status_color(&self, status: OrderStatus) -> Color {
        match status {
            OrderStatus::New => self.accent,
            OrderStatus::Ready => self.warning,
            OrderStatus::Working => self.neutral,
            OrderStatus::Filled => self.positive,
        }
    }

    /// Color for the transaction side.
    pub fn side_color(&self, side: TransactionType) -> Color {
        match side {
            TransactionType::Buyl => self.positive,
            TransactionType::Sell => self.negative,
        }
    }

    /// Color for executed progress (fraction of target).
    pub fn progress_color(&self, fraction: f64) -> Color {
        match fraction {
            f if f >= 1.0 => self.positive,
            f if f > 0.0 => self.neutral,
            _ => self.muted,
        }
    }
}
