//! Semantic colors for the engine and the stock widgets, kept in one place
//! so paint code never hard-codes a color.

pub mod color_support;

pub use color_support::{adapt_color, detect_terminal_color_support, TerminalColorSupport};

use std::fmt;

use serde::Deserialize;

use crate::render::style::{Color, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub desktop: Style,
    pub desktop_fill: char,

    pub window_bg: Color,
    pub window_border_focused: Color,
    pub window_border: Color,
    pub window_title: Color,

    pub text: Color,
    pub text_inactive: Color,
    pub hotkey: Color,

    pub button_bg: Color,
    pub button_focused_bg: Color,
    pub button_fg: Color,

    pub bar_bg: Color,
    pub bar_key_fg: Color,
    pub bar_name_fg: Color,
    pub bar_hover_bg: Color,
    pub bar_pressed_bg: Color,
}

impl Theme {
    /// Built-in dark theme; the engine default.
    pub fn dark() -> Self {
        Self {
            desktop: Style::new()
                .fg(Color::Indexed(8))
                .bg(Color::Indexed(0)),
            desktop_fill: ' ',

            window_bg: Color::Indexed(4),
            window_border_focused: Color::Indexed(15),
            window_border: Color::Indexed(7),
            window_title: Color::Indexed(15),

            text: Color::Indexed(7),
            text_inactive: Color::Indexed(8),
            hotkey: Color::Indexed(3),

            button_bg: Color::Indexed(7),
            button_focused_bg: Color::Indexed(6),
            button_fg: Color::Indexed(0),

            bar_bg: Color::Indexed(7),
            bar_key_fg: Color::Indexed(1),
            bar_name_fg: Color::Indexed(0),
            bar_hover_bg: Color::Indexed(6),
            bar_pressed_bg: Color::Indexed(3),
        }
    }

    /// Apply user overrides, then downgrade every color to what the terminal
    /// supports.
    pub fn customized(settings: &ThemeSettings, support: TerminalColorSupport) -> Result<Self, ThemeError> {
        let mut theme = Self::dark();
        if let Some(value) = &settings.desktop_bg {
            theme.desktop.bg = Some(parse_color(value)?);
        }
        if let Some(value) = &settings.desktop_fg {
            theme.desktop.fg = Some(parse_color(value)?);
        }
        if let Some(value) = &settings.window_bg {
            theme.window_bg = parse_color(value)?;
        }
        if let Some(value) = &settings.window_border {
            theme.window_border = parse_color(value)?;
        }
        if let Some(value) = &settings.window_border_focused {
            theme.window_border_focused = parse_color(value)?;
        }
        if let Some(value) = &settings.text {
            theme.text = parse_color(value)?;
        }
        if let Some(value) = &settings.hotkey {
            theme.hotkey = parse_color(value)?;
        }
        if let Some(value) = &settings.bar_bg {
            theme.bar_bg = parse_color(value)?;
        }
        theme.adapt(support);
        Ok(theme)
    }

    fn adapt(&mut self, support: TerminalColorSupport) {
        let fix = |c: &mut Color| *c = adapt_color(*c, support);
        if let Some(bg) = &mut self.desktop.bg {
            fix(bg);
        }
        if let Some(fg) = &mut self.desktop.fg {
            fix(fg);
        }
        fix(&mut self.window_bg);
        fix(&mut self.window_border_focused);
        fix(&mut self.window_border);
        fix(&mut self.window_title);
        fix(&mut self.text);
        fix(&mut self.text_inactive);
        fix(&mut self.hotkey);
        fix(&mut self.button_bg);
        fix(&mut self.button_focused_bg);
        fix(&mut self.button_fg);
        fix(&mut self.bar_bg);
        fix(&mut self.bar_key_fg);
        fix(&mut self.bar_name_fg);
        fix(&mut self.bar_hover_bg);
        fix(&mut self.bar_pressed_bg);
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// User-supplied overrides, usually loaded from a JSON file next to the
/// application's own configuration.
///
/// Color values are `"#rrggbb"` hex strings or ANSI index numbers
/// (`"4"`, `"reset"`). Unset fields keep the built-in value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeSettings {
    pub desktop_bg: Option<String>,
    pub desktop_fg: Option<String>,
    pub window_bg: Option<String>,
    pub window_border: Option<String>,
    pub window_border_focused: Option<String>,
    pub text: Option<String>,
    pub hotkey: Option<String>,
    pub bar_bg: Option<String>,
}

impl ThemeSettings {
    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        serde_json::from_str(json).map_err(ThemeError::Json)
    }
}

#[derive(Debug)]
pub enum ThemeError {
    Json(serde_json::Error),
    BadColor(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::Json(err) => write!(f, "theme settings are not valid JSON: {}", err),
            ThemeError::BadColor(value) => write!(f, "unrecognized color value: {:?}", value),
        }
    }
}

impl std::error::Error for ThemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ThemeError::Json(err) => Some(err),
            ThemeError::BadColor(_) => None,
        }
    }
}

fn parse_color(value: &str) -> Result<Color, ThemeError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("reset") {
        return Ok(Color::Reset);
    }
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 6 {
            let parse = |s: &str| u8::from_str_radix(s, 16);
            if let (Ok(r), Ok(g), Ok(b)) = (parse(&hex[0..2]), parse(&hex[2..4]), parse(&hex[4..6])) {
                return Ok(Color::Rgb(r, g, b));
            }
        }
        return Err(ThemeError::BadColor(value.to_string()));
    }
    value
        .parse::<u8>()
        .map(Color::Indexed)
        .map_err(|_| ThemeError::BadColor(value.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/theme/theme.rs"]
mod tests;
