use crate::render::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalColorSupport {
    TrueColor,
    Ansi256,
    Ansi16,
}

pub fn detect_terminal_color_support() -> TerminalColorSupport {
    if std::env::var_os("NO_COLOR").is_some() {
        return TerminalColorSupport::Ansi16;
    }

    if let Ok(value) = std::env::var("RETUI_COLOR_SUPPORT") {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "truecolor" | "24bit" | "rgb" => return TerminalColorSupport::TrueColor,
            "256" | "ansi256" => return TerminalColorSupport::Ansi256,
            "16" | "ansi16" | "basic" => return TerminalColorSupport::Ansi16,
            _ => {}
        }
    }

    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let term = std::env::var("TERM")
        .unwrap_or_default()
        .to_ascii_lowercase();

    if colorterm.contains("truecolor")
        || colorterm.contains("24bit")
        || colorterm.contains("direct")
        || term.contains("truecolor")
        || term.contains("direct")
    {
        return TerminalColorSupport::TrueColor;
    }

    if term.contains("256color") {
        return TerminalColorSupport::Ansi256;
    }

    TerminalColorSupport::Ansi16
}

/// Downgrade a color to what the terminal can actually display.
pub fn adapt_color(color: Color, support: TerminalColorSupport) -> Color {
    match (color, support) {
        (Color::Rgb(..), TerminalColorSupport::TrueColor) => color,
        (Color::Rgb(r, g, b), TerminalColorSupport::Ansi256) => Color::Indexed(rgb_to_ansi256(r, g, b)),
        (Color::Rgb(r, g, b), TerminalColorSupport::Ansi16) => Color::Indexed(rgb_to_ansi16(r, g, b)),
        (Color::Indexed(i), TerminalColorSupport::Ansi16) if i > 15 => {
            Color::Indexed(index_to_ansi16(i))
        }
        _ => color,
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    // Greyscale ramp gives better fidelity for near-grey colors.
    let (r, g, b) = (r as u16, g as u16, b as u16);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max - min < 16 {
        let grey = (r + g + b) / 3;
        if grey < 8 {
            return 16;
        }
        if grey > 238 {
            return 231;
        }
        return 232 + ((grey - 8) / 10) as u8;
    }
    let scale = |v: u16| -> u16 {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            (v - 35) / 40
        }
    };
    (16 + 36 * scale(r) + 6 * scale(g) + scale(b)) as u8
}

fn rgb_to_ansi16(r: u8, g: u8, b: u8) -> u8 {
    let bright = (r as u16 + g as u16 + b as u16) > 384;
    let base = (u8::from(r > 127)) | (u8::from(g > 127) << 1) | (u8::from(b > 127) << 2);
    if bright {
        base + 8
    } else {
        base
    }
}

fn index_to_ansi16(i: u8) -> u8 {
    if i >= 232 {
        // Greyscale ramp.
        if i >= 244 {
            7
        } else {
            8
        }
    } else {
        i % 16
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/color_support.rs"]
mod tests;
