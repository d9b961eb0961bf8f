use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::core::geom::{Pos, Rect};
use crate::render::buffer::Buffer;
use crate::render::style::Style;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderKind {
    Single,
    Double,
}

struct BorderChars {
    horizontal: char,
    vertical: char,
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
}

const SINGLE: BorderChars = BorderChars {
    horizontal: '─',
    vertical: '│',
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
};

const DOUBLE: BorderChars = BorderChars {
    horizontal: '═',
    vertical: '║',
    top_left: '╔',
    top_right: '╗',
    bottom_left: '╚',
    bottom_right: '╝',
};

/// Clipped, translated view over the frame buffer handed to a control's
/// paint hook.
///
/// All coordinates are control-local; the painter adds the control's absolute
/// origin and drops writes that land outside the clip rectangle. Widgets get
/// this during paint and nothing else, so they cannot draw over a sibling.
pub struct Painter<'a> {
    buffer: &'a mut Buffer,
    clip: Rect,
    origin: Pos,
}

impl<'a> Painter<'a> {
    pub fn new(buffer: &'a mut Buffer, clip: Rect, origin: Pos) -> Self {
        Self {
            buffer,
            clip,
            origin,
        }
    }

    /// Unclipped painter over the whole buffer (command bar, desktop root).
    pub fn whole(buffer: &'a mut Buffer) -> Self {
        let clip = Rect::new(0, 0, buffer.width(), buffer.height());
        Self {
            buffer,
            clip,
            origin: Pos::new(0, 0),
        }
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    pub fn put(&mut self, x: i32, y: i32, symbol: char, style: Style) {
        let abs = Pos::new(self.origin.x + x, self.origin.y + y);
        if self.clip.contains(abs) {
            self.buffer.set(abs.x, abs.y, symbol, style);
        }
    }

    /// Write text left-to-right from `(x, y)`; wide graphemes occupy their
    /// display width, with the continuation cells blanked.
    pub fn text(&mut self, x: i32, y: i32, text: &str, style: Style) {
        let mut cx = x;
        for grapheme in text.graphemes(true) {
            let width = grapheme.width() as i32;
            if width == 0 {
                continue;
            }
            let symbol = grapheme.chars().next().unwrap_or(' ');
            self.put(cx, y, symbol, style);
            for pad in 1..width {
                self.put(cx + pad, y, ' ', style);
            }
            cx += width;
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, symbol: char, style: Style) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.put(x, y, symbol, style);
            }
        }
    }

    pub fn hline(&mut self, x: i32, y: i32, len: i32, symbol: char, style: Style) {
        for i in 0..len {
            self.put(x + i, y, symbol, style);
        }
    }

    pub fn vline(&mut self, x: i32, y: i32, len: i32, symbol: char, style: Style) {
        for i in 0..len {
            self.put(x, y + i, symbol, style);
        }
    }

    pub fn rect_border(&mut self, rect: Rect, style: Style, kind: BorderKind) {
        if rect.w < 2 || rect.h < 2 {
            return;
        }
        let chars = match kind {
            BorderKind::Single => SINGLE,
            BorderKind::Double => DOUBLE,
        };
        let (x1, y1) = (rect.x, rect.y);
        let (x2, y2) = (rect.right() - 1, rect.bottom() - 1);
        self.hline(x1 + 1, y1, rect.w - 2, chars.horizontal, style);
        self.hline(x1 + 1, y2, rect.w - 2, chars.horizontal, style);
        self.vline(x1, y1 + 1, rect.h - 2, chars.vertical, style);
        self.vline(x2, y1 + 1, rect.h - 2, chars.vertical, style);
        self.put(x1, y1, chars.top_left, style);
        self.put(x2, y1, chars.top_right, style);
        self.put(x1, y2, chars.bottom_left, style);
        self.put(x2, y2, chars.bottom_right, style);
    }

    /// Blank the whole local area covered by the clip.
    pub fn clear(&mut self, style: Style) {
        let local = self.clip.translated(-self.origin.x, -self.origin.y);
        self.fill_rect(local, ' ', style);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
