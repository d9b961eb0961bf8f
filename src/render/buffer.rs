use crate::render::style::Style;

/// One screen cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub symbol: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: ' ',
            style: Style::new(),
        }
    }
}

/// Off-screen character grid the paint pass writes into.
///
/// The backend diffs consecutive buffers to emit a minimal update; the engine
/// never writes to the terminal directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    w: i32,
    h: i32,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(w: i32, h: i32) -> Self {
        let w = w.max(0);
        let h = h.max(0);
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w * h) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.w
    }

    pub fn height(&self) -> i32 {
        self.h
    }

    pub fn resize(&mut self, w: i32, h: i32) {
        *self = Buffer::new(w, h);
    }

    /// Reset every cell to a blank with the given style.
    pub fn fill(&mut self, style: Style) {
        for cell in &mut self.cells {
            *cell = Cell { symbol: ' ', style };
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.w || y >= self.h {
            return None;
        }
        Some((y * self.w + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, symbol: char, style: Style) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { symbol, style };
        }
    }

    /// Cells that differ from `prev`, in row-major order.
    pub fn diff<'a>(&'a self, prev: &Buffer) -> Vec<(i32, i32, &'a Cell)> {
        let mut out = Vec::new();
        if prev.w != self.w || prev.h != self.h {
            for y in 0..self.h {
                for x in 0..self.w {
                    out.push((x, y, self.get(x, y).expect("cell in bounds")));
                }
            }
            return out;
        }
        for y in 0..self.h {
            for x in 0..self.w {
                let i = (y * self.w + x) as usize;
                if self.cells[i] != prev.cells[i] {
                    out.push((x, y, &self.cells[i]));
                }
            }
        }
        out
    }

    /// The symbols of one row as a string; handy in tests.
    pub fn row_text(&self, y: i32) -> String {
        (0..self.w)
            .filter_map(|x| self.get(x, y).map(|c| c.symbol))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/buffer.rs"]
mod tests;
