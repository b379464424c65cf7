use std::collections::BTreeSet;

use crate::error::PinPadError;
use crate::palette;

/// Largest map the renderer has room for (the canvas keeps two extra rows for the sequence strip).
pub const MAX_WIDTH: usize = 16;
pub const MAX_HEIGHT: usize = 14;

/// Map symbols: `#` wall, `*` spawn hint, space floor, anything else a pad id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Floor,
    /// Spawn hint. Walks like floor; carries no other meaning.
    Spawn,
    Pad(char),
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Result<Cell, PinPadError> {
        match symbol {
            '#' => Ok(Cell::Wall),
            ' ' => Ok(Cell::Floor),
            '*' => Ok(Cell::Spawn),
            s if palette::is_pad_symbol(s) => Ok(Cell::Pad(s)),
            s => Err(PinPadError::UnknownPad(s)),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Floor => ' ',
            Cell::Spawn => '*',
            Cell::Pad(s) => s,
        }
    }

    pub fn is_wall(self) -> bool { self == Cell::Wall }

    pub fn pad(self) -> Option<char> {
        match self {
            Cell::Pad(s) => Some(s),
            _ => None,
        }
    }
}

/// Immutable parsed map. Indexed `(x, y)` where `x` is the character column of a text row
/// and `y` the row number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    width: usize,
    height: usize,
    /// Column-major: `cells[x * height + y]`.
    cells: Vec<Cell>,
    pads: BTreeSet<char>,
    spawns: Vec<(usize, usize)>,
}

impl Layout {
    pub fn parse(text: &str) -> Result<Self, PinPadError> {
        let rows: Vec<Vec<char>> = text
            .trim_matches('\n')
            .split('\n')
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();

        let height = rows.len();
        let width = rows[0].len();
        if width == 0 {
            return Err(PinPadError::MalformedLayout("layout has no cells".into()));
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(PinPadError::MalformedLayout(format!(
                "row {y} has {} cells, expected {width}",
                row.len()
            )));
        }
        if width > MAX_WIDTH || height > MAX_HEIGHT {
            return Err(PinPadError::MalformedLayout(format!(
                "layout is {width}x{height}, larger than {MAX_WIDTH}x{MAX_HEIGHT}"
            )));
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut pads = BTreeSet::new();
        let mut spawns = Vec::new();
        for x in 0..width {
            for y in 0..height {
                let cell = Cell::from_symbol(rows[y][x])?;
                if let Some(p) = cell.pad() {
                    pads.insert(p);
                }
                if !cell.is_wall() {
                    spawns.push((x, y));
                }
                cells.push(cell);
            }
        }
        if spawns.is_empty() {
            return Err(PinPadError::MalformedLayout("layout has no walkable cell".into()));
        }
        Ok(Self { width, height, cells, pads, spawns })
    }

    #[inline]
    pub fn width(&self) -> usize { self.width }
    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool { x < self.width && y < self.height }

    /// Panics when `(x, y)` is out of bounds.
    pub fn cell(&self, x: usize, y: usize) -> Cell { self.cells[x * self.height + y] }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if self.in_bounds(x, y) { Some(self.cell(x, y)) } else { None }
    }

    /// Distinct pad symbols present in the map.
    pub fn pads(&self) -> &BTreeSet<char> { &self.pads }

    /// Every non-wall coordinate, pads included.
    pub fn spawns(&self) -> &[(usize, usize)] { &self.spawns }

    /// Iterate `((x, y), cell)` in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), Cell)> + '_ {
        let h = self.height;
        self.cells.iter().enumerate().map(move |(i, c)| ((i / h, i % h), *c))
    }

    /// Re-emit the map in its text form.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.cell(x, y).symbol());
            }
            if y + 1 < self.height { out.push('\n'); }
        }
        out
    }
}
