use serde::{Deserialize, Serialize};

use crate::board::{Cell, Layout, MAX_HEIGHT};
use crate::palette::{self, Rgb};
use crate::sequence::RECENT_LEN;

/// Logical canvas side: map area on top, two-row sequence strip below it.
pub const CANVAS: usize = 16;
pub const SCALE: usize = 4;
pub const IMAGE_SIZE: usize = CANVAS * SCALE;
pub const CHANNELS: usize = 3;
pub const STRIP_ROW: usize = MAX_HEIGHT;

/// RGB observation, row-major `[y][x][channel]`, always `IMAGE_SIZE x IMAGE_SIZE x 3`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pixels: Vec<u8>,
}

impl Frame {
    pub const SHAPE: [usize; 3] = [IMAGE_SIZE, IMAGE_SIZE, CHANNELS];

    pub fn shape(&self) -> [usize; 3] { Self::SHAPE }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let i = (y * IMAGE_SIZE + x) * CHANNELS;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn as_bytes(&self) -> &[u8] { &self.pixels }

    pub fn into_bytes(self) -> Vec<u8> { self.pixels }
}

/// Draw the map, the player and the trailing sequence swatches.
pub fn render(layout: &Layout, player: (usize, usize), sequence: &[char]) -> Frame {
    // [x][y]
    let mut canvas = [[palette::BACKGROUND; CANVAS]; CANVAS];

    let current = layout.get(player.0, player.1).map(Cell::symbol);
    for ((x, y), cell) in layout.iter() {
        match cell {
            Cell::Wall => canvas[x][y] = palette::WALL,
            Cell::Pad(symbol) => {
                if let Ok(color) = palette::pad_color(symbol) {
                    canvas[x][y] = if current == Some(symbol) { color } else { palette::dim(color) };
                }
            }
            Cell::Floor | Cell::Spawn => {}
        }
    }
    if player.0 < CANVAS && player.1 < CANVAS {
        canvas[player.0][player.1] = palette::AGENT;
    }

    for column in canvas.iter_mut() {
        column[STRIP_ROW] = palette::WALL;
        column[STRIP_ROW + 1] = palette::WALL;
    }
    let start = sequence.len().saturating_sub(RECENT_LEN);
    for (i, symbol) in sequence[start..].iter().enumerate() {
        if let Ok(color) = palette::pad_color(*symbol) {
            canvas[2 * i + 1][STRIP_ROW] = color;
        }
    }

    let mut pixels = Vec::with_capacity(IMAGE_SIZE * IMAGE_SIZE * CHANNELS);
    for py in 0..IMAGE_SIZE {
        for px in 0..IMAGE_SIZE {
            pixels.extend_from_slice(&canvas[px / SCALE][py / SCALE]);
        }
    }
    Frame { pixels }
}
