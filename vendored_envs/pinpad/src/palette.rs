use crate::error::PinPadError;

pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];
pub const GRAY: Rgb = [192, 192, 192];
pub const BLACK: Rgb = [0, 0, 0];

/// Background, wall and agent marker colors.
pub const BACKGROUND: Rgb = WHITE;
pub const WALL: Rgb = GRAY;
pub const AGENT: Rgb = BLACK;

/// Pad symbol to color table. Symbols `1`..`8` are the only valid pads.
const PADS: [(char, Rgb); 8] = [
    ('1', [255, 0, 0]),   // red
    ('2', [0, 255, 0]),   // green
    ('3', [0, 0, 255]),   // blue
    ('4', [255, 255, 0]), // yellow
    ('5', [255, 0, 255]), // magenta
    ('6', [0, 255, 255]), // cyan
    ('7', [128, 0, 128]), // purple
    ('8', [0, 128, 128]), // teal
];

pub fn pad_color(symbol: char) -> Result<Rgb, PinPadError> {
    PADS.iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, c)| *c)
        .ok_or(PinPadError::UnknownPad(symbol))
}

pub fn is_pad_symbol(symbol: char) -> bool {
    PADS.iter().any(|(s, _)| *s == symbol)
}

/// All pad symbols in palette order.
pub fn pad_symbols() -> impl Iterator<Item = char> {
    PADS.iter().map(|(s, _)| *s)
}

/// Blend a color 10% toward white, truncating each channel.
pub fn dim(color: Rgb) -> Rgb {
    let mut out = [0u8; 3];
    for (o, c) in out.iter_mut().zip(color) {
        *o = ((10 * c as u32 + 90 * 255) / 100) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(pad_color('1').unwrap(), [255, 0, 0]);
        assert_eq!(pad_color('8').unwrap(), [0, 128, 128]);
        assert_eq!(pad_color('9'), Err(PinPadError::UnknownPad('9')));
        assert_eq!(pad_color('#'), Err(PinPadError::UnknownPad('#')));
        assert_eq!(pad_symbols().count(), 8);
    }

    #[test]
    fn dim_truncates_toward_white() {
        // 0.1*255 + 0.9*255 = 255; 0.9*255 = 229.5 -> 229; 0.1*128 + 229.5 = 242.3 -> 242
        assert_eq!(dim([255, 0, 128]), [255, 229, 242]);
        assert_eq!(dim(WHITE), WHITE);
    }
}
