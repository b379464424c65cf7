use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::board::Layout;
use crate::error::PinPadError;

/// Shipped maps, named after how many pads they contain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutName {
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl LayoutName {
    pub const ALL: [LayoutName; 6] = [
        LayoutName::Three,
        LayoutName::Four,
        LayoutName::Five,
        LayoutName::Six,
        LayoutName::Seven,
        LayoutName::Eight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutName::Three => "three",
            LayoutName::Four => "four",
            LayoutName::Five => "five",
            LayoutName::Six => "six",
            LayoutName::Seven => "seven",
            LayoutName::Eight => "eight",
        }
    }

    /// Raw map text as stored in `data/layouts`.
    pub fn text(self) -> &'static str {
        match self {
            LayoutName::Three => include_str!("../data/layouts/three.txt"),
            LayoutName::Four => include_str!("../data/layouts/four.txt"),
            LayoutName::Five => include_str!("../data/layouts/five.txt"),
            LayoutName::Six => include_str!("../data/layouts/six.txt"),
            LayoutName::Seven => include_str!("../data/layouts/seven.txt"),
            LayoutName::Eight => include_str!("../data/layouts/eight.txt"),
        }
    }
}

impl fmt::Display for LayoutName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for LayoutName {
    type Err = PinPadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutName::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PinPadError::UnknownLayout(s.to_string()))
    }
}

static PRESET_MAP: OnceCell<HashMap<LayoutName, Layout>> = OnceCell::new();

fn load_presets() -> HashMap<LayoutName, Layout> {
    let mut map = HashMap::new();
    for name in LayoutName::ALL {
        match Layout::parse(name.text()) {
            Ok(layout) => {
                map.insert(name, layout);
            }
            Err(e) => tracing::warn!(layout = %name, error = %e, "skipping malformed preset layout"),
        }
    }
    map
}

/// Parsed preset, shared read-only across environments.
pub fn preset_layout(name: LayoutName) -> Result<Layout, PinPadError> {
    let map = PRESET_MAP.get_or_init(load_presets);
    map.get(&name)
        .cloned()
        .ok_or_else(|| PinPadError::UnknownLayout(name.to_string()))
}
