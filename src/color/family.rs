//! Human-readable color family labels
//!
//! Nearest-neighbour lookup (CIEDE2000) against a fixed reference palette.
//! Every family belongs to a coarse [`FamilyGroup`], which paint recipes use to
//! pick a wash.

use std::fmt;
use std::sync::OnceLock;

use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::color::ColorConverter;

/// Coarse hue/value bucket shared by several families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyGroup {
    Red,
    Orange,
    Yellow,
    Brown,
    Green,
    Cyan,
    Blue,
    Purple,
    Pink,
    Flesh,
    Black,
    Grey,
    White,
    Gold,
    Silver,
}

impl FamilyGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyGroup::Red => "red",
            FamilyGroup::Orange => "orange",
            FamilyGroup::Yellow => "yellow",
            FamilyGroup::Brown => "brown",
            FamilyGroup::Green => "green",
            FamilyGroup::Cyan => "cyan",
            FamilyGroup::Blue => "blue",
            FamilyGroup::Purple => "purple",
            FamilyGroup::Pink => "pink",
            FamilyGroup::Flesh => "flesh",
            FamilyGroup::Black => "black",
            FamilyGroup::Grey => "grey",
            FamilyGroup::White => "white",
            FamilyGroup::Gold => "gold",
            FamilyGroup::Silver => "silver",
        }
    }
}

impl fmt::Display for FamilyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the reference palette
#[derive(Debug, Clone)]
pub struct ColorFamily {
    pub name: &'static str,
    pub hex: &'static str,
    pub group: FamilyGroup,
    pub lab: Lab,
}

/// Reference palette: (name, hex, group). Order matters for ties.
const FAMILY_TABLE: &[(&str, &str, FamilyGroup)] = &[
    ("Crimson", "#9B1B30", FamilyGroup::Red),
    ("Scarlet", "#D42A22", FamilyGroup::Red),
    ("Blood Red", "#6A0E10", FamilyGroup::Red),
    ("Burnt Orange", "#C2571A", FamilyGroup::Orange),
    ("Bright Orange", "#F28C1E", FamilyGroup::Orange),
    ("Golden Yellow", "#F2C12E", FamilyGroup::Yellow),
    ("Lemon Yellow", "#F4E04D", FamilyGroup::Yellow),
    ("Ochre", "#C7932F", FamilyGroup::Yellow),
    ("Chestnut Brown", "#7B3F1D", FamilyGroup::Brown),
    ("Dark Brown", "#4A2C1A", FamilyGroup::Brown),
    ("Tan", "#C09A6B", FamilyGroup::Brown),
    ("Bronze", "#8C6A3C", FamilyGroup::Brown),
    ("Flesh", "#E8B796", FamilyGroup::Flesh),
    ("Olive Green", "#6B7330", FamilyGroup::Green),
    ("Forest Green", "#2E5A2E", FamilyGroup::Green),
    ("Lime Green", "#8CC63F", FamilyGroup::Green),
    ("Teal", "#1F7A7A", FamilyGroup::Cyan),
    ("Turquoise", "#3CC2C2", FamilyGroup::Cyan),
    ("Navy Blue", "#1B2A5C", FamilyGroup::Blue),
    ("Royal Blue", "#2B50AA", FamilyGroup::Blue),
    ("Sky Blue", "#79B4E0", FamilyGroup::Blue),
    ("Violet", "#6A3D9A", FamilyGroup::Purple),
    ("Deep Purple", "#3E1F4E", FamilyGroup::Purple),
    ("Magenta", "#B0307A", FamilyGroup::Pink),
    ("Pink", "#E98FB3", FamilyGroup::Pink),
    ("Black", "#111111", FamilyGroup::Black),
    ("Charcoal", "#3A3A3A", FamilyGroup::Grey),
    ("Slate Grey", "#6D7B8A", FamilyGroup::Grey),
    ("Light Grey", "#B8B8B8", FamilyGroup::Grey),
    ("Bone", "#DDD3B5", FamilyGroup::White),
    ("White", "#F6F6F4", FamilyGroup::White),
    ("Gold", "#C9A13B", FamilyGroup::Gold),
    ("Silver", "#C0C4C8", FamilyGroup::Silver),
];

static FAMILIES: OnceLock<Vec<ColorFamily>> = OnceLock::new();

/// The reference palette with Lab coordinates, computed on first use
pub fn families() -> &'static [ColorFamily] {
    FAMILIES.get_or_init(|| {
        let converter = ColorConverter::new();
        FAMILY_TABLE
            .iter()
            .filter_map(|&(name, hex, group)| {
                converter.hex_to_lab(hex).ok().map(|lab| ColorFamily { name, hex, group, lab })
            })
            .collect()
    })
}

/// Labels Lab colors with the nearest reference family
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyClassifier {
    converter: ColorConverter,
}

impl FamilyClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest family by CIEDE2000; ties go to the first-listed entry
    pub fn classify(&self, lab: Lab) -> &'static ColorFamily {
        let table = families();
        let mut best = &table[0];
        let mut best_distance = f32::INFINITY;

        for family in table {
            let d = self.converter.delta_e_2000(lab, family.lab);
            if d < best_distance {
                best_distance = d;
                best = family;
            }
        }

        best
    }
}
