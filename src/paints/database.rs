//! Reference paint database
//!
//! An immutable table of commercial paints with Lab coordinates computed once
//! at construction. The builtin table is built lazily and shared behind an
//! `Arc`; caller-supplied tables come from entries or JSON.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::color::conversion::{array_to_lab, lab_to_array};
use crate::color::ColorConverter;
use crate::error::{Result, ScanError};

/// Product line a paint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintType {
    Base,
    Layer,
    Shade,
    Wash,
    Highlight,
    Contrast,
    Metallic,
    Technical,
    Dry,
    Air,
}

impl PaintType {
    /// Shades and washes are glazes, never a base coat
    pub fn is_glaze(self) -> bool {
        matches!(self, PaintType::Shade | PaintType::Wash)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaintType::Base => "base",
            PaintType::Layer => "layer",
            PaintType::Shade => "shade",
            PaintType::Wash => "wash",
            PaintType::Highlight => "highlight",
            PaintType::Contrast => "contrast",
            PaintType::Metallic => "metallic",
            PaintType::Technical => "technical",
            PaintType::Dry => "dry",
            PaintType::Air => "air",
        }
    }
}

impl fmt::Display for PaintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw table entry as supplied by callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintEntry {
    pub brand: String,
    pub name: String,
    #[serde(rename = "type")]
    pub paint_type: PaintType,
    pub hex: String,
}

impl PaintEntry {
    pub fn new(brand: impl Into<String>, name: impl Into<String>, paint_type: PaintType, hex: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            name: name.into(),
            paint_type,
            hex: hex.into(),
        }
    }
}

/// A paint with precomputed display and Lab values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintRecord {
    pub brand: String,
    pub name: String,
    #[serde(rename = "type")]
    pub paint_type: PaintType,
    /// Normalized uppercase `#RRGGBB`
    pub hex: String,
    pub rgb: [u8; 3],
    /// `[L, a, b]`
    pub lab: [f32; 3],
}

impl PaintRecord {
    pub fn lab(&self) -> Lab {
        array_to_lab(self.lab)
    }
}

/// Immutable paint table
#[derive(Debug, Clone, Default)]
pub struct PaintDatabase {
    paints: Vec<PaintRecord>,
}

static BUILTIN: OnceLock<Arc<PaintDatabase>> = OnceLock::new();

impl PaintDatabase {
    /// Shared builtin table (Citadel, Vallejo, Army Painter)
    pub fn builtin() -> Arc<PaintDatabase> {
        BUILTIN
            .get_or_init(|| {
                let converter = ColorConverter::new();
                let paints: Vec<PaintRecord> = BUILTIN_PAINTS
                    .iter()
                    .filter_map(|&(brand, name, paint_type, hex)| {
                        match build_record(&converter, PaintEntry::new(brand, name, paint_type, hex)) {
                            Ok(record) => Some(record),
                            Err(e) => {
                                tracing::warn!(brand, name, error = %e, "skipping invalid builtin paint");
                                None
                            }
                        }
                    })
                    .collect();
                tracing::debug!(paints = paints.len(), "builtin paint database loaded");
                Arc::new(PaintDatabase { paints })
            })
            .clone()
    }

    /// Build a table from caller entries
    ///
    /// # Errors
    ///
    /// Returns `ScanError::InvalidPaintRecord` for an entry with an empty
    /// brand or name, or a hex value that does not parse
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = PaintEntry>,
    {
        let converter = ColorConverter::new();
        let paints = entries
            .into_iter()
            .map(|entry| build_record(&converter, entry))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { paints })
    }

    /// Parse a JSON array of `{ brand, name, type, hex }` objects
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<PaintEntry> =
            serde_json::from_str(json).map_err(|e| ScanError::config("Failed to parse paint database", e))?;
        Self::from_entries(entries)
    }

    /// Load a JSON paint table from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| ScanError::config(format!("Failed to read paint database {}", path.display()), e))?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.paints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paints.is_empty()
    }

    pub fn paints(&self) -> &[PaintRecord] {
        &self.paints
    }

    /// Distinct brand names in lexical order
    pub fn brands(&self) -> Vec<&str> {
        self.paints
            .iter()
            .map(|p| p.brand.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Paints of one brand (case-insensitive), in table order
    pub fn paints_for_brand<'a, 'b>(&'a self, brand: &'b str) -> impl Iterator<Item = &'a PaintRecord> + 'b
    where
        'a: 'b,
    {
        self.paints.iter().filter(move |p| p.brand.eq_ignore_ascii_case(brand))
    }

    /// Exact (case-insensitive) lookup of a paint by brand and name
    pub fn find_by_name(&self, brand: &str, name: &str) -> Option<&PaintRecord> {
        self.paints
            .iter()
            .find(|p| p.brand.eq_ignore_ascii_case(brand) && p.name.eq_ignore_ascii_case(name))
    }

}

fn build_record(converter: &ColorConverter, entry: PaintEntry) -> Result<PaintRecord> {
    if entry.brand.trim().is_empty() {
        return Err(ScanError::InvalidPaintRecord {
            name: entry.name,
            reason: "brand is empty".to_string(),
        });
    }
    if entry.name.trim().is_empty() {
        return Err(ScanError::InvalidPaintRecord {
            name: entry.name,
            reason: "name is empty".to_string(),
        });
    }

    let rgb = converter
        .hex_to_rgb(&entry.hex)
        .map_err(|_| ScanError::InvalidPaintRecord {
            name: entry.name.clone(),
            reason: format!("invalid hex color '{}'", entry.hex),
        })?;

    Ok(PaintRecord {
        hex: converter.rgb_to_hex(rgb),
        lab: lab_to_array(converter.rgb_to_lab(rgb)),
        rgb,
        brand: entry.brand,
        name: entry.name,
        paint_type: entry.paint_type,
    })
}

/// (brand, name, type, hex)
const BUILTIN_PAINTS: &[(&str, &str, PaintType, &str)] = &[
    // Citadel base and layer
    ("Citadel", "Abaddon Black", PaintType::Base, "#231F20"),
    ("Citadel", "Ceramite White", PaintType::Base, "#FFFFFF"),
    ("Citadel", "Corax White", PaintType::Base, "#F0F0F0"),
    ("Citadel", "Mephiston Red", PaintType::Base, "#960C09"),
    ("Citadel", "Khorne Red", PaintType::Base, "#6A0001"),
    ("Citadel", "Screamer Pink", PaintType::Base, "#811638"),
    ("Citadel", "Rhinox Hide", PaintType::Base, "#493435"),
    ("Citadel", "Mournfang Brown", PaintType::Base, "#621E18"),
    ("Citadel", "Bugmans Glow", PaintType::Base, "#834437"),
    ("Citadel", "Cadian Fleshtone", PaintType::Layer, "#C77F6D"),
    ("Citadel", "Averland Sunset", PaintType::Base, "#FDB825"),
    ("Citadel", "Yriel Yellow", PaintType::Layer, "#FFE900"),
    ("Citadel", "Jokaero Orange", PaintType::Base, "#EE3823"),
    ("Citadel", "Moot Green", PaintType::Layer, "#52B244"),
    ("Citadel", "Warpstone Glow", PaintType::Layer, "#1E7331"),
    ("Citadel", "Caliban Green", PaintType::Base, "#003D14"),
    ("Citadel", "Macragge Blue", PaintType::Base, "#0D407F"),
    ("Citadel", "Kantor Blue", PaintType::Base, "#021B3A"),
    ("Citadel", "Caledor Sky", PaintType::Layer, "#366699"),
    ("Citadel", "Lothern Blue", PaintType::Layer, "#34B2CE"),
    ("Citadel", "Daemonette Hide", PaintType::Base, "#696684"),
    ("Citadel", "Naggaroth Night", PaintType::Base, "#3D3354"),
    ("Citadel", "Xereus Purple", PaintType::Layer, "#47125A"),
    ("Citadel", "Leadbelcher", PaintType::Metallic, "#888D8F"),
    ("Citadel", "Balthasar Gold", PaintType::Metallic, "#A0784A"),
    ("Citadel", "Retributor Armour", PaintType::Metallic, "#C39E6C"),
    ("Citadel", "Runelord Brass", PaintType::Metallic, "#A58C5B"),
    // Citadel shades
    ("Citadel", "Agrax Earthshade", PaintType::Shade, "#84563D"),
    ("Citadel", "Nuln Oil", PaintType::Shade, "#14100E"),
    ("Citadel", "Carroburg Crimson", PaintType::Shade, "#AA0808"),
    ("Citadel", "Drakenhof Nightshade", PaintType::Shade, "#125899"),
    ("Citadel", "Athonian Camoshade", PaintType::Shade, "#475B2E"),
    ("Citadel", "Reikland Fleshshade", PaintType::Shade, "#CA6C4D"),
    ("Citadel", "Casandora Yellow", PaintType::Shade, "#ECB02E"),
    ("Citadel", "Biel-Tan Green", PaintType::Shade, "#1BA169"),
    ("Citadel", "Coelia Greenshade", PaintType::Shade, "#0E7F78"),
    ("Citadel", "Druchii Violet", PaintType::Shade, "#7A468C"),
    // Vallejo Model Color
    ("Vallejo", "Black", PaintType::Base, "#000000"),
    ("Vallejo", "White", PaintType::Base, "#FFFFFF"),
    ("Vallejo", "Flat Red", PaintType::Base, "#B01010"),
    ("Vallejo", "Scarlet", PaintType::Base, "#911419"),
    ("Vallejo", "Vermillion", PaintType::Base, "#FF3108"),
    ("Vallejo", "Orange", PaintType::Base, "#FF6B08"),
    ("Vallejo", "Golden Yellow", PaintType::Base, "#F7CA18"),
    ("Vallejo", "Lemon Yellow", PaintType::Base, "#FFF212"),
    ("Vallejo", "Olive Green", PaintType::Base, "#505F23"),
    ("Vallejo", "Green", PaintType::Base, "#09A134"),
    ("Vallejo", "Flat Blue", PaintType::Base, "#005B94"),
    ("Vallejo", "Blue", PaintType::Base, "#004E9E"),
    ("Vallejo", "Azure", PaintType::Base, "#1890C8"),
    ("Vallejo", "Prussian Blue", PaintType::Base, "#1C2D44"),
    ("Vallejo", "Violet", PaintType::Base, "#4C2B4F"),
    ("Vallejo", "Royal Purple", PaintType::Base, "#5B3256"),
    ("Vallejo", "Burnt Umber", PaintType::Base, "#573B2A"),
    ("Vallejo", "Chocolate Brown", PaintType::Base, "#3C2215"),
    ("Vallejo", "Flat Brown", PaintType::Base, "#704E1F"),
    ("Vallejo", "German Grey", PaintType::Base, "#3E4446"),
    ("Vallejo", "Dark Grey", PaintType::Base, "#616667"),
    ("Vallejo", "Medium Grey", PaintType::Base, "#8D9092"),
    ("Vallejo", "Light Grey", PaintType::Base, "#BFBFBF"),
    // Vallejo washes
    ("Vallejo", "Red Shade", PaintType::Wash, "#7A1D1A"),
    ("Vallejo", "Sepia Shade", PaintType::Wash, "#6B4A2B"),
    ("Vallejo", "Yellow Shade", PaintType::Wash, "#B8860B"),
    ("Vallejo", "Umber Shade", PaintType::Wash, "#4B3621"),
    ("Vallejo", "Green Shade", PaintType::Wash, "#2F4F2F"),
    ("Vallejo", "Blue Shade", PaintType::Wash, "#1F3A5F"),
    ("Vallejo", "Violet Shade", PaintType::Wash, "#4B2E5A"),
    ("Vallejo", "Flesh Wash", PaintType::Wash, "#A0674B"),
    ("Vallejo", "Black Shade", PaintType::Wash, "#1A1A1A"),
    // Army Painter Warpaints
    ("Army Painter", "Matt Black", PaintType::Base, "#000000"),
    ("Army Painter", "Matt White", PaintType::Base, "#FFFFFF"),
    ("Army Painter", "Pure Red", PaintType::Base, "#DC1F3C"),
    ("Army Painter", "Dragon Red", PaintType::Base, "#B8191E"),
    ("Army Painter", "Greenskin", PaintType::Base, "#87A961"),
    ("Army Painter", "Angel Green", PaintType::Base, "#1A9B4A"),
    ("Army Painter", "Electric Blue", PaintType::Base, "#1598D3"),
    ("Army Painter", "Ultramarine Blue", PaintType::Base, "#1E3F83"),
    ("Army Painter", "Royal Purple", PaintType::Base, "#5A2C7A"),
    ("Army Painter", "Alien Purple", PaintType::Base, "#8952AC"),
    ("Army Painter", "Gun Metal", PaintType::Metallic, "#585E62"),
    ("Army Painter", "Shining Silver", PaintType::Metallic, "#C5C8CB"),
    ("Army Painter", "Greedy Gold", PaintType::Metallic, "#C9A952"),
    ("Army Painter", "Weapon Bronze", PaintType::Metallic, "#947456"),
    // Army Painter tones
    ("Army Painter", "Red Tone", PaintType::Wash, "#7E1F1F"),
    ("Army Painter", "Soft Tone", PaintType::Wash, "#8A6A3A"),
    ("Army Painter", "Strong Tone", PaintType::Wash, "#5C3A1E"),
    ("Army Painter", "Dark Tone", PaintType::Wash, "#1E1A16"),
    ("Army Painter", "Green Tone", PaintType::Wash, "#2E4A22"),
    ("Army Painter", "Blue Tone", PaintType::Wash, "#1E3350"),
    ("Army Painter", "Purple Tone", PaintType::Wash, "#4A2A55"),
    ("Army Painter", "Flesh Wash", PaintType::Wash, "#B07A5A"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_fully_loaded() {
        let db = PaintDatabase::builtin();
        assert_eq!(db.len(), BUILTIN_PAINTS.len());
        assert_eq!(db.brands(), vec!["Army Painter", "Citadel", "Vallejo"]);
    }

    #[test]
    fn test_builtin_is_shared() {
        assert!(Arc::ptr_eq(&PaintDatabase::builtin(), &PaintDatabase::builtin()));
    }

    #[test]
    fn test_lab_precomputed() {
        let db = PaintDatabase::builtin();
        let white = db.find_by_name("Vallejo", "White").unwrap();
        assert!((white.lab[0] - 100.0).abs() < 0.1);
        assert_eq!(white.rgb, [255, 255, 255]);
    }

    #[test]
    fn test_paints_for_brand_case_insensitive() {
        let db = PaintDatabase::builtin();
        let citadel = db.paints_for_brand("citadel").count();
        assert_eq!(citadel, db.paints_for_brand("Citadel").count());
        assert!(citadel > 0);
        assert_eq!(db.paints_for_brand("Reaper").count(), 0);
    }

    #[test]
    fn test_find_by_name_scoped_to_brand() {
        let db = PaintDatabase::builtin();
        assert_eq!(db.find_by_name("Vallejo", "flesh wash").unwrap().brand, "Vallejo");
        assert_eq!(db.find_by_name("Army Painter", "Flesh Wash").unwrap().brand, "Army Painter");
        assert!(db.find_by_name("Citadel", "Flesh Wash").is_none());
    }

    #[test]
    fn test_find_by_name_outlives_brand_argument() {
        let db = PaintDatabase::builtin();
        let found = {
            let brand = String::from("vallejo");
            db.find_by_name(&brand, "WHITE")
        };
        assert_eq!(found.map(|p| p.hex.as_str()), Some("#FFFFFF"));

        let brand = String::from("Citadel");
        let first = db.paints_for_brand(&brand).next().map(|p| p.name.clone());
        assert!(first.is_some());
    }

    #[test]
    fn test_signed_hex_rejected() {
        let signed = PaintDatabase::from_entries(vec![PaintEntry::new("Test", "Odd", PaintType::Base, "#+1+2+3")]);
        assert!(matches!(signed, Err(ScanError::InvalidPaintRecord { .. })));
    }

    #[test]
    fn test_from_entries_normalizes_hex() {
        let db = PaintDatabase::from_entries(vec![PaintEntry::new("Test", "Red", PaintType::Base, "ff0000")]).unwrap();
        assert_eq!(db.paints()[0].hex, "#FF0000");
    }

    #[test]
    fn test_invalid_records_rejected() {
        let bad_hex = PaintDatabase::from_entries(vec![PaintEntry::new("Test", "Mud", PaintType::Base, "#GG0000")]);
        assert!(matches!(bad_hex, Err(ScanError::InvalidPaintRecord { .. })));

        let no_name = PaintDatabase::from_entries(vec![PaintEntry::new("Test", " ", PaintType::Base, "#000000")]);
        assert!(matches!(no_name, Err(ScanError::InvalidPaintRecord { .. })));
    }

    #[test]
    fn test_from_json_str() {
        let json = r##"[
            {"brand": "Test", "name": "Red", "type": "base", "hex": "#FF0000"},
            {"brand": "Test", "name": "Dark Wash", "type": "wash", "hex": "#101010"}
        ]"##;
        let db = PaintDatabase::from_json_str(json).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.paints()[1].paint_type, PaintType::Wash);

        assert!(matches!(PaintDatabase::from_json_str("{"), Err(ScanError::Config { .. })));
    }

    #[test]
    fn test_empty_database() {
        let db = PaintDatabase::from_entries(Vec::new()).unwrap();
        assert!(db.is_empty());
        assert!(db.brands().is_empty());
    }
}
