//! Painting recipes: base, shade, highlight and wash per brand
//!
//! The base is the closest opaque paint. Shade and highlight are the closest
//! opaque paints to the color darkened or lightened in L*. The wash comes from
//! a fixed per-brand table keyed by family group and must exist in the
//! database; it is never invented.

use std::collections::BTreeMap;
use std::sync::Arc;

use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::color::{ColorConverter, FamilyGroup};
use crate::constants::recipe::{HIGHLIGHT_LIGHTNESS_DELTA, SHADE_LIGHTNESS_DELTA};
use crate::paints::database::{PaintDatabase, PaintRecord, PaintType};

/// One paint used in a recipe step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub name: String,
    pub hex: String,
    #[serde(rename = "type")]
    pub paint_type: PaintType,
    /// CIEDE2000 distance to the step's target color (0 for washes)
    pub distance: f32,
}

impl RecipeStep {
    fn from_paint(paint: &PaintRecord, distance: f32) -> Self {
        Self {
            name: paint.name.clone(),
            hex: paint.hex.clone(),
            paint_type: paint.paint_type,
            distance,
        }
    }
}

/// Recipe for one brand; a step is `None` when the brand has no suitable paint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandRecipe {
    pub base: Option<RecipeStep>,
    pub shade: Option<RecipeStep>,
    pub highlight: Option<RecipeStep>,
    pub wash: Option<RecipeStep>,
}

/// Brand name to recipe, brands in lexical order
pub type PaintRecipe = BTreeMap<String, BrandRecipe>;

/// Builds recipes from a paint database
#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    converter: ColorConverter,
    database: Arc<PaintDatabase>,
}

impl RecipeBuilder {
    pub fn new(database: Arc<PaintDatabase>) -> Self {
        Self {
            converter: ColorConverter::new(),
            database,
        }
    }

    /// Recipes for every listed brand
    pub fn build<S: AsRef<str>>(&self, lab: Lab, group: FamilyGroup, brands: &[S]) -> PaintRecipe {
        brands
            .iter()
            .map(|brand| {
                let brand = brand.as_ref();
                (brand.to_string(), self.recipe_for_brand(lab, group, brand))
            })
            .collect()
    }

    pub fn recipe_for_brand(&self, lab: Lab, group: FamilyGroup, brand: &str) -> BrandRecipe {
        let opaque: Vec<&PaintRecord> = self
            .database
            .paints_for_brand(brand)
            .filter(|p| is_opaque(p))
            .collect();

        let wash = wash_name(brand, group)
            .and_then(|name| self.database.find_by_name(brand, name))
            .map(|paint| RecipeStep::from_paint(paint, 0.0));

        BrandRecipe {
            base: self.closest(lab, &opaque),
            shade: self.closest(shift_lightness(lab, SHADE_LIGHTNESS_DELTA), &opaque),
            highlight: self.closest(shift_lightness(lab, HIGHLIGHT_LIGHTNESS_DELTA), &opaque),
            wash,
        }
    }

    fn closest(&self, target: Lab, paints: &[&PaintRecord]) -> Option<RecipeStep> {
        paints
            .iter()
            .map(|paint| (self.converter.delta_e_2000(target, paint.lab()), *paint))
            .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)))
            .map(|(distance, paint)| RecipeStep::from_paint(paint, distance))
    }
}

/// Paints usable as base, shade or highlight coats
fn is_opaque(paint: &PaintRecord) -> bool {
    let name = paint.name.to_lowercase();
    !paint.paint_type.is_glaze() && !name.contains("wash") && !name.contains("shade")
}

fn shift_lightness(lab: Lab, delta: f32) -> Lab {
    Lab::new((lab.l + delta).clamp(0.0, 100.0), lab.a, lab.b)
}

/// Wash for a family group in a brand's range; `None` for unknown brands
pub fn wash_name(brand: &str, group: FamilyGroup) -> Option<&'static str> {
    use FamilyGroup::*;

    let name = match brand.to_ascii_lowercase().as_str() {
        "citadel" => match group {
            Red | Pink => "Carroburg Crimson",
            Orange | Flesh | Gold => "Reikland Fleshshade",
            Yellow => "Casandora Yellow",
            Brown => "Agrax Earthshade",
            Green => "Biel-Tan Green",
            Cyan => "Coelia Greenshade",
            Blue => "Drakenhof Nightshade",
            Purple => "Druchii Violet",
            Black | Grey | White | Silver => "Nuln Oil",
        },
        "vallejo" => match group {
            Red | Pink => "Red Shade",
            Orange | Gold => "Sepia Shade",
            Yellow => "Yellow Shade",
            Brown => "Umber Shade",
            Green | Cyan => "Green Shade",
            Blue => "Blue Shade",
            Purple => "Violet Shade",
            Flesh => "Flesh Wash",
            Black | Grey | White | Silver => "Black Shade",
        },
        "army painter" => match group {
            Red | Pink => "Red Tone",
            Orange | Yellow | Gold => "Soft Tone",
            Brown => "Strong Tone",
            Green => "Green Tone",
            Cyan | Blue => "Blue Tone",
            Purple => "Purple Tone",
            Flesh => "Flesh Wash",
            Black | Grey | White | Silver => "Dark Tone",
        },
        _ => return None,
    };

    Some(name)
}
