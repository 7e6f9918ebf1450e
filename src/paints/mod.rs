//! Paint reference data, matching and recipes

pub mod database;
pub mod matcher;
pub mod recipe;

pub use database::{PaintDatabase, PaintEntry, PaintRecord, PaintType};
pub use matcher::{PaintMatch, PaintMatcher};
pub use recipe::{BrandRecipe, PaintRecipe, RecipeBuilder, RecipeStep};
