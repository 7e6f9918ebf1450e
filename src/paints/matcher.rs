//! Per-brand paint ranking by CIEDE2000

use std::collections::BTreeMap;
use std::sync::Arc;

use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::color::ColorConverter;
use crate::error::Result;
use crate::paints::database::{PaintDatabase, PaintRecord};

/// One ranked paint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintMatch {
    pub paint: PaintRecord,
    /// CIEDE2000 distance to the detected color
    pub distance: f32,
}

/// Ranks paints of each brand against a detected color
#[derive(Debug, Clone)]
pub struct PaintMatcher {
    converter: ColorConverter,
    database: Arc<PaintDatabase>,
}

impl PaintMatcher {
    pub fn new(database: Arc<PaintDatabase>) -> Self {
        Self {
            converter: ColorConverter::new(),
            database,
        }
    }

    pub fn database(&self) -> &PaintDatabase {
        &self.database
    }

    /// Up to `limit` paints of `brand`, nearest first
    ///
    /// Ties on distance are ordered by paint name. A brand missing from the
    /// database yields an empty list.
    pub fn match_brand(&self, lab: Lab, brand: &str, limit: usize) -> Vec<PaintMatch> {
        let mut ranked: Vec<(f32, &PaintRecord)> = self
            .database
            .paints_for_brand(brand)
            .map(|paint| (self.converter.delta_e_2000(lab, paint.lab()), paint))
            .collect();

        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(distance, paint)| PaintMatch {
                paint: paint.clone(),
                distance,
            })
            .collect()
    }

    /// Matches for every requested brand (all database brands when `brands` is `None`)
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Cancelled` if the token is already cancelled
    pub fn match_brands(
        &self,
        lab: Lab,
        brands: Option<&[String]>,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<BTreeMap<String, Vec<PaintMatch>>> {
        cancel.check()?;

        let brands: Vec<String> = match brands {
            Some(filter) => filter.to_vec(),
            None => self.database.brands().into_iter().map(str::to_string).collect(),
        };

        Ok(brands
            .into_iter()
            .map(|brand| {
                let matches = self.match_brand(lab, &brand, limit);
                (brand, matches)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::paints::database::{PaintEntry, PaintType};

    fn small_database() -> Arc<PaintDatabase> {
        Arc::new(
            PaintDatabase::from_entries(vec![
                PaintEntry::new("Alpha", "Near Red", PaintType::Base, "#FE0101"),
                PaintEntry::new("Alpha", "Pure Red", PaintType::Base, "#FF0000"),
                PaintEntry::new("Beta", "Blue", PaintType::Base, "#0000FF"),
                PaintEntry::new("Beta", "Navy", PaintType::Base, "#000080"),
                PaintEntry::new("Beta", "Crimson", PaintType::Layer, "#DC143C"),
            ])
            .unwrap(),
        )
    }

    fn red() -> Lab {
        ColorConverter::new().rgb_to_lab([255, 0, 0])
    }

    #[test]
    fn test_exact_match_ranks_first_with_zero_distance() {
        let matcher = PaintMatcher::new(small_database());
        let matches = matcher.match_brand(red(), "Alpha", 5);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].paint.name, "Pure Red");
        assert_eq!(matches[0].distance, 0.0);
        assert_eq!(matches[1].paint.name, "Near Red");
        assert!(matches[1].distance > 0.0);
    }

    #[test]
    fn test_limit_bounded_by_brand_size() {
        let matcher = PaintMatcher::new(small_database());
        assert_eq!(matcher.match_brand(red(), "Alpha", 3).len(), 2);
        assert_eq!(matcher.match_brand(red(), "Beta", 2).len(), 2);
    }

    #[test]
    fn test_sorted_ascending() {
        let matcher = PaintMatcher::new(PaintDatabase::builtin());
        let matches = matcher.match_brand(red(), "Citadel", 10);
        assert_eq!(matches.len(), 10);
        for pair in matches.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_ties_broken_by_name() {
        let db = PaintDatabase::from_entries(vec![
            PaintEntry::new("Twin", "Zeta", PaintType::Base, "#336699"),
            PaintEntry::new("Twin", "Alpha", PaintType::Base, "#336699"),
        ])
        .unwrap();
        let matcher = PaintMatcher::new(Arc::new(db));
        let lab = ColorConverter::new().rgb_to_lab([0x33, 0x66, 0x99]);
        let names: Vec<String> = matcher
            .match_brand(lab, "Twin", 2)
            .into_iter()
            .map(|m| m.paint.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_all_brands_in_lexical_order() {
        let matcher = PaintMatcher::new(small_database());
        let by_brand = matcher.match_brands(red(), None, 5, &CancelToken::new()).unwrap();
        let brands: Vec<&String> = by_brand.keys().collect();
        assert_eq!(brands, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_unknown_brand_yields_empty_list() {
        let matcher = PaintMatcher::new(small_database());
        let filter = vec!["Gamma".to_string()];
        let by_brand = matcher
            .match_brands(red(), Some(&filter), 5, &CancelToken::new())
            .unwrap();
        assert!(by_brand["Gamma"].is_empty());
    }

    #[test]
    fn test_cancelled_before_matching() {
        let matcher = PaintMatcher::new(small_database());
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            matcher.match_brands(red(), None, 5, &token),
            Err(ScanError::Cancelled)
        ));
    }
}
