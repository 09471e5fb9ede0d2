//! In-memory inspection catalog.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;

use crate::catalog::model::{DetailsQuery, DetailsResponse, Inspection, SearchQuery, SearchResponse};
use crate::config::CatalogConfig;

const BUNDLED_DATASET: &str = include_str!("../../data/restaurants.json");

/// Read-only set of inspection records, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Inspection>,
}

impl Catalog {
    pub fn new(records: Vec<Inspection>) -> Self {
        Self { records }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let records: Vec<Inspection> =
            serde_json::from_str(json).context("Failed to parse inspection dataset")?;
        Ok(Self::new(records))
    }

    /// The dataset shipped with the binary.
    pub fn bundled() -> anyhow::Result<Self> {
        Self::from_json(BUNDLED_DATASET)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn from_config(config: &CatalogConfig) -> anyhow::Result<Self> {
        let catalog = match &config.dataset_path {
            Some(path) => Self::from_path(Path::new(path))?,
            None => Self::bundled()?,
        };
        tracing::info!(
            records = catalog.len(),
            source = config.dataset_path.as_deref().unwrap_or("bundled"),
            "Inspection catalog loaded"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Filter by borough, cuisine substring and grade ceiling.
    ///
    /// Grades compare lexically, so `minGrade: "B"` keeps A and B. Records
    /// that were never graded always match the grade filter.
    pub fn search(&self, query: &SearchQuery) -> SearchResponse {
        let cuisine = query.cuisine.as_deref().map(str::to_lowercase);

        let mut restaurants: Vec<Inspection> = self
            .records
            .iter()
            .filter(|r| match &query.borough {
                Some(borough) => r
                    .boro
                    .as_deref()
                    .is_some_and(|b| b.eq_ignore_ascii_case(borough)),
                None => true,
            })
            .filter(|r| match &cuisine {
                Some(needle) => r
                    .cuisine_description
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .filter(|r| match (&query.min_grade, &r.grade) {
                (Some(ceiling), Some(grade)) => grade.as_str() <= ceiling.as_str(),
                _ => true,
            })
            .cloned()
            .collect();

        restaurants.sort_by(|a, b| a.dba.cmp(&b.dba).then_with(|| newest_first(a, b)));
        restaurants.truncate(query.limit);

        let count = restaurants.len();
        SearchResponse {
            restaurants,
            count,
            message: format!("Found {count} restaurants"),
        }
    }

    /// All inspections of one restaurant, most recent first.
    pub fn details(&self, query: &DetailsQuery) -> DetailsResponse {
        let mut inspections: Vec<Inspection> = self
            .records
            .iter()
            .filter(|r| r.dba.eq_ignore_ascii_case(&query.restaurant_name))
            .filter(|r| match &query.borough {
                Some(borough) => r
                    .boro
                    .as_deref()
                    .is_some_and(|b| b.eq_ignore_ascii_case(borough)),
                None => true,
            })
            .cloned()
            .collect();
        inspections.sort_by(newest_first);

        let inspection_count = inspections.len();
        let message = if inspection_count == 0 {
            "No inspections found for this restaurant".to_string()
        } else {
            format!("Found {inspection_count} inspections")
        };

        DetailsResponse {
            restaurant_name: query.restaurant_name.clone(),
            inspections,
            inspection_count,
            message,
        }
    }

    pub fn boroughs(&self) -> Vec<String> {
        self.distinct(|r| r.boro.as_deref())
    }

    pub fn cuisines(&self) -> Vec<String> {
        self.distinct(|r| r.cuisine_description.as_deref())
    }

    fn distinct<'a, F>(&'a self, field: F) -> Vec<String>
    where
        F: Fn(&'a Inspection) -> Option<&'a str>,
    {
        self.records
            .iter()
            .filter_map(field)
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

// Undated inspections sort last.
fn newest_first(a: &Inspection, b: &Inspection) -> Ordering {
    b.inspection_date.cmp(&a.inspection_date)
}
