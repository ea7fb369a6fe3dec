use serde::{Deserialize, Serialize};

use crate::nutrition::Macros;

/// One food as returned by the search endpoint, values per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub serving_desc: String,
    pub cal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub provenance: Option<String>,
}

impl CatalogItem {
    pub fn macros(&self) -> Macros {
        Macros::new(self.cal, self.protein, self.carbs, self.fat)
    }
}

/// Body for creating a user-defined food.
#[derive(Debug, Clone, Serialize)]
pub struct NewFood {
    pub name: String,
    pub serving_desc: String,
    pub cal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub provenance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodCreated {
    #[serde(default)]
    pub food_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}
