use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::auth::AuthSession;
use crate::backend::NutritionBackend;
use crate::catalog::dto::{CatalogItem, FoodCreated, NewFood};
use crate::error::{CoreError, CoreResult};
use crate::flight::Flight;

/// Holds the most recent search result. Each response replaces the previous
/// list wholesale; nothing is merged or de-duplicated client-side.
#[derive(Debug)]
pub struct Catalog {
    results: Vec<CatalogItem>,
    flight: Flight,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            flight: Flight::new("food search"),
        }
    }
}

impl Catalog {
    pub fn results(&self) -> &[CatalogItem] {
        &self.results
    }

    pub fn find(&self, id: i64) -> Option<&CatalogItem> {
        self.results.iter().find(|i| i.id == id)
    }

    pub fn is_searching(&self) -> bool {
        self.flight.is_busy()
    }

    /// An empty term is forwarded as-is; the service decides what it lists.
    #[instrument(skip(self, backend, auth))]
    pub async fn search(
        &mut self,
        backend: &dyn NutritionBackend,
        auth: &AuthSession,
        term: &str,
    ) -> CoreResult<&[CatalogItem]> {
        let ticket = self.flight.begin()?;
        let outcome = backend.search_foods(auth, term).await;
        self.flight.finish(ticket);
        match outcome {
            Ok(items) => {
                debug!(count = items.len(), "search results");
                self.results = items;
                Ok(&self.results)
            }
            Err(e) => {
                warn!(error = %e, "food search failed");
                Err(e)
            }
        }
    }
}

#[instrument(skip(backend, auth, food), fields(name = %food.name))]
pub async fn create_food(
    backend: &dyn NutritionBackend,
    auth: &AuthSession,
    food: NewFood,
) -> CoreResult<FoodCreated> {
    if food.name.trim().is_empty() {
        return Err(CoreError::validation("Food name is required"));
    }
    let values = [food.cal, food.protein, food.carbs, food.fat];
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(CoreError::validation(
            "Nutrition values must be non-negative numbers",
        ));
    }
    backend.add_food(auth, &food).await
}

/// Asks the service to guess nutrition for a food name. The answer is
/// returned untouched for display.
#[instrument(skip(backend, auth))]
pub async fn estimate_food(
    backend: &dyn NutritionBackend,
    auth: &AuthSession,
    name: &str,
) -> CoreResult<Value> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::validation("Food name is required"));
    }
    backend.estimate_food(auth, name).await
}
