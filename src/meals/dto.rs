use serde::Serialize;

/// One line of a logged meal. Only the name and quantity travel; the service
/// owns the nutrition math.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealItem {
    pub name: String,
    pub qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogMealRequest {
    pub items: Vec<MealItem>,
    /// `YYYY-MM-DD`; the service uses today when absent.
    pub date: Option<String>,
}
