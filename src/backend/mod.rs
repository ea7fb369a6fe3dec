//! The boundary to the nutrition API. Components only see
//! [`NutritionBackend`]; [`HttpBackend`] is the real transport.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use time::Date;

use crate::auth::{AuthResponse, AuthSession, Credentials};
use crate::catalog::{CatalogItem, FoodCreated, NewFood};
use crate::chat::{ChatRequest, ChatResponse};
use crate::error::CoreResult;
use crate::goals::{DailySummary, Goals};
use crate::meals::LogMealRequest;

#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use http::HttpBackend;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[async_trait]
pub trait NutritionBackend: Send + Sync {
    async fn login(&self, creds: &Credentials) -> CoreResult<AuthResponse>;
    async fn register(&self, creds: &Credentials) -> CoreResult<AuthResponse>;

    async fn search_foods(&self, auth: &AuthSession, term: &str) -> CoreResult<Vec<CatalogItem>>;
    async fn add_food(&self, auth: &AuthSession, food: &NewFood) -> CoreResult<FoodCreated>;
    async fn estimate_food(&self, auth: &AuthSession, name: &str) -> CoreResult<Value>;

    async fn log_meal(&self, auth: &AuthSession, meal: &LogMealRequest) -> CoreResult<()>;
    async fn get_summary(&self, auth: &AuthSession, date: Option<Date>) -> CoreResult<DailySummary>;

    async fn get_goals(&self, auth: &AuthSession) -> CoreResult<Goals>;
    async fn set_goals(&self, auth: &AuthSession, goals: &Goals) -> CoreResult<()>;

    async fn send_chat(&self, auth: &AuthSession, request: &ChatRequest) -> CoreResult<ChatResponse>;

    async fn health(&self) -> CoreResult<Health>;
}
