//! In-memory backend for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use time::Date;

use super::{Health, NutritionBackend};
use crate::auth::{AuthResponse, AuthSession, Credentials, PublicUser};
use crate::catalog::{CatalogItem, FoodCreated, NewFood};
use crate::chat::{Action, ChatRequest, ChatResponse};
use crate::error::{CoreError, CoreResult};
use crate::goals::{DailySummary, Goals};
use crate::meals::LogMealRequest;

pub(crate) fn item(id: i64, name: &str, cal: f64) -> CatalogItem {
    CatalogItem {
        id,
        name: name.into(),
        serving_desc: "1 serving".into(),
        cal,
        protein: cal / 10.0,
        carbs: cal / 20.0,
        fat: cal / 40.0,
        provenance: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    calls: Mutex<Vec<String>>,
    failure: Mutex<Option<CoreError>>,
    foods: Mutex<Vec<CatalogItem>>,
    goals: Mutex<Option<Goals>>,
    summary: Mutex<DailySummary>,
}

impl FakeBackend {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// The next call of any kind fails with `err`.
    pub(crate) fn fail_next(&self, err: CoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub(crate) fn set_foods(&self, foods: Vec<CatalogItem>) {
        *self.foods.lock().unwrap() = foods;
    }

    pub(crate) fn set_goals_value(&self, goals: Goals) {
        *self.goals.lock().unwrap() = Some(goals);
    }

    pub(crate) fn stored_goals(&self) -> Option<Goals> {
        *self.goals.lock().unwrap()
    }

    pub(crate) fn set_summary(&self, summary: DailySummary) {
        *self.summary.lock().unwrap() = summary;
    }

    fn record(&self, call: String) -> CoreResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn token_for(&self, creds: &Credentials) -> AuthResponse {
        AuthResponse {
            token: "fake-token".into(),
            user: Some(PublicUser {
                id: 1,
                email: creds.email.clone(),
            }),
        }
    }
}

#[async_trait]
impl NutritionBackend for FakeBackend {
    async fn login(&self, creds: &Credentials) -> CoreResult<AuthResponse> {
        self.record(format!("login:{}", creds.email))?;
        Ok(self.token_for(creds))
    }

    async fn register(&self, creds: &Credentials) -> CoreResult<AuthResponse> {
        self.record(format!("register:{}", creds.email))?;
        Ok(self.token_for(creds))
    }

    async fn search_foods(&self, auth: &AuthSession, term: &str) -> CoreResult<Vec<CatalogItem>> {
        auth.bearer()?;
        self.record(format!("search:{term}"))?;
        Ok(self.foods.lock().unwrap().clone())
    }

    async fn add_food(&self, auth: &AuthSession, food: &NewFood) -> CoreResult<FoodCreated> {
        auth.bearer()?;
        self.record(format!("add_food:{}", food.name))?;
        Ok(FoodCreated {
            food_id: Some(99),
            message: Some("Food added successfully".into()),
        })
    }

    async fn estimate_food(&self, auth: &AuthSession, name: &str) -> CoreResult<Value> {
        auth.bearer()?;
        self.record(format!("estimate:{name}"))?;
        Ok(json!({"speak": format!("{name} is about 100 kcal"), "actions": []}))
    }

    async fn log_meal(&self, auth: &AuthSession, meal: &LogMealRequest) -> CoreResult<()> {
        auth.bearer()?;
        let lines: Vec<_> = meal
            .items
            .iter()
            .map(|i| format!("{} x{}", i.name, i.qty))
            .collect();
        self.record(format!("log_meal:{}", lines.join(",")))
    }

    async fn get_summary(&self, auth: &AuthSession, _date: Option<Date>) -> CoreResult<DailySummary> {
        auth.bearer()?;
        self.record("summary".into())?;
        Ok(self.summary.lock().unwrap().clone())
    }

    async fn get_goals(&self, auth: &AuthSession) -> CoreResult<Goals> {
        auth.bearer()?;
        self.record("get_goals".into())?;
        Ok(self.stored_goals().unwrap_or_default())
    }

    async fn set_goals(&self, auth: &AuthSession, goals: &Goals) -> CoreResult<()> {
        auth.bearer()?;
        self.record("set_goals".into())?;
        self.set_goals_value(*goals);
        Ok(())
    }

    async fn send_chat(&self, auth: &AuthSession, request: &ChatRequest) -> CoreResult<ChatResponse> {
        auth.bearer()?;
        self.record(format!(
            "chat:{} (history {})",
            request.message,
            request.history.len()
        ))?;
        Ok(ChatResponse {
            reply: format!("echo: {}", request.message),
            done: true,
            actions: vec![Action {
                name: "echo".into(),
                arguments: json!({"message": request.message}),
            }],
            sql_commands: Vec::new(),
        })
    }

    async fn health(&self) -> CoreResult<Health> {
        self.record("health".into())?;
        Ok(Health {
            status: "healthy".into(),
            version: Some("test".into()),
        })
    }
}
