use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use time::Date;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Health, NutritionBackend};
use crate::auth::{AuthResponse, AuthSession, Credentials};
use crate::catalog::{CatalogItem, FoodCreated, NewFood};
use crate::chat::{ChatRequest, ChatResponse};
use crate::config::ClientConfig;
use crate::error::{CoreError, CoreResult};
use crate::goals::{DailySummary, Goals};
use crate::iso_date;
use crate::meals::LogMealRequest;

/// `{success, message}` body returned by write endpoints.
#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default = "accepted")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn accepted() -> bool {
    true
}

/// JSON-over-HTTP client for the nutrition API.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> CoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("nutricoach/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, auth: &AuthSession) -> CoreResult<RequestBuilder> {
        Ok(self.http.get(self.url(path)).bearer_auth(auth.bearer()?))
    }

    fn post(&self, path: &str, auth: &AuthSession) -> CoreResult<RequestBuilder> {
        Ok(self.http.post(self.url(path)).bearer_auth(auth.bearer()?))
    }

    async fn execute<T: DeserializeOwned>(&self, path: &str, req: RequestBuilder) -> CoreResult<T> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, path, "api request");

        let resp = req
            .header("x-request-id", request_id.to_string())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, %request_id, path, "api request did not complete");
                CoreError::remote(None, e.to_string())
            })?;

        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(|e| {
                warn!(error = %e, %request_id, path, "unreadable api response");
                CoreError::remote(Some(status.as_u16()), format!("invalid response body: {e}"))
            });
        }

        let body = resp.text().await.unwrap_or_default();
        let detail = error_detail(&body)
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        warn!(%status, %request_id, path, detail = %detail, "api error");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CoreError::Auth(detail));
        }
        Err(CoreError::remote(Some(status.as_u16()), detail))
    }

    async fn acknowledge(&self, path: &str, req: RequestBuilder) -> CoreResult<()> {
        let ack: Ack = self.execute(path, req).await?;
        if ack.success {
            Ok(())
        } else {
            Err(CoreError::remote(
                None,
                ack.message.unwrap_or_else(|| "request was not accepted".into()),
            ))
        }
    }
}

/// Pulls `detail` out of an error body. Non-string details (validation
/// error lists) are passed through as JSON text.
fn error_detail(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    match v.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl NutritionBackend for HttpBackend {
    async fn login(&self, creds: &Credentials) -> CoreResult<AuthResponse> {
        let path = "/api/auth/login";
        self.execute(path, self.http.post(self.url(path)).json(creds))
            .await
    }

    async fn register(&self, creds: &Credentials) -> CoreResult<AuthResponse> {
        let path = "/api/auth/register";
        self.execute(path, self.http.post(self.url(path)).json(creds))
            .await
    }

    async fn search_foods(&self, auth: &AuthSession, term: &str) -> CoreResult<Vec<CatalogItem>> {
        let path = "/api/foods";
        let req = self.get(path, auth)?.query(&[("search", term)]);
        self.execute(path, req).await
    }

    async fn add_food(&self, auth: &AuthSession, food: &NewFood) -> CoreResult<FoodCreated> {
        let path = "/api/foods";
        let req = self.post(path, auth)?.json(food);
        self.execute(path, req).await
    }

    async fn estimate_food(&self, auth: &AuthSession, name: &str) -> CoreResult<Value> {
        let path = "/api/foods/estimate";
        let req = self.post(path, auth)?.query(&[("name", name)]);
        self.execute(path, req).await
    }

    async fn log_meal(&self, auth: &AuthSession, meal: &LogMealRequest) -> CoreResult<()> {
        let path = "/api/meals";
        let req = self.post(path, auth)?.json(meal);
        self.acknowledge(path, req).await
    }

    async fn get_summary(&self, auth: &AuthSession, date: Option<Date>) -> CoreResult<DailySummary> {
        let path = "/api/summary";
        let mut req = self.get(path, auth)?;
        if let Some(d) = date {
            req = req.query(&[("date", iso_date(d))]);
        }
        self.execute(path, req).await
    }

    async fn get_goals(&self, auth: &AuthSession) -> CoreResult<Goals> {
        let path = "/api/goals";
        let req = self.get(path, auth)?;
        self.execute(path, req).await
    }

    async fn set_goals(&self, auth: &AuthSession, goals: &Goals) -> CoreResult<()> {
        let path = "/api/goals";
        let req = self.post(path, auth)?.json(goals);
        self.acknowledge(path, req).await
    }

    async fn send_chat(&self, auth: &AuthSession, request: &ChatRequest) -> CoreResult<ChatResponse> {
        let path = "/api/chat";
        let req = self.post(path, auth)?.json(request);
        self.execute(path, req).await
    }

    async fn health(&self) -> CoreResult<Health> {
        let path = "/health";
        self.execute(path, self.http.get(self.url(path))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_extracted_from_error_bodies() {
        assert_eq!(
            error_detail(r#"{"detail":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            error_detail(r#"{"detail":[{"loc":["body","items"]}]}"#).as_deref(),
            Some(r#"[{"loc":["body","items"]}]"#)
        );
        assert_eq!(error_detail("<html>502</html>"), None);
        assert_eq!(error_detail(r#"{"error":"x"}"#), None);
    }

    #[tokio::test]
    async fn authenticated_calls_need_a_token() {
        let backend = HttpBackend::new(&ClientConfig::default()).expect("client");
        let err = backend
            .get_goals(&AuthSession::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Auth(_)));
    }
}
