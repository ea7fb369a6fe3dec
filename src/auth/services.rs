use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthResponse, Credentials, PublicUser};
use crate::backend::NutritionBackend;
use crate::error::{CoreError, CoreResult};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Bearer token plus the user it belongs to. Owned by the caller and lent to
/// every component that talks to the API; there is no global session.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    token: Option<String>,
    user: Option<PublicUser>,
}

impl AuthSession {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&PublicUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn bearer(&self) -> CoreResult<&str> {
        self.token()
            .ok_or_else(|| CoreError::Auth("no token, log in first".into()))
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
    }

    fn accept(&mut self, resp: AuthResponse) {
        self.token = Some(resp.token);
        self.user = resp.user;
    }
}

fn normalized(email: &str, password: &str) -> CoreResult<Credentials> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(CoreError::validation("Invalid email"));
    }
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

#[instrument(skip(session, backend, password))]
pub async fn login(
    session: &mut AuthSession,
    backend: &dyn NutritionBackend,
    email: &str,
    password: &str,
) -> CoreResult<()> {
    let creds = normalized(email, password)?;
    let resp = backend.login(&creds).await?;
    info!(email = %creds.email, "logged in");
    session.accept(resp);
    Ok(())
}

#[instrument(skip(session, backend, password))]
pub async fn register(
    session: &mut AuthSession,
    backend: &dyn NutritionBackend,
    email: &str,
    password: &str,
) -> CoreResult<()> {
    let creds = normalized(email, password)?;
    if creds.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(CoreError::validation("Password too short"));
    }
    let resp = backend.register(&creds).await?;
    info!(email = %creds.email, "registered");
    session.accept(resp);
    Ok(())
}
