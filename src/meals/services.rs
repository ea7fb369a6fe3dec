use time::Date;
use tracing::{info, instrument, warn};

use crate::auth::AuthSession;
use crate::backend::NutritionBackend;
use crate::error::CoreResult;
use crate::meals::cart::Cart;

/// Logs the current cart as one meal. Returns the number of lines sent.
///
/// An empty cart fails before any request. A failed request leaves the cart
/// as it was; a successful one empties it.
#[instrument(skip(cart, backend, auth))]
pub async fn submit_meal(
    cart: &mut Cart,
    backend: &dyn NutritionBackend,
    auth: &AuthSession,
    date: Option<Date>,
) -> CoreResult<usize> {
    let (ticket, request) = cart.begin_submit(date)?;
    let lines = request.items.len();
    let outcome = backend.log_meal(auth, &request).await;
    if let Err(e) = &outcome {
        warn!(error = %e, lines, "meal logging failed");
    }
    cart.finish_submit(ticket, outcome)?;
    info!(lines, "meal logged");
    Ok(lines)
}
