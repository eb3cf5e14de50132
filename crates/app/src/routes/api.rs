//! JSON API handlers, called from the app shell through App Bridge.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::ShopifySession;
use crate::shopify::Product;
use crate::state::AppState;

/// How many products the shell lists.
const PRODUCTS_PAGE_SIZE: i64 = 1;

/// List the shop's first products.
///
/// # Errors
///
/// Returns 502 if the Admin API call fails.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn products(
    State(state): State<AppState>,
    ShopifySession(session): ShopifySession,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state
        .shopify()
        .products(&session, PRODUCTS_PAGE_SIZE)
        .await?;
    tracing::debug!(count = products.len(), "Fetched products");
    Ok(Json(products))
}
