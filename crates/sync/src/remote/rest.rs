//! JSON REST adapter for the remote cart and wishlist services.
//!
//! Talks to a conventional REST backend:
//!
//! - `GET    /cart`                     - fetch the cart record
//! - `POST   /cart/items`               - add a line (server folds duplicates)
//! - `PUT    /cart/items/{product_id}`  - set a line's quantity
//! - `DELETE /cart/items/{product_id}`  - remove a line
//! - `DELETE /cart`                     - clear the cart
//! - `POST   /cart/sync`                - merge a guest snapshot
//! - `GET    /wishlist`                 - fetch the wishlist record
//! - `POST   /wishlist/items`           - add an entry (idempotent)
//! - `DELETE /wishlist/items/{product_id}` - remove an entry
//! - `DELETE /wishlist`                 - clear the wishlist
//! - `POST   /wishlist/items/{product_id}/move-to-cart` - server-side move
//!
//! Authentication is a bearer token; every request carries a fresh
//! `X-Request-Id` so client and server logs can be correlated.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;
use uuid::Uuid;

use cartwheel_core::{
    CartItem, CartRecord, CartSyncOutcome, ProductId, ProductSummary, WishlistRecord,
};

use super::{RemoteCartService, RemoteError, RemoteWishlistService};
use crate::config::ApiConfig;

/// Request correlation header.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Maximum response-body length carried into errors and logs.
const BODY_SNIPPET_LEN: usize = 200;

/// REST client for the cart and wishlist services.
///
/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidConfig`] if the access token cannot be
    /// carried in a header, or [`RemoteError::Http`] if the HTTP client
    /// fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| RemoteError::InvalidConfig(format!("invalid access token: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a request and parse a JSON response body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let body = self.send(request).await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                error!(
                    error = %e,
                    body = %snippet(&body),
                    "failed to parse API response"
                );
                Err(RemoteError::Parse(e))
            }
        }
    }

    /// Execute a request for an acknowledge-only endpoint.
    async fn execute_ok(&self, request: reqwest::RequestBuilder) -> Result<(), RemoteError> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, RemoteError> {
        let response = request
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized(snippet(&body)));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(snippet(&body)));
        }
        if !status.is_success() {
            error!(
                status = %status,
                body = %snippet(&body),
                "API returned non-success status"
            );
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: snippet(&body),
            });
        }

        Ok(body)
    }
}

/// Truncate a response body for logs and error messages.
fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCartItemRequest<'a> {
    #[serde(flatten)]
    product: &'a ProductSummary,
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCartItemRequest {
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncCartRequest<'a> {
    items: &'a [CartItem],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddWishlistItemRequest<'a> {
    product_id: &'a ProductId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveToCartRequest {
    quantity: u32,
}

// =============================================================================
// Service Implementations
// =============================================================================

impl RemoteCartService for ApiClient {
    async fn get_cart(&self) -> Result<CartRecord, RemoteError> {
        self.execute(self.inner.client.get(self.endpoint("/cart")))
            .await
    }

    async fn add_item(
        &self,
        product: &ProductSummary,
        quantity: u32,
    ) -> Result<CartRecord, RemoteError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/cart/items"))
            .json(&AddCartItemRequest { product, quantity });
        self.execute(request).await
    }

    async fn update_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartRecord, RemoteError> {
        let request = self
            .inner
            .client
            .put(self.endpoint(&format!("/cart/items/{product_id}")))
            .json(&UpdateCartItemRequest { quantity });
        self.execute(request).await
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<CartRecord, RemoteError> {
        let request = self
            .inner
            .client
            .delete(self.endpoint(&format!("/cart/items/{product_id}")));
        self.execute(request).await
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        self.execute_ok(self.inner.client.delete(self.endpoint("/cart")))
            .await
    }

    async fn sync_cart(&self, local_items: &[CartItem]) -> Result<CartSyncOutcome, RemoteError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/cart/sync"))
            .json(&SyncCartRequest { items: local_items });
        self.execute(request).await
    }
}

impl RemoteWishlistService for ApiClient {
    async fn get_wishlist(&self) -> Result<WishlistRecord, RemoteError> {
        self.execute(self.inner.client.get(self.endpoint("/wishlist")))
            .await
    }

    async fn add_item(&self, product_id: &ProductId) -> Result<(), RemoteError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/wishlist/items"))
            .json(&AddWishlistItemRequest { product_id });
        self.execute_ok(request).await
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<(), RemoteError> {
        let request = self
            .inner
            .client
            .delete(self.endpoint(&format!("/wishlist/items/{product_id}")));
        self.execute_ok(request).await
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        self.execute_ok(self.inner.client.delete(self.endpoint("/wishlist")))
            .await
    }

    async fn move_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&format!("/wishlist/items/{product_id}/move-to-cart")))
            .json(&MoveToCartRequest { quantity });
        self.execute_ok(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(base_url).unwrap(),
            access_token: SecretString::from("test-token"),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = ApiClient::new(&config("https://api.example.com/v1/")).unwrap();
        assert_eq!(
            client.endpoint("/cart/sync"),
            "https://api.example.com/v1/cart/sync"
        );
    }

    #[test]
    fn test_client_builds_with_plain_token() {
        assert!(ApiClient::new(&config("http://localhost:8080")).is_ok());
    }

    #[test]
    fn test_client_rejects_token_with_control_chars() {
        let cfg = ApiConfig {
            base_url: Url::parse("http://localhost:8080").unwrap(),
            access_token: SecretString::from("bad\ntoken"),
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(
            ApiClient::new(&cfg),
            Err(RemoteError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(snippet(&long).len(), BODY_SNIPPET_LEN);
    }

    #[test]
    fn test_add_request_serializes_flat() {
        let product = cartwheel_core::ProductSummary::new(
            "prod-1",
            "Widget",
            rust_decimal::Decimal::new(1999, 2),
            None,
        )
        .unwrap();
        let body = serde_json::to_value(AddCartItemRequest {
            product: &product,
            quantity: 2,
        })
        .unwrap();

        assert_eq!(body["productId"], "prod-1");
        assert_eq!(body["quantity"], 2);
    }
}
