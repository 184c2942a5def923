//! REST implementation of the cart API port.

use async_trait::async_trait;
use reqwest::Method;
use secrecy::ExposeSecret;
use tracing::{instrument, warn};

use mercato_core::{CartLineId, ProductId};

use crate::config::CartConfig;
use crate::session::Session;

use super::types::RemoteCart;
use super::{ApiError, CartApi};

/// Client for the Mercato cart REST API.
///
/// The bearer token is read from the [`Session`] on every request, so a
/// login or logout takes effect immediately without rebuilding the client.
#[derive(Clone)]
pub struct HttpCartApi {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl HttpCartApi {
    /// Create a new cart API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CartConfig, session: Session) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Start a request, attaching the session's bearer token when present.
    async fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match self.session.token().await {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Delete a single remote cart.
    async fn delete_cart(&self, cart_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/carts/{cart_id}", self.base_url);

        let response = self.request(Method::DELETE, url).await.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    #[instrument(skip(self))]
    async fn add_item(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<RemoteCart, ApiError> {
        let url = format!("{}/carts/items", self.base_url);
        let body = serde_json::json!({
            "productId": product_id,
            "quantity": quantity,
        });

        let response = self
            .request(Method::POST, url)
            .await
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn update_item(
        &self,
        cart_line_id: &CartLineId,
        quantity: i64,
    ) -> Result<RemoteCart, ApiError> {
        let url = format!("{}/carts/items/{}", self.base_url, cart_line_id.as_str());
        let body = serde_json::json!({ "quantity": quantity });

        let response = self
            .request(Method::PATCH, url)
            .await
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, cart_line_id: &CartLineId) -> Result<(), ApiError> {
        let url = format!("{}/carts/items/{}", self.base_url, cart_line_id.as_str());

        let response = self.request(Method::DELETE, url).await.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_carts(&self) -> Result<Vec<RemoteCart>, ApiError> {
        let url = format!("{}/carts", self.base_url);

        let response = self.request(Method::GET, url).await.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Deletes each cart individually; the backend has no bulk endpoint.
    /// Every cart is attempted even after a failure, and the first failure
    /// is the one reported.
    #[instrument(skip(self))]
    async fn clear_carts(&self) -> Result<(), ApiError> {
        let carts = self.get_carts().await?;

        let mut first_error = None;
        for cart in carts {
            if let Err(error) = self.delete_cart(&cart.id).await {
                warn!(cart_id = %cart.id, %error, "failed to delete remote cart");
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
