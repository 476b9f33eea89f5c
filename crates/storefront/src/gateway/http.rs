//! HTTP implementation of the order gateway.
//!
//! Plain-REST `reqwest` client with JSON bodies. Catalog reads are
//! cached with `moka` (5-minute TTL); the create-operations are never
//! cached. Every request carries the bounded timeout from
//! configuration, so a stalled backend surfaces as a network error
//! instead of an indefinitely "processing" checkout.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use tienda_core::{AddressId, BillId, ClientId, OrderId, OrderLineId, OrderStatus};

use crate::config::StorefrontConfig;

use super::GatewayError;
use super::OrderGateway;
use super::types::{
    Category, Created, NewAddress, NewBill, NewClient, NewOrder, NewOrderLine, OrderStatusUpdate,
    Product,
};

/// Catalog cache TTL.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached catalog value types.
#[derive(Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Categories(Arc<Vec<Category>>),
}

/// Client for the remote order API.
///
/// Cheaply cloneable via `Arc`; clones share the HTTP connection pool
/// and the catalog cache.
#[derive(Clone)]
pub struct HttpOrderGateway {
    inner: Arc<HttpOrderGatewayInner>,
}

struct HttpOrderGatewayInner {
    client: reqwest::Client,
    base_url: String,
    catalog: Cache<String, CacheValue>,
}

impl HttpOrderGateway {
    /// Create a new gateway client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Network` if the HTTP client fails to
    /// build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(HttpOrderGatewayInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_owned(),
                catalog,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// POST a JSON body and decode a JSON response.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "gateway POST");

        let response = self.inner.client.post(&url).json(body).send().await?;
        Self::decode_response(response).await
    }

    /// GET and decode a JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = self.url(path);
        debug!(%url, "gateway GET");

        let response = self.inner.client.get(&url).send().await?;
        Self::decode_response(response).await
    }

    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "gateway returned non-success status"
            );
            return Err(GatewayError::Server {
                status: status.as_u16(),
                message: extract_detail(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// List catalog categories (cached).
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>, GatewayError> {
        if let Some(CacheValue::Categories(cached)) = self.inner.catalog.get("categories").await {
            return Ok(cached);
        }

        let categories: Vec<Category> = self.get_json("categories").await?;
        let categories = Arc::new(categories);
        self.inner
            .catalog
            .insert(
                "categories".to_owned(),
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// List catalog products (cached).
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, GatewayError> {
        if let Some(CacheValue::Products(cached)) = self.inner.catalog.get("products").await {
            return Ok(cached);
        }

        let products: Vec<Product> = self.get_json("products").await?;
        let products = Arc::new(products);
        self.inner
            .catalog
            .insert(
                "products".to_owned(),
                CacheValue::Products(Arc::clone(&products)),
            )
            .await;
        Ok(products)
    }

    /// Update an order's status. Used by the admin surface; the
    /// storefront itself only ever creates orders as pending.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the request fails or is rejected.
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), GatewayError> {
        let url = self.url(&format!("orders/{order_id}"));
        debug!(%url, ?status, "gateway PUT");

        let response = self
            .inner
            .client
            .put(&url)
            .json(&OrderStatusUpdate { status })
            .send()
            .await?;

        let status_code = response.status();
        if !status_code.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Server {
                status: status_code.as_u16(),
                message: extract_detail(&body),
            });
        }
        Ok(())
    }
}

impl OrderGateway for HttpOrderGateway {
    async fn create_client(&self, client: &NewClient) -> Result<ClientId, GatewayError> {
        let created: Created = self.post_json("clients", client).await?;
        Ok(ClientId::new(created.id))
    }

    async fn create_address(&self, address: &NewAddress) -> Result<AddressId, GatewayError> {
        let created: Created = self.post_json("addresses", address).await?;
        Ok(AddressId::new(created.id))
    }

    async fn create_bill(&self, bill: &NewBill) -> Result<BillId, GatewayError> {
        let created: Created = self.post_json("bills", bill).await?;
        Ok(BillId::new(created.id))
    }

    async fn create_order(&self, order: &NewOrder) -> Result<OrderId, GatewayError> {
        let created: Created = self.post_json("orders", order).await?;
        Ok(OrderId::new(created.id))
    }

    async fn create_order_line(&self, line: &NewOrderLine) -> Result<OrderLineId, GatewayError> {
        let created: Created = self.post_json("order-lines", line).await?;
        Ok(OrderLineId::new(created.id))
    }
}

/// Pull the human-readable detail out of an error body.
///
/// The backend reports failures as `{"detail": ...}` (sometimes
/// `{"message": ...}`); fall back to the raw body when neither is
/// present.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message"] {
            if let Some(detail) = value.get(key).and_then(serde_json::Value::as_str) {
                return detail.to_owned();
            }
        }
    }
    body.chars().take(200).collect()
}
