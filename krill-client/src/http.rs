//! HTTP client for the remote ordering API
//!
//! Plain JSON over reqwest. Store reads go through the tab-scoped
//! cache when one is attached; everything else hits the network every
//! time. No call retries: a failure is terminal for that user action.

use crate::cache::StoreCache;
use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use krill_core::checkout::{OrderDraft, payment_endpoint, payment_fields};
use krill_core::session::persistence::SessionBackend;
use krill_core::traits::{DirectoryError, GatewayError, OrderGateway, ReservationGateway, StoreDirectory};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::order::Order;
use shared::models::reservation::ReservationRequest;
use shared::models::store::Store;
use shared::models::table::Table;
use shared::response::{ErrorBody, PlaceOrderResponse, PlacedOrder, StoreListResponse};
use std::sync::Arc;

/// Redirect-based payment submit, rendered as a browser form
///
/// Payment initiation is a full-page POST to the payment endpoint,
/// not a fetch; the client only assembles the target and the hidden
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentForm {
    pub action: String,
    pub method: &'static str,
    pub fields: Vec<(String, String)>,
}

/// HTTP client for making network requests to the ordering API
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    cache: Option<StoreCache>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            cache: None,
        }
    }

    /// Attach a store cache over the session storage scope
    pub fn with_cache(mut self, backend: Arc<dyn SessionBackend>) -> Self {
        self.cache = Some(StoreCache::new(backend));
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Make a GET request
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// POST where only the status (and a possible error body) matters
    async fn post_status<B: serde::Serialize>(&self, path: &str, body: &B) -> ClientResult<()> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await?;
        if let Ok(body) = serde_json::from_str::<ErrorBody>(&text)
            && !body.error.is_empty()
        {
            return Err(ClientError::Api(body.error));
        }
        Err(Self::status_error(status, text))
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::status_error(status, text));
        }

        response.json().await.map_err(Into::into)
    }

    fn status_error(status: StatusCode, text: String) -> ClientError {
        match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST => ClientError::Validation(text),
            _ => ClientError::Internal(text),
        }
    }

    // ========== Store API ==========

    /// List all stores (cached for the session once fetched)
    pub async fn stores(&self) -> ClientResult<Vec<Store>> {
        if let Some(cache) = &self.cache
            && let Some(stores) = cache.store_list()
        {
            return Ok(stores);
        }

        let response: StoreListResponse = self.get_json("stores/").await?;
        if let Some(cache) = &self.cache {
            cache.put_store_list(&response.stores);
        }
        Ok(response.stores)
    }

    /// Fetch one store with items, tax info, settings and services
    pub async fn store(&self, store_id: &str) -> ClientResult<Store> {
        if let Some(cache) = &self.cache
            && let Some(store) = cache.store(store_id)
        {
            return Ok(store);
        }

        let store: Store = self.get_json(&format!("stores/{}", store_id)).await?;
        if let Some(cache) = &self.cache {
            cache.put_store(&store);
        }
        Ok(store)
    }

    /// Resolve a table code; 404 means the code matches no table
    pub async fn table(&self, store_id: &str, table_code: &str) -> ClientResult<Table> {
        self.get_json(&format!("tables/{}/{}", store_id, table_code))
            .await
    }

    // ========== Order API ==========

    /// Fetch the current totals and status of a placed order
    pub async fn order(&self, store_id: &str, order_id: &str) -> ClientResult<Order> {
        self.get_json(&format!("orders_new/{}/{}", store_id, order_id))
            .await
    }

    /// Place a new order
    ///
    /// The bot verification token rides inside the JSON body next to
    /// the order payload. A response carrying an `error` field is a
    /// server-side rejection.
    pub async fn place_order(
        &self,
        draft: &OrderDraft,
        verification_token: &str,
    ) -> ClientResult<PlacedOrder> {
        let mut body = serde_json::to_value(draft)?;
        if let serde_json::Value::Object(map) = &mut body {
            map.insert(
                "recaptcha_token".to_string(),
                verification_token.to_string().into(),
            );
        }

        let response: PlaceOrderResponse = self.post_json("orders_new/", &body).await?;
        if let Some(error) = response.error {
            return Err(ClientError::Api(error));
        }
        response
            .order
            .ok_or_else(|| ClientError::InvalidResponse("Missing order data".to_string()))
    }

    /// Assemble the redirect payment submit for an order payload
    pub fn payment_form(
        &self,
        draft: &OrderDraft,
        verification_token: &str,
    ) -> ClientResult<PaymentForm> {
        Ok(PaymentForm {
            action: self.url(payment_endpoint(draft.order_type)),
            method: "POST",
            fields: payment_fields(draft, verification_token)?,
        })
    }

    // ========== Reservation API ==========

    /// Trigger a verification-code mail
    pub async fn send_verification_code(
        &self,
        email: &str,
        verification_token: &str,
    ) -> ClientResult<()> {
        #[derive(serde::Serialize)]
        struct SendCodeRequest<'a> {
            email: &'a str,
            recaptcha_token: &'a str,
        }

        self.post_status(
            "email/send_verification_code",
            &SendCodeRequest {
                email,
                recaptcha_token: verification_token,
            },
        )
        .await
    }

    /// Create a reservation
    pub async fn create_reservation(&self, request: &ReservationRequest) -> ClientResult<()> {
        self.post_status("reservation/", request).await
    }
}

// ========== Core trait implementations ==========

#[async_trait]
impl StoreDirectory for HttpClient {
    async fn store(&self, store_id: &str) -> Result<Store, DirectoryError> {
        HttpClient::store(self, store_id).await.map_err(Into::into)
    }

    async fn table(&self, store_id: &str, table_code: &str) -> Result<Table, DirectoryError> {
        HttpClient::table(self, store_id, table_code)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl OrderGateway for HttpClient {
    async fn place_order(
        &self,
        draft: &OrderDraft,
        verification_token: &str,
    ) -> Result<PlacedOrder, GatewayError> {
        HttpClient::place_order(self, draft, verification_token)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl ReservationGateway for HttpClient {
    async fn send_verification_code(
        &self,
        email: &str,
        verification_token: &str,
    ) -> Result<(), GatewayError> {
        HttpClient::send_verification_code(self, email, verification_token)
            .await
            .map_err(Into::into)
    }

    async fn create_reservation(&self, request: &ReservationRequest) -> Result<(), GatewayError> {
        HttpClient::create_reservation(self, request)
            .await
            .map_err(Into::into)
    }
}
