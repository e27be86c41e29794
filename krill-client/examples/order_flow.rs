// krill-client/examples/order_flow.rs
// End-to-end pickup order against a running ordering API

use krill_client::{ClientConfig, HttpClient};
use krill_core::checkout::{self, OrderDraft};
use krill_core::ordertype::{OrderTypeRequest, resolve_order_type};
use krill_core::session::persistence::MemoryBackend;
use krill_core::traits::{BotVerifier, VerifierError};
use krill_core::{ActionFlow, SessionService};
use shared::models::cart::CartLine;
use shared::types::Language;

/// Token from the environment instead of a real captcha provider
struct EnvVerifier;

#[async_trait::async_trait]
impl BotVerifier for EnvVerifier {
    async fn token(&self, _action: &str) -> Result<String, VerifierError> {
        std::env::var("VERIFICATION_TOKEN")
            .map_err(|_| VerifierError::Unavailable("VERIFICATION_TOKEN not set".to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: {} <store_id> <email>", args[0]);
        println!("  API_URL selects the server (default http://localhost:8000)");
        return Ok(());
    }
    let store_id = &args[1];
    let email = &args[2];

    let backend = MemoryBackend::shared();
    let service = SessionService::new(backend.clone())?;
    let client: HttpClient = ClientConfig::from_env()
        .build_client()
        .with_cache(backend.clone());

    // Select the store and pull its record
    service.select_store(store_id)?;
    let store = client.store(store_id).await?;
    service.set_currency(store_id, &store.currency)?;
    tracing::info!(
        store = %store.name.get(Language::En),
        items = store.items.len(),
        "Store loaded"
    );

    // Pickup, guarded by the store's supported order types
    resolve_order_type(&service, store_id, &store, &client, &OrderTypeRequest::Pickup).await?;

    // Add the first menu item to the cart
    let item = store
        .items
        .first()
        .ok_or_else(|| anyhow::anyhow!("store has no menu items"))?;
    let line = CartLine::new(&item.id, item.name.clone(), item.price);
    service.add_to_cart(store_id, &line)?;

    let session = service
        .store_session(store_id)
        .ok_or_else(|| anyhow::anyhow!("missing session"))?;
    tracing::info!(
        total_items = session.total_items,
        sub_total = session.sub_total,
        "Cart ready"
    );

    // Place the order
    let draft = OrderDraft::build(
        Language::En,
        store_id,
        &session,
        &store.tax_info,
        "placed by order_flow example",
    )
    .with_email(email)?;

    let flow = ActionFlow::new();
    let placed =
        checkout::place_order(&service, store_id, &flow, &EnvVerifier, &client, &draft).await?;
    tracing::info!(
        order_id = %placed.id,
        order_number = %placed.order_number,
        "Order placed"
    );

    Ok(())
}
