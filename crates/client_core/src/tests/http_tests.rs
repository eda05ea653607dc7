use super::*;
use std::{collections::BTreeSet, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use shared::domain::{ItemTypeFilter, ProductId, SortOrder};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{collection::FetchStatus, store::CatalogStore};

#[derive(Clone)]
struct CatalogServerState {
    total_header: Option<&'static str>,
    items: Vec<ProductItem>,
    failure: Option<(StatusCode, Option<ApiError>)>,
    queries: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl CatalogServerState {
    fn ok(total_header: Option<&'static str>, items: Vec<ProductItem>) -> Self {
        Self {
            total_header,
            items,
            failure: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(status: StatusCode, body: Option<ApiError>) -> Self {
        Self {
            total_header: None,
            items: Vec::new(),
            failure: Some((status, body)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn list_items(
    State(state): State<CatalogServerState>,
    Query(query): Query<Vec<(String, String)>>,
) -> axum::response::Response {
    state.queries.lock().await.push(query);
    if let Some((status, body)) = state.failure.clone() {
        return match body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        };
    }
    match state.total_header {
        Some(total) => ([(TOTAL_COUNT_HEADER, total)], Json(state.items.clone())).into_response(),
        None => Json(state.items.clone()).into_response(),
    }
}

async fn spawn_catalog(state: CatalogServerState) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/items", get(list_items))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn item(id: i64) -> ProductItem {
    ProductItem {
        id: ProductId(id),
        name: format!("Mug {id}"),
        slug: Some(format!("mug-{id}")),
        price: Some(9.5),
        manufacturer: Some("Acme".into()),
        item_type: Some("mug".into()),
        tags: vec!["Kitchen".to_string()],
        description: None,
        added: Some(1_485_723_766_805),
    }
}

fn criteria() -> CriteriaSnapshot {
    CriteriaSnapshot {
        page: 2,
        sort_value: SortOrder::DateDesc,
        filter_type: ItemTypeFilter::Mug,
        tags: BTreeSet::from(["Gift".to_string(), "Kitchen".to_string()]),
        brands: BTreeSet::from(["Acme".to_string()]),
    }
}

#[test]
fn query_pairs_follow_criteria() {
    let pairs = query_pairs(&criteria());
    assert_eq!(
        pairs,
        vec![
            ("_page", "2".to_string()),
            ("_limit", "16".to_string()),
            ("_sort", "added".to_string()),
            ("_order", "desc".to_string()),
            ("itemType", "mug".to_string()),
            ("tags_like", "Gift".to_string()),
            ("tags_like", "Kitchen".to_string()),
            ("manufacturer", "Acme".to_string()),
        ]
    );
}

#[test]
fn all_item_types_sends_no_item_type_param() {
    let mut criteria = criteria();
    criteria.filter_type = ItemTypeFilter::All;
    assert!(query_pairs(&criteria)
        .iter()
        .all(|(key, _)| *key != "itemType"));
}

#[test]
fn rejects_unparseable_catalog_url() {
    let err = HttpCatalogPort::new("not a url").err().expect("invalid url");
    assert!(err.to_string().contains("invalid catalog url"));
}

#[test]
fn trailing_slash_in_catalog_url_is_ignored() {
    let port = HttpCatalogPort::new("http://catalog.local:3000/api/").expect("port");
    assert_eq!(port.items_url().as_str(), "http://catalog.local:3000/api/items");
}

#[tokio::test]
async fn envelope_carries_header_total_and_decoded_items() -> anyhow::Result<()> {
    let state = CatalogServerState::ok(Some("200"), (1..=16).map(item).collect());
    let queries = state.queries.clone();
    let url = spawn_catalog(state).await?;
    let port = HttpCatalogPort::new(&url)?;

    let envelope = port.fetch_product_items(&criteria()).await?;
    assert_eq!(envelope.total, 200);
    let items = envelope.response.await?;
    assert_eq!(items.len(), 16);
    assert_eq!(items[0], item(1));

    let recorded = queries.lock().await;
    let query = recorded.first().expect("query recorded");
    assert!(query.contains(&("_page".to_string(), "2".to_string())));
    assert!(query.contains(&("manufacturer".to_string(), "Acme".to_string())));
    Ok(())
}

#[tokio::test]
async fn missing_total_header_is_an_error() -> anyhow::Result<()> {
    let url = spawn_catalog(CatalogServerState::ok(None, vec![item(1)])).await?;
    let port = HttpCatalogPort::new(&url)?;

    let err = port
        .fetch_product_items(&criteria())
        .await
        .err()
        .expect("missing header");
    assert!(matches!(
        err.downcast_ref::<CatalogHttpError>(),
        Some(CatalogHttpError::MissingTotal { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn malformed_total_header_is_an_error() -> anyhow::Result<()> {
    let url = spawn_catalog(CatalogServerState::ok(Some("many"), vec![item(1)])).await?;
    let port = HttpCatalogPort::new(&url)?;

    let err = port
        .fetch_product_items(&criteria())
        .await
        .err()
        .expect("malformed header");
    assert!(matches!(
        err.downcast_ref::<CatalogHttpError>(),
        Some(CatalogHttpError::MalformedTotal { value, .. }) if value == "many"
    ));
    Ok(())
}

#[tokio::test]
async fn error_body_message_is_surfaced_in_collection_state() -> anyhow::Result<()> {
    let url = spawn_catalog(CatalogServerState::failing(
        StatusCode::SERVICE_UNAVAILABLE,
        Some(ApiError::new(
            shared::error::ErrorCode::RateLimited,
            "catalog is warming up",
        )),
    ))
    .await?;
    let store = CatalogStore::new(Arc::new(HttpCatalogPort::new(&url)?));

    store.fetch_products(ItemTypeFilter::All).await;

    let products = store.products();
    assert_eq!(products.status, FetchStatus::Failed);
    assert_eq!(
        products.error.as_deref(),
        Some("catalog service returned 503 Service Unavailable: catalog is warming up")
    );
    Ok(())
}

#[tokio::test]
async fn bare_error_status_uses_reason_phrase() -> anyhow::Result<()> {
    let url = spawn_catalog(CatalogServerState::failing(StatusCode::NOT_FOUND, None)).await?;
    let port = HttpCatalogPort::new(&url)?;

    let err = port
        .fetch_product_items(&criteria())
        .await
        .err()
        .expect("not found");
    assert_eq!(
        err.to_string(),
        "catalog service returned 404 Not Found: Not Found"
    );
    Ok(())
}

#[tokio::test]
async fn store_fetch_over_http_populates_collection() -> anyhow::Result<()> {
    let url = spawn_catalog(CatalogServerState::ok(Some("33"), (1..=16).map(item).collect()))
        .await?;
    let settings = CatalogSettings {
        catalog_url: url,
        ..CatalogSettings::default()
    };
    let store = CatalogStore::new(Arc::new(HttpCatalogPort::from_settings(&settings)?));

    store.fetch_products(ItemTypeFilter::Mug).await;

    let products = store.products();
    assert_eq!(products.status, FetchStatus::Succeeded);
    assert_eq!(products.items.len(), 16);
    assert_eq!(products.page_count, 3);
    Ok(())
}
