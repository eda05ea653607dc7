use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    load_settings, CatalogEvent, CatalogStore, CollectionState, FetchStatus, HttpCatalogPort,
    ResolutionPolicy,
};
use shared::domain::{ItemTypeFilter, SortOrder};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Browse one or more pages of the product catalog.
#[derive(Parser, Debug)]
#[command(name = "catalog-browser")]
struct Args {
    /// Overrides the configured catalog service URL.
    #[arg(long)]
    catalog_url: Option<String>,
    /// `mug`, `shirt`, or `all`.
    #[arg(long, default_value = "all")]
    item_type: ItemTypeFilter,
    /// `price-asc`, `price-desc`, `date-desc`, or `date-asc`.
    #[arg(long, default_value = "price-asc")]
    sort: SortOrder,
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long = "brand")]
    brands: Vec<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Number of consecutive pages to fetch.
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Overrides the configured resolution policy.
    #[arg(long)]
    resolution_policy: Option<ResolutionPolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.catalog_url {
        settings.catalog_url = url;
    }
    if let Some(policy) = args.resolution_policy {
        settings.resolution_policy = policy;
    }

    let port = HttpCatalogPort::from_settings(&settings)?;
    let store = CatalogStore::new_with_policy(Arc::new(port), settings.resolution_policy);
    let mut events = store.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let CatalogEvent::StateChanged(products) = event {
                debug!(status = products.status.as_str(), "browser: state changed");
            }
        }
    });

    store.set_sort_type(args.sort);
    store.set_selected_tags(args.tags);
    store.set_selected_brands(args.brands);

    for page in args.page..args.page.saturating_add(args.pages.max(1)) {
        store.set_page(page);
        store.fetch_products(args.item_type).await;

        let products = store.products();
        print_page(&products);
        if products.status == FetchStatus::Failed {
            bail!(
                "fetch failed: {}",
                products.error.as_deref().unwrap_or("unknown error")
            );
        }
        if u64::from(page) >= products.page_count {
            break;
        }
    }

    Ok(())
}

fn print_page(products: &CollectionState) {
    println!(
        "page {}/{} ({})",
        products.page,
        products.page_count,
        products.status.as_str()
    );
    for item in &products.items {
        let price = item
            .price
            .map(|price| format!("{price:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  #{:<5} {:<40} {:>8}  {}",
            item.id.0,
            item.name,
            price,
            item.manufacturer.as_deref().unwrap_or("-")
        );
    }
}
