//! Catalog browsing: the `collections` and `item` subcommands.

use crate::AppContext;
use anyhow::Context;
use log::info;
use odin_stac::{
    catalog::{attributes_for_collection, is_wtss_compatible},
    collection::Collection,
    item::ItemDetail,
};

/// Collections to list, optionally only those with WTSS series.
pub fn filter_collections(collections: Vec<Collection>, wtss_only: bool) -> Vec<Collection> {
    collections
        .into_iter()
        .filter(|c| !wtss_only || is_wtss_compatible(&c.id))
        .collect()
}

fn collection_line(collection: &Collection) -> String {
    let attributes = attributes_for_collection(&collection.id);
    if attributes.is_empty() {
        format!("{}\t{}", collection.id, collection.title)
    } else {
        format!("{}\t{}\t[{}]", collection.id, collection.title, attributes.join(", "))
    }
}

pub async fn run_collections(ctx: &AppContext, wtss_only: bool) -> anyhow::Result<()> {
    let listing = ctx
        .client
        .list_collections()
        .await
        .context("Failed to list collections")?;
    let shown = filter_collections(listing, wtss_only);
    info!("{} collections", shown.len());
    for collection in &shown {
        println!("{}", collection_line(collection));
    }
    Ok(())
}

fn item_lines(item: &ItemDetail) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", item.id, item.collection)];
    match item.overlay_bounds() {
        Some([[south, west], [north, east]]) => lines.push(format!(
            "bounds: south {south:.4} west {west:.4} north {north:.4} east {east:.4}"
        )),
        None => lines.push("bounds: -".to_string()),
    }
    lines.push(format!(
        "thumbnail: {}",
        item.thumbnail_url.as_deref().unwrap_or("-")
    ));
    lines
}

pub async fn run_item(ctx: &AppContext, collection: &str, item_id: &str) -> anyhow::Result<()> {
    let item = ctx
        .client
        .fetch_item_detail(collection, item_id)
        .await
        .with_context(|| format!("Failed to load item {} of {}", item_id, collection))?;
    for line in item_lines(&item) {
        println!("{}", line);
    }
    Ok(())
}
