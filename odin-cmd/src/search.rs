//! Batched STAC search and the `search` subcommand.

use crate::{session::ValidationError, AppContext, CollectionArgs, PointArgs};
use log::{error, info};
use odin_stac::{
    date_range::DateRange,
    imagery::{dedupe_by_id, group_by_collection, ImageryResult},
    point::GeoPoint,
    source::ImagerySource,
};
use std::collections::HashSet;

/// Collections per STAC search request.
pub const SEARCH_BATCH_SIZE: usize = 15;

/// Catalog alias that covers every AMAZONIA-1 product.
const AMAZONIA_ALIAS: &str = "AMAZONIA";

/// Collapse AMAZONIA product ids to their alias and drop repeats, keeping order.
pub fn collapse_collection_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(|id| {
            if id.to_uppercase().starts_with(AMAZONIA_ALIAS) {
                AMAZONIA_ALIAS.to_string()
            } else {
                id.to_string()
            }
        })
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Split collection ids into request-sized batches.
pub fn batch_collections(ids: &[String]) -> Vec<Vec<String>> {
    ids.chunks(SEARCH_BATCH_SIZE).map(<[String]>::to_vec).collect()
}

/// Search every batch in turn and merge the results.
///
/// A failed batch is logged and skipped; the remaining batches still run.
pub async fn batched_search<S: ImagerySource>(
    source: &S,
    point: &GeoPoint,
    collection_ids: &[String],
    date_range: Option<&DateRange>,
) -> Vec<ImageryResult> {
    let ids = collapse_collection_ids(collection_ids);
    let batches = batch_collections(&ids);
    info!("Searching {} collections in {} batches", ids.len(), batches.len());

    let mut results = Vec::new();
    for (n, batch) in batches.iter().enumerate() {
        info!("Batch {}/{}: {}", n + 1, batches.len(), batch.join(", "));
        match source.search_imagery(point, batch, date_range).await {
            Ok(found) => results.extend(found),
            Err(e) => error!("Batch {} failed: {}", n + 1, e),
        }
    }
    let results = dedupe_by_id(results);
    info!("Search returned {} unique scenes", results.len());
    results
}

pub async fn run_search(
    ctx: &AppContext,
    point: PointArgs,
    collections: CollectionArgs,
) -> anyhow::Result<()> {
    let mut session = point.session(ctx)?;
    let ticket = session.begin_search()?;
    let geo = session.point().ok_or(ValidationError::MissingPoint)?;
    let ids = ctx.resolve_collections(&collections).await?;
    let results = batched_search(&ctx.client, &geo, &ids, session.date_range().as_ref()).await;
    session.apply_imagery(ticket, results);

    for (collection, items) in group_by_collection(session.imagery()) {
        println!("{} ({})", collection, items.len());
        for item in items {
            let cloud = item
                .cloud_cover
                .map(|c| format!("{:.1}%", c))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {}  {}  cloud {}  {}",
                item.date,
                item.id,
                cloud,
                item.thumbnail_url.as_deref().unwrap_or("(no thumbnail)")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use odin_stac::error::{Result, StacError};
    use std::sync::Mutex;

    /// Answers one scene per collection and fails any batch naming `BROKEN`.
    #[derive(Default)]
    struct FakeCatalog {
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ImagerySource for FakeCatalog {
        async fn search_imagery(
            &self,
            _point: &GeoPoint,
            collections: &[String],
            _date_range: Option<&DateRange>,
        ) -> Result<Vec<ImageryResult>> {
            self.calls.lock().unwrap().push(collections.to_vec());
            if collections.iter().any(|c| c == "BROKEN") {
                return Err(StacError::UnexpectedStatus {
                    status: 502,
                    url: "search".to_string(),
                });
            }
            Ok(collections
                .iter()
                .map(|c| ImageryResult {
                    id: format!("{c}-scene"),
                    collection: c.clone(),
                    date: "2024-01-01".to_string(),
                    cloud_cover: None,
                    thumbnail_url: None,
                })
                .collect())
        }
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collapse_amazonia() {
        let collapsed = collapse_collection_ids(&ids(&[
            "AMAZONIA1-WFI-L2-DN-1",
            "S2-16D-2",
            "amazonia1-wfi-l4-sr-1",
            "S2-16D-2",
            "",
        ]));
        assert_eq!(collapsed, ids(&["AMAZONIA", "S2-16D-2"]));
    }

    #[test]
    fn test_batches_of_fifteen() {
        let many: Vec<String> = (0..31).map(|i| format!("C{i}")).collect();
        let batches = batch_collections(&many);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![15, 15, 1]);
        assert!(batch_collections(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_skipped() {
        let mut names: Vec<String> = (0..15).map(|i| format!("C{i}")).collect();
        names[3] = "BROKEN".to_string();
        names.push("S2-16D-2".to_string());
        let catalog = FakeCatalog::default();
        let results =
            batched_search(&catalog, &GeoPoint::new(-12.0, -45.0), &names, None).await;
        assert_eq!(catalog.calls.lock().unwrap().len(), 2);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].collection, "S2-16D-2");
    }
}
