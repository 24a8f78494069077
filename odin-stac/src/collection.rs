use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A catalog collection as listed by `GET /collections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct WireCollections {
    #[serde(default)]
    collections: Vec<WireCollection>,
}

#[derive(Debug, Deserialize)]
struct WireCollection {
    id: Option<String>,
    title: Option<String>,
}

impl Collection {
    /// Decode a `/collections` body: entries without id or title are dropped,
    /// duplicates keep their first occurrence, and the list is sorted by title.
    pub fn list_from_json(body: &str) -> serde_json::Result<Vec<Collection>> {
        let wire: WireCollections = serde_json::from_str(body)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut collections = wire
            .collections
            .into_iter()
            .filter_map(|c| match (c.id, c.title) {
                (Some(id), Some(title)) if !id.is_empty() && !title.is_empty() => {
                    Some(Collection { id, title })
                }
                _ => None,
            })
            .filter(|c| seen.insert(c.id.clone()))
            .collect::<Vec<Collection>>();
        collections.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(collections)
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;

    #[test]
    fn test_list_from_json() {
        let body = r#"{"collections": [
            {"id": "S2-16D-2", "title": "Sentinel-2 - 16 days"},
            {"id": "CBERS4-WFI-16D-2", "title": "CBERS-4 WFI - 16 days"},
            {"id": "S2-16D-2", "title": "duplicate"},
            {"id": "untitled"},
            {"title": "no id"}
        ]}"#;
        let collections = Collection::list_from_json(body).unwrap();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].id, "CBERS4-WFI-16D-2");
        assert_eq!(collections[1].title, "Sentinel-2 - 16 days");
    }
}
