use crate::storage::{decode_links, sanitize, Link};

use super::SeedError;

/// Map seed JSON into links ready to persist.
///
/// Every entry gets a fresh id, even when the seed carries one, so that
/// re-seeding never collides with ids handed out earlier. Entries without
/// any URL are dropped.
pub fn parse_seed(text: &str) -> Result<Vec<Link>, SeedError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(SeedError::NotArray);
    };

    let (mut raw, _) = decode_links(items, "seed");
    for link in &mut raw {
        link.id.clear();
    }

    let (links, repairs) = sanitize(raw);
    if repairs.dropped > 0 {
        tracing::warn!(dropped = repairs.dropped, "Seed entries without URLs skipped");
    }
    Ok(links)
}
