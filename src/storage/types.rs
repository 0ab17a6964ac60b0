use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Category assigned to links that arrive without one.
pub const DEFAULT_CATEGORY: &str = "Others";

// ============================================================================
// Error Types
// ============================================================================

/// Store-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Store I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid store key '{0}'")]
    InvalidKey(String),

    /// The collection could not be encoded as JSON
    #[error("Failed to serialize links: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A mutation would leave a link without any URL
    #[error("Link '{0}' needs at least one URL")]
    MissingUrl(String),
}

// ============================================================================
// Link
// ============================================================================

/// A stored bookmark entry.
///
/// Deserialization is lenient so that data written by older versions (or by
/// hand) loads: `null` strings become empty, a blank icon becomes `None`, and
/// a missing or blank category becomes [`DEFAULT_CATEGORY`]. Call
/// [`Link::normalize`] afterwards to restore the `urls` invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, deserialize_with = "string_or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub title: String,
    /// Primary URL, always equal to `urls[0]` after normalization.
    #[serde(default, deserialize_with = "string_or_default")]
    pub url: String,
    /// Every URL for this link, primary first, without duplicates.
    #[serde(default, deserialize_with = "list_or_default")]
    pub urls: Vec<String>,
    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<String>,
    #[serde(default = "default_category", deserialize_with = "category_or_default")]
    pub category: String,
    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub optional_icon: Option<String>,
}

/// How a link's icon should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkIcon<'a> {
    /// Short text without a path separator, drawn as-is.
    Emoji(&'a str),
    /// An image reference; terminals draw the category icon instead.
    Image(&'a str),
    Missing,
}

impl Link {
    /// Restore the URL invariants in place.
    ///
    /// The primary URL is `url` when set, otherwise the first non-empty entry
    /// of `urls`. The primary is moved to the front of `urls`, empty entries
    /// and duplicates are dropped, and a blank category becomes "Others".
    ///
    /// Returns `false` when the link has no URL at all and cannot be kept.
    pub fn normalize(&mut self) -> bool {
        let primary = if self.url.is_empty() {
            self.urls.iter().find(|u| !u.is_empty()).cloned()
        } else {
            Some(self.url.clone())
        };

        let Some(primary) = primary else {
            self.urls.clear();
            return false;
        };

        let mut urls = Vec::with_capacity(self.urls.len().max(1));
        urls.push(primary.clone());
        for candidate in self.urls.drain(..) {
            if !candidate.is_empty() && !urls.contains(&candidate) {
                urls.push(candidate);
            }
        }
        self.url = primary;
        self.urls = urls;

        if self.category.trim().is_empty() {
            self.category = DEFAULT_CATEGORY.to_string();
        }
        true
    }

    /// Assign a fresh id when missing. Returns `true` if one was generated.
    pub fn ensure_id(&mut self) -> bool {
        if self.id.is_empty() {
            self.id = new_link_id();
            true
        } else {
            false
        }
    }

    /// URLs to try when opening, in order. Never empty for a normalized link.
    pub fn candidates(&self) -> &[String] {
        if self.urls.is_empty() {
            std::slice::from_ref(&self.url)
        } else {
            &self.urls
        }
    }

    pub fn has_alternates(&self) -> bool {
        self.candidates().len() > 1
    }

    /// Classify the user icon: short text without `/` is treated as an emoji.
    pub fn icon_kind(&self) -> LinkIcon<'_> {
        match self.icon.as_deref() {
            Some(icon) if !icon.contains('/') && icon.chars().count() < 5 => LinkIcon::Emoji(icon),
            Some(icon) => LinkIcon::Image(icon),
            None => LinkIcon::Missing,
        }
    }

    /// Shallow-merge a patch: every `Some` field replaces the current value.
    pub fn apply(&mut self, patch: LinkPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(urls) = patch.urls {
            self.urls = urls;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon.filter(|i| !i.trim().is_empty());
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}

/// Generate a unique, stable link identifier.
pub fn new_link_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ============================================================================
// Mutation Inputs
// ============================================================================

/// Field values for a link that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDraft {
    pub title: String,
    pub url: String,
    /// All URLs, primary first. May be empty, in which case `[url]` is used.
    pub urls: Vec<String>,
    pub icon: Option<String>,
    pub category: String,
}

impl LinkDraft {
    pub(crate) fn into_link(self, id: String) -> Link {
        Link {
            id,
            title: self.title,
            url: self.url,
            urls: self.urls,
            icon: self.icon.filter(|i| !i.trim().is_empty()),
            category: self.category,
            optional_icon: None,
        }
    }
}

/// Partial update for an existing link. `None` leaves the field untouched.
///
/// `icon` is doubly optional: `Some(None)` clears the icon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub urls: Option<Vec<String>>,
    pub icon: Option<Option<String>>,
    pub category: Option<String>,
}

impl From<LinkDraft> for LinkPatch {
    fn from(draft: LinkDraft) -> Self {
        Self {
            title: Some(draft.title),
            url: Some(draft.url),
            urls: Some(draft.urls),
            icon: Some(draft.icon),
            category: Some(draft.category),
        }
    }
}

// ============================================================================
// Lenient Deserializers
// ============================================================================

pub(crate) fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Text form of a JSON scalar. Numbers keep their literal form, so ids
/// written as numbers by older data survive a round trip.
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(serde_json::Value::deserialize(d)?))
}

pub(crate) fn string_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_text(d)?.unwrap_or_default())
}

/// A list of scalars, or a single scalar taken as a one-item list.
pub(crate) fn list_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

pub(crate) fn non_blank<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(lenient_text(d)?.filter(|s| !s.trim().is_empty()))
}

pub(crate) fn category_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_text(d)?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default_category))
}

/// Decode each element of a JSON array on its own. Elements that are not
/// link objects are skipped with a warning; the second value counts them.
pub(crate) fn decode_links(items: Vec<serde_json::Value>, source: &str) -> (Vec<Link>, usize) {
    let mut links = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Link>(item) {
            Ok(link) => links.push(link),
            Err(e) => {
                tracing::warn!(source, index, error = %e, "Skipping invalid link entry");
                skipped += 1;
            }
        }
    }
    (links, skipped)
}
