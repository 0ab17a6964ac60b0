mod links;
mod store;
mod transfer;
mod types;

pub(crate) use links::sanitize;
pub(crate) use types::decode_links;
pub use links::{LinkStore, LoadOutcome, STORAGE_KEY, THEME_KEY};
pub use store::{atomic_write, FileStore, KeyValueStore, MemoryStore};
pub use transfer::{
    export_file_name, export_to_dir, export_to_dir_on, parse_import, read_import, ImportError,
};
pub use types::{
    new_link_id, Link, LinkDraft, LinkIcon, LinkPatch, StorageError, DEFAULT_CATEGORY,
};
