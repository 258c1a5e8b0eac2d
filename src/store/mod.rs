pub mod disk;
pub mod memory;

use crate::core::storage::KeyValueStore;
use anyhow::Result;
use disk::DiskStore;
use std::path::Path;
use std::sync::Arc;

/// Opens the on-disk store under `data_path`.
pub fn open(data_path: &Path) -> Result<Arc<dyn KeyValueStore>> {
    let store = DiskStore::open(&data_path.join("store"))?;
    Ok(Arc::new(store))
}
