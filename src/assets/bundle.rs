use rayon::prelude::*;

use crate::assets::decode::ImageAsset;
use crate::foundation::error::StageResult;

/// Stable identity of a bundle item for its whole lifetime.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// One foreground image of the bundle.
#[derive(Clone, Debug)]
pub struct BundleItem {
    /// Stable id.
    pub id: ItemId,
    /// Decoded source image.
    pub asset: ImageAsset,
}

/// A file that failed to import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportFailure {
    /// Source name as given to the import.
    pub name: String,
    /// Rendered decode error.
    pub error: String,
}

/// Outcome of a multi-file import: failures are isolated per file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Ids of the newly added items, in input order.
    pub added: Vec<ItemId>,
    /// Files that could not be decoded.
    pub failed: Vec<ImportFailure>,
}

/// Ordered collection of foreground images. Insertion order is not the display order.
#[derive(Clone, Debug, Default)]
pub struct Bundle {
    items: Vec<BundleItem>,
    next_id: u64,
}

impl Bundle {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded asset and return its new id.
    pub fn push(&mut self, asset: ImageAsset) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(BundleItem { id, asset });
        id
    }

    /// Decode and append many encoded files. Decoding runs in parallel; ids follow input order.
    #[tracing::instrument(skip_all, fields(files = files.len()))]
    pub fn import<N, B>(&mut self, files: &[(N, B)]) -> ImportReport
    where
        N: AsRef<str> + Sync,
        B: AsRef<[u8]> + Sync,
    {
        let decoded: Vec<StageResult<ImageAsset>> = files
            .par_iter()
            .map(|(name, bytes)| ImageAsset::decode(name.as_ref(), bytes.as_ref()))
            .collect();

        let mut report = ImportReport::default();
        for ((name, _), res) in files.iter().zip(decoded) {
            match res {
                Ok(asset) => report.added.push(self.push(asset)),
                Err(e) => {
                    tracing::warn!(name = name.as_ref(), error = %e, "skipping undecodable file");
                    report.failed.push(ImportFailure {
                        name: name.as_ref().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Remove an item; returns it when it existed.
    pub fn remove(&mut self, id: ItemId) -> Option<BundleItem> {
        let pos = self.items.iter().position(|it| it.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Swap the asset of an existing item, keeping its id. Returns the previous asset.
    pub fn replace_asset(&mut self, id: ItemId, asset: ImageAsset) -> Option<ImageAsset> {
        let item = self.items.iter_mut().find(|it| it.id == id)?;
        Some(std::mem::replace(&mut item.asset, asset))
    }

    /// Drop every item. Ids are never reused.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lookup by id.
    pub fn get(&self, id: ItemId) -> Option<&BundleItem> {
        self.items.iter().find(|it| it.id == id)
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[BundleItem] {
        &self.items
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|it| it.id).collect()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the bundle has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/bundle.rs"]
mod tests;
