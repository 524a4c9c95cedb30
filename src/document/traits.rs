//! Document: the collaborator the batch runner reads items from and writes to

use crate::graph::ItemId;
use crate::operation::SharedItem;

/// A container of items addressed by selector.
///
/// What a selector means (an annotation label, a segment kind, a key) is
/// entirely up to the implementation.
pub trait Document: Send {
    /// Identity of the document
    fn id(&self) -> &ItemId;

    /// Items matching `selector`, in document order
    fn items_by_selector(&self, selector: &str) -> Vec<SharedItem>;

    /// Store an item produced by a pipeline under `label`
    fn add_item(&mut self, item: SharedItem, label: &str);
}
