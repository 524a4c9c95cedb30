//! Data items: the opaque, uniquely identified units flowing through operations

use crate::graph::ItemId;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Anything an operation can consume or produce.
///
/// The pipeline and the tracer only look at `id()`; operations downcast to
/// their concrete item types through `as_any()`.
pub trait DataItem: Any + Debug + Send + Sync {
    /// Identity of the item, unique and stable for its lifetime
    fn id(&self) -> &ItemId;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an item; cloning it never copies the item.
pub type SharedItem = Arc<dyn DataItem>;

/// Attempt to view an item as a specific concrete type.
pub fn downcast_item<T: DataItem>(item: &SharedItem) -> Option<&T> {
    item.as_any().downcast_ref::<T>()
}

/// Collect the ids of a sequence of items, preserving order.
pub fn item_ids(items: &[SharedItem]) -> Vec<ItemId> {
    items.iter().map(|item| item.id().clone()).collect()
}
