//! Operation contract and the types every operation shares

mod description;
mod error;
mod item;
mod traits;

pub use description::{OperationDescription, OperationId};
pub use error::{OperationError, OperationResult};
pub use item::{downcast_item, item_ids, DataItem, SharedItem};
pub use traits::{Operation, PortItems};
