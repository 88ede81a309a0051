pub mod collection;
pub mod record;
pub mod store;

pub use collection::{Collection, OwnerLink};
pub use record::Record;
pub use store::{Store, StoreError};
