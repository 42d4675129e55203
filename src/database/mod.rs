pub mod memory;
pub mod object_id;
pub mod postgres;
pub mod repository;
pub mod store;

pub use memory::MemoryDocumentStore;
pub use object_id::{InvalidObjectId, ObjectId};
pub use postgres::PgDocumentStore;
pub use repository::{Document, Repository};
pub use store::{DocumentStore, StoreError};
