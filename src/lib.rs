//! Schema Collections
//!
//! A small family of REST services sharing one shape: validate the request,
//! mutate a list, answer with JSON.
//!
//! ## Services
//!
//! - **Collections**: named collections whose items are validated against a
//!   caller-supplied JSON Schema merged onto a base schema that reserves `id`.
//!   In memory only.
//! - **Shopping list**: positional `{name, quantity}` items in a flat file.
//! - **Patient queue**: admissions numbered sequentially, in a flat file.
//!
//! ## Architecture
//!
//! ```text
//! api (axum router, basic auth gate)
//! ├── store     CollectionStore (RwLock)
//! │   └── registry  CollectionRegistry -> Collection { validator, items }
//! │       └── schema    merge_schemas + CompiledSchema
//! ├── shopping  ShoppingList ─┐
//! └── patients  PatientQueue ─┴── files  JsonFileStore (Mutex)
//! ```

pub mod api;
pub mod auth;
pub mod checksum;
pub mod config;
pub mod error;
pub mod files;
pub mod patients;
pub mod registry;
pub mod schema;
pub mod shopping;
pub mod store;

pub use api::{router, AppState};
pub use checksum::Checksum;
pub use config::ServiceConfig;
pub use error::{CollectionError, Result};
pub use registry::{Collection, CollectionInfo, CollectionRegistry};
pub use schema::{CompiledSchema, DocumentValidator, ValidationIssue};
pub use store::CollectionStore;
