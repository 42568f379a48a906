pub mod client;
pub mod error;
pub mod traits;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use traits::Catalog;
