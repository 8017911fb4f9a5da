pub mod client;
pub mod mapper;
pub mod models;
pub mod source;

pub use client::CatalogClient;
pub use models::*;
pub use source::CatalogSource;
