//! Exporter abstraction
//!
//! Every destination implements [`Exporter`]; the factory picks the variant
//! for a run from the [`ExporterConfig`](crate::config::ExporterConfig).

pub mod factory;
pub mod traits;

pub use factory::{
    create_exporter, create_exporter_with_token_store, create_notes_exporter, resolve_folder_name,
};
pub use traits::Exporter;
