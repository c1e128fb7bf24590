pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{csv_source::CsvRecordSource, memory::InMemorySource, storage::LocalStorage};
pub use crate::core::{builder::BuildReport, builder::ModelBuilder, etl::EtlEngine, query::QueryService};
pub use domain::model::{Canton, District, Model, PoliticalCommunity, PostalCommunity, PostalKey};
pub use domain::ports::IntegrityPolicy;
pub use domain::records::{PoliticalCommunityRow, PostalCommunityRow};
pub use utils::error::{GeoError, Result};
