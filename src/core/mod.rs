pub mod builder;
pub mod etl;
pub mod query;

pub use crate::domain::model::Model;
pub use crate::domain::ports::{ConfigProvider, IntegrityPolicy, RecordSource, Storage};
pub use crate::utils::error::Result;
