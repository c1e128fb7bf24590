use crate::domain::records::{PoliticalCommunityRow, PostalCommunityRow};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// How the model builder reacts to rows it cannot link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum IntegrityPolicy {
    /// Drop the offending row or link and keep going.
    #[default]
    Lenient,
    /// Abort the build on the first gap.
    Strict,
}

pub trait ConfigProvider: Send + Sync {
    fn political_communities_path(&self) -> &str;
    fn postal_communities_path(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn date_format(&self) -> &str;
    fn integrity_policy(&self) -> IntegrityPolicy;
    fn export_path(&self) -> Option<&str>;
}

/// Supplier of the two flat datasets the model is built from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn political_communities(&self) -> Result<Vec<PoliticalCommunityRow>>;
    async fn postal_communities(&self) -> Result<Vec<PostalCommunityRow>>;
}
