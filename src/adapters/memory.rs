use crate::core::RecordSource;
use crate::domain::records::{PoliticalCommunityRow, PostalCommunityRow};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Serves rows that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    political: Vec<PoliticalCommunityRow>,
    postal: Vec<PostalCommunityRow>,
}

impl InMemorySource {
    pub fn new(political: Vec<PoliticalCommunityRow>, postal: Vec<PostalCommunityRow>) -> Self {
        Self { political, postal }
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn political_communities(&self) -> Result<Vec<PoliticalCommunityRow>> {
        Ok(self.political.clone())
    }

    async fn postal_communities(&self) -> Result<Vec<PostalCommunityRow>> {
        Ok(self.postal.clone())
    }
}
