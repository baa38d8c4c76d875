// region:    --- Imports
use crate::bidding::model::Listing;
use crate::error::PersistenceError;
use async_trait::async_trait;
use std::sync::RwLock;

use super::ListingCatalog;

// endregion: --- Imports

// region:    --- In-Memory Listing Catalog

/// 메모리 카탈로그. 외부 서비스 없이 입찰 로직을 테스트할 때 쓴다.
#[derive(Default)]
pub struct InMemoryListingCatalog {
    listings: RwLock<Vec<Listing>>,
}

impl InMemoryListingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 테스트 픽스처 등록
    pub fn insert(&self, listing: Listing) {
        self.listings
            .write()
            .expect("카탈로그 락 손상")
            .push(listing);
    }
}

#[async_trait]
impl ListingCatalog for InMemoryListingCatalog {
    async fn find(&self, listing_id: i64) -> Result<Option<Listing>, PersistenceError> {
        let listings = self
            .listings
            .read()
            .map_err(|_| PersistenceError::Unavailable("카탈로그 락 손상".to_string()))?;
        Ok(listings.iter().find(|l| l.id == listing_id).cloned())
    }

    async fn by_category(&self, category: &str) -> Result<Vec<Listing>, PersistenceError> {
        let listings = self
            .listings
            .read()
            .map_err(|_| PersistenceError::Unavailable("카탈로그 락 손상".to_string()))?;
        Ok(listings
            .iter()
            .filter(|l| l.category == category)
            .cloned()
            .collect())
    }
}

// endregion: --- In-Memory Listing Catalog
