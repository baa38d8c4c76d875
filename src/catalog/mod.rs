// region:    --- Imports
use crate::bidding::model::Listing;
use crate::error::PersistenceError;
use async_trait::async_trait;
use std::sync::Arc;

// endregion: --- Imports

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryListingCatalog;
pub use postgres::PostgresListingCatalog;

// region:    --- Listing Catalog Trait

/// 상품 카탈로그. 입찰 코어 입장에서는 읽기 전용이다.
#[async_trait]
pub trait ListingCatalog {
    /// 상품 하나 조회. 없으면 None.
    async fn find(&self, listing_id: i64) -> Result<Option<Listing>, PersistenceError>;

    /// 카테고리별 상품 목록 조회
    async fn by_category(&self, category: &str) -> Result<Vec<Listing>, PersistenceError>;
}

pub type SharedCatalog = Arc<dyn ListingCatalog + Send + Sync + 'static>;

// endregion: --- Listing Catalog Trait
