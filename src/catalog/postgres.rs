// region:    --- Imports
use crate::bidding::model::Listing;
use crate::database::DatabaseManager;
use crate::error::PersistenceError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::ListingCatalog;

// endregion: --- Imports

// region:    --- Queries

/// 상품 조회
pub const GET_LISTING: &str = "SELECT id, category, breed, location, weight, gender, starting_price, owner_id, image_uri, created_at FROM livestock WHERE id = $1";

/// 카테고리별 상품 조회
pub const GET_LISTINGS_BY_CATEGORY: &str = r#"
    SELECT id, category, breed, location, weight, gender, starting_price, owner_id, image_uri, created_at
    FROM livestock
    WHERE category = $1
    ORDER BY created_at DESC
"#;

// endregion: --- Queries

// region:    --- Postgres Listing Catalog

/// livestock 테이블 기반 카탈로그 구현체
pub struct PostgresListingCatalog {
    db: Arc<DatabaseManager>,
}

impl PostgresListingCatalog {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingCatalog for PostgresListingCatalog {
    async fn find(&self, listing_id: i64) -> Result<Option<Listing>, PersistenceError> {
        info!("{:<12} --> 상품 조회 id: {}", "Catalog", listing_id);
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let listing = sqlx::query_as::<_, Listing>(GET_LISTING)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    Ok(listing)
                })
            })
            .await
    }

    async fn by_category(&self, category: &str) -> Result<Vec<Listing>, PersistenceError> {
        info!("{:<12} --> 카테고리별 상품 조회: {}", "Catalog", category);
        let category = category.to_owned();
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let listings = sqlx::query_as::<_, Listing>(GET_LISTINGS_BY_CATEGORY)
                        .bind(category)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(listings)
                })
            })
            .await
    }
}

// endregion: --- Postgres Listing Catalog
