// region:    --- Imports
use crate::bidding::model::{Bid, BidState, Listing};
use crate::database::DatabaseManager;
use crate::error::PersistenceError;
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;
use tracing::info;

use super::{AppendOutcome, BidLedger};

// endregion: --- Imports

// region:    --- Queries

/// 상품 행 잠금. 같은 상품의 입찰 기록을 직렬화한다.
pub const LOCK_LISTING: &str = "SELECT id FROM livestock WHERE id = $1 FOR UPDATE";

/// 집계 조회: 최고 입찰가(없으면 시작가)와 서로 다른 입찰자 수
pub const GET_BID_STATE: &str = r#"
    SELECT COALESCE(MAX(bid_amount), $2) AS highest_amount,
           COUNT(DISTINCT bidder_id) AS bidder_count
    FROM bids
    WHERE livestock_id = $1
"#;

/// 입찰 기록 추가
pub const INSERT_BID: &str = "INSERT INTO bids (livestock_id, bidder_id, bid_amount, status) VALUES ($1, $2, $3, 'pending')";

/// 입찰 이력 조회
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, livestock_id, bidder_id, bid_amount, status, bid_time
    FROM bids
    WHERE livestock_id = $1
    ORDER BY bid_time DESC, id DESC
"#;

// endregion: --- Queries

// region:    --- Postgres Bid Ledger

/// bids 테이블 기반 원장 구현체
pub struct PostgresBidLedger {
    db: Arc<DatabaseManager>,
}

impl PostgresBidLedger {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

async fn fetch_state(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    listing_id: i64,
    starting_price: f64,
) -> Result<BidState, sqlx::Error> {
    let row = sqlx::query(GET_BID_STATE)
        .bind(listing_id)
        .bind(starting_price)
        .fetch_one(&mut **tx)
        .await?;
    Ok(BidState {
        highest_amount: row.get("highest_amount"),
        bidder_count: row.get("bidder_count"),
    })
}

#[async_trait]
impl BidLedger for PostgresBidLedger {
    async fn current_state(&self, listing: &Listing) -> Result<BidState, PersistenceError> {
        info!("{:<12} --> 입찰 집계 조회 id: {}", "Ledger", listing.id);
        let listing_id = listing.id;
        let starting_price = listing.starting_price;
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let state = fetch_state(tx, listing_id, starting_price).await?;
                    Ok(state)
                })
            })
            .await
    }

    async fn try_append(
        &self,
        listing: &Listing,
        bidder_id: i64,
        amount: f64,
    ) -> Result<AppendOutcome, PersistenceError> {
        info!(
            "{:<12} --> 조건부 입찰 기록 id: {}, 입찰자: {}, 금액: {}",
            "Ledger", listing.id, bidder_id, amount
        );
        let listing_id = listing.id;
        let starting_price = listing.starting_price;
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    // 상품 행 잠금을 먼저 잡아 기록 시점 비교를 현재 값에 대해 수행한다
                    sqlx::query(LOCK_LISTING)
                        .bind(listing_id)
                        .fetch_one(&mut **tx)
                        .await?;

                    let state = fetch_state(tx, listing_id, starting_price).await?;
                    if amount <= state.highest_amount {
                        return Ok(AppendOutcome::Outbid {
                            current: state.highest_amount,
                        });
                    }

                    sqlx::query(INSERT_BID)
                        .bind(listing_id)
                        .bind(bidder_id)
                        .bind(amount)
                        .execute(&mut **tx)
                        .await?;

                    let state = fetch_state(tx, listing_id, starting_price).await?;
                    Ok(AppendOutcome::Accepted(state))
                })
            })
            .await
    }

    async fn bids_for(&self, listing_id: i64) -> Result<Vec<Bid>, PersistenceError> {
        info!("{:<12} --> 입찰 이력 조회 id: {}", "Ledger", listing_id);
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let bids = sqlx::query_as::<_, Bid>(GET_BID_HISTORY)
                        .bind(listing_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(bids)
                })
            })
            .await
    }
}

// endregion: --- Postgres Bid Ledger
