// region:    --- Imports
use crate::bidding::model::{Bid, BidState, Listing};
use crate::error::PersistenceError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{AppendOutcome, BidLedger};

// endregion: --- Imports

// region:    --- In-Memory Bid Ledger

/// 메모리 원장. 외부 서비스 없이 입찰 로직을 테스트할 때 쓴다.
/// 비교와 추가를 한 뮤텍스 가드 안에서 끝내므로 기록 시점 재검증이
/// Postgres 구현과 같은 의미를 가진다.
#[derive(Default)]
pub struct InMemoryBidLedger {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    bids: HashMap<i64, Vec<Bid>>,
    next_id: i64,
}

impl InMemoryBidLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, PersistenceError> {
        self.inner
            .lock()
            .map_err(|_| PersistenceError::Unavailable("원장 락 손상".to_string()))
    }
}

fn state_of(bids: &[Bid], starting_price: f64) -> BidState {
    let highest_amount = bids
        .iter()
        .map(|b| b.bid_amount)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut bidders: Vec<i64> = bids.iter().map(|b| b.bidder_id).collect();
    bidders.sort_unstable();
    bidders.dedup();
    BidState {
        highest_amount: if bids.is_empty() {
            starting_price
        } else {
            highest_amount
        },
        bidder_count: bidders.len() as i64,
    }
}

#[async_trait]
impl BidLedger for InMemoryBidLedger {
    async fn current_state(&self, listing: &Listing) -> Result<BidState, PersistenceError> {
        let inner = self.lock()?;
        let bids = inner
            .bids
            .get(&listing.id)
            .map(|bids| bids.as_slice())
            .unwrap_or(&[]);
        Ok(state_of(bids, listing.starting_price))
    }

    async fn try_append(
        &self,
        listing: &Listing,
        bidder_id: i64,
        amount: f64,
    ) -> Result<AppendOutcome, PersistenceError> {
        let mut inner = self.lock()?;
        let id = inner.next_id + 1;
        let entry = inner.bids.entry(listing.id).or_default();

        let current = state_of(entry.as_slice(), listing.starting_price).highest_amount;
        if amount <= current {
            return Ok(AppendOutcome::Outbid { current });
        }

        entry.push(Bid {
            id,
            livestock_id: listing.id,
            bidder_id,
            bid_amount: amount,
            status: "pending".to_string(),
            bid_time: Utc::now(),
        });
        let state = state_of(entry.as_slice(), listing.starting_price);
        inner.next_id = id;
        Ok(AppendOutcome::Accepted(state))
    }

    async fn bids_for(&self, listing_id: i64) -> Result<Vec<Bid>, PersistenceError> {
        let inner = self.lock()?;
        let mut bids = inner.bids.get(&listing_id).cloned().unwrap_or_default();
        bids.reverse();
        Ok(bids)
    }
}

// endregion: --- In-Memory Bid Ledger

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn listing(starting_price: f64) -> Listing {
        Listing {
            id: 1,
            category: "Cattle".to_string(),
            breed: Some("Brahman".to_string()),
            location: Some("Batangas".to_string()),
            weight: 450.0,
            gender: "Male".to_string(),
            starting_price,
            owner_id: 10,
            image_uri: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_ledger_falls_back_to_starting_price() {
        let ledger = InMemoryBidLedger::new();
        let state = ledger.current_state(&listing(5000.0)).await.unwrap();
        assert_eq!(state.highest_amount, 5000.0);
        assert_eq!(state.bidder_count, 0);
    }

    #[tokio::test]
    async fn append_is_rejected_at_equal_amount() {
        let ledger = InMemoryBidLedger::new();
        let listing = listing(5000.0);

        let outcome = ledger.try_append(&listing, 2, 6000.0).await.unwrap();
        assert!(matches!(outcome, AppendOutcome::Accepted(_)));

        // 같은 금액은 기록 시점 재검증에서 탈락한다
        let outcome = ledger.try_append(&listing, 3, 6000.0).await.unwrap();
        assert_eq!(outcome, AppendOutcome::Outbid { current: 6000.0 });
        assert_eq!(ledger.bids_for(listing.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bidder_count_ignores_duplicates() {
        let ledger = InMemoryBidLedger::new();
        let listing = listing(5000.0);

        ledger.try_append(&listing, 2, 6000.0).await.unwrap();
        ledger.try_append(&listing, 2, 7000.0).await.unwrap();
        ledger.try_append(&listing, 3, 8000.0).await.unwrap();

        let state = ledger.current_state(&listing).await.unwrap();
        assert_eq!(state.highest_amount, 8000.0);
        assert_eq!(state.bidder_count, 2);
    }
}
