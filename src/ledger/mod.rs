// region:    --- Imports
use crate::bidding::model::{Bid, BidState, Listing};
use crate::error::PersistenceError;
use async_trait::async_trait;
use std::sync::Arc;

// endregion: --- Imports

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryBidLedger;
pub use postgres::PostgresBidLedger;

// region:    --- Append Outcome

/// 조건부 기록의 결과
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// 기록 성공. 기록 직후 다시 계산한 집계를 담는다.
    Accepted(BidState),
    /// 기록 시점 재검증에서 탈락. current는 그 시점의 최고가.
    Outbid { current: f64 },
}

// endregion: --- Append Outcome

// region:    --- Bid Ledger Trait

/// 입찰 원장. 추가 전용이며 수정/삭제 연산은 없다.
///
/// 같은 상품에 대한 두 제출이 같은 최고가를 읽고 둘 다 통과하는
/// 경쟁을 막기 위해, 금액 비교는 `try_append` 안에서 기록과 원자적으로
/// 다시 수행된다. Postgres 구현은 상위 livestock 행 잠금으로 상품별
/// 기록을 직렬화하고, 메모리 구현은 뮤텍스 가드 하나 안에서 비교와
/// 추가를 끝낸다.
#[async_trait]
pub trait BidLedger {
    /// 집계 조회: 최고 입찰가(입찰이 없으면 시작가)와 입찰자 수.
    /// 부수 효과가 없고 제출과 무관하게 호출할 수 있다.
    /// 화면이 다시 활성화될 때 호출자가 명시적으로 부르는 새로고침 연산이기도 하다.
    async fn current_state(&self, listing: &Listing) -> Result<BidState, PersistenceError>;

    /// 조건부 기록: 기록 시점의 최고가보다 큰 경우에만 pending 입찰 한 건을
    /// 추가한다. 탈락하면 아무것도 쓰지 않는다.
    async fn try_append(
        &self,
        listing: &Listing,
        bidder_id: i64,
        amount: f64,
    ) -> Result<AppendOutcome, PersistenceError>;

    /// 상품 입찰 이력 조회 (최신순)
    async fn bids_for(&self, listing_id: i64) -> Result<Vec<Bid>, PersistenceError>;
}

pub type SharedLedger = Arc<dyn BidLedger + Send + Sync + 'static>;

// endregion: --- Bid Ledger Trait
