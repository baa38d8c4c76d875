/// 입찰 제출 처리. 검증은 아래 순서로 하고 첫 실패에서 멈춘다.
/// 1. 상품 존재 확인
/// 2. 본인 상품 여부 확인
/// 3. 금액 파싱
/// 4. 최고가 초과 확인 및 조건부 기록
// region:    --- Imports
use crate::bidding::model::{AmountInput, BidState};
use crate::catalog::ListingCatalog;
use crate::error::BidError;
use crate::ledger::{AppendOutcome, BidLedger};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub bid_amount: AmountInput,
}

/// 입찰 제출. 검증을 모두 통과하면 원장에 입찰 한 건을 기록하고
/// 갱신된 집계를 돌려준다. 실패하면 아무것도 기록하지 않는다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    catalog: &(dyn ListingCatalog + Send + Sync),
    ledger: &(dyn BidLedger + Send + Sync),
) -> Result<BidState, BidError> {
    // 입찰자/금액은 여기서 로그에 남기지 않는다. 상세 로그는 수집 계층 몫이다.
    info!(
        "{:<12} --> 입찰 요청 처리 시작: 상품 {}",
        "Command", cmd.listing_id
    );

    // 상품 조회. 소유자 확인도 카탈로그 행을 기준으로 한다.
    let listing = catalog
        .find(cmd.listing_id)
        .await?
        .ok_or(BidError::InvalidItem)?;

    if cmd.bidder_id == listing.owner_id {
        return Err(BidError::SelfBidProhibited);
    }

    let amount = cmd.bid_amount.parse().ok_or(BidError::MalformedAmount)?;

    // 호출자가 들고 있던 값이 아니라 원장에서 새로 읽은 최고가와 비교한다
    let state = ledger.current_state(&listing).await?;
    if amount <= state.highest_amount {
        return Err(BidError::BidTooLow {
            current: state.highest_amount,
        });
    }

    // 기록 시점에 최고가 초과 조건을 원자적으로 다시 검사한다.
    // 경쟁에서 지면 금액이 더 이상 최고가를 넘지 못한다는 뜻이므로
    // 같은 금액으로 재시도해도 성공할 수 없다. 재시도 없이 종결한다.
    match ledger.try_append(&listing, cmd.bidder_id, amount).await? {
        AppendOutcome::Accepted(state) => {
            info!("{:<12} --> 입찰 성공: 상품 {}", "Command", listing.id);
            Ok(state)
        }
        AppendOutcome::Outbid { current } => {
            warn!(
                "{:<12} --> 동시 입찰 경쟁 탈락: 상품 {}",
                "Command", listing.id
            );
            Err(BidError::BidTooLow { current })
        }
    }
}

// endregion: --- Commands
