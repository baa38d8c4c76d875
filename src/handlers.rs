// region:    --- Imports
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::catalog::SharedCatalog;
use crate::error::{BidError, PersistenceError};
use crate::ledger::SharedLedger;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Error Responses

/// 입찰 실패를 HTTP 응답으로 변환
fn bid_error_response(err: BidError) -> axum::response::Response {
    let status = match &err {
        BidError::InvalidItem => StatusCode::NOT_FOUND,
        BidError::Persistence(cause) => {
            // 원인은 로그로만 남기고 응답에는 일반 메시지만 담는다
            error!("{:<12} --> 저장소 오류: {:?}", "Handler", cause);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };

    let mut body = serde_json::json!({
        "error": err.to_string(),
        "code": err.code(),
    });
    if let BidError::BidTooLow { current } = &err {
        body["current_price"] = serde_json::json!(current);
    }

    (status, Json(body)).into_response()
}

fn persistence_error_response(cause: PersistenceError) -> axum::response::Response {
    bid_error_response(BidError::from(cause))
}

// endregion: --- Error Responses

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State((catalog, ledger)): State<(SharedCatalog, SharedLedger)>,
    Json(cmd): Json<PlaceBidCommand>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 요청 수신: {:?}", "Handler", cmd);

    match handle_place_bid(cmd, catalog.as_ref(), ledger.as_ref()).await {
        Ok(state) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "입찰이 성공적으로 처리되었습니다.",
                "highest_amount": state.highest_amount,
                "bidder_count": state.bidder_count,
            })),
        )
            .into_response(),
        Err(e) => bid_error_response(e),
    }
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 입찰 집계 조회. 입찰 화면이 다시 활성화될 때 호출하는 새로고침 연산.
pub async fn handle_get_bid_state(
    State((catalog, ledger)): State<(SharedCatalog, SharedLedger)>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 집계 조회 id: {}", "Handler", listing_id);

    let listing = match catalog.find(listing_id).await {
        Ok(Some(listing)) => listing,
        Ok(None) => return bid_error_response(BidError::InvalidItem),
        Err(e) => return persistence_error_response(e),
    };

    match ledger.current_state(&listing).await {
        Ok(state) => Json(state).into_response(),
        Err(e) => persistence_error_response(e),
    }
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State((_, ledger)): State<(SharedCatalog, SharedLedger)>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Handler", listing_id);
    match ledger.bids_for(listing_id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => persistence_error_response(e),
    }
}

/// 상품 조회
pub async fn handle_get_listing(
    State((catalog, _)): State<(SharedCatalog, SharedLedger)>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 상품 조회 id: {}", "Handler", listing_id);
    match catalog.find(listing_id).await {
        Ok(Some(listing)) => Json(listing).into_response(),
        Ok(None) => bid_error_response(BidError::InvalidItem),
        Err(e) => persistence_error_response(e),
    }
}

/// 카테고리별 상품 조회
pub async fn handle_get_listings_by_category(
    State((catalog, _)): State<(SharedCatalog, SharedLedger)>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    info!("{:<12} --> 카테고리별 상품 조회: {}", "Handler", category);
    match catalog.by_category(&category).await {
        Ok(listings) => Json(listings).into_response(),
        Err(e) => persistence_error_response(e),
    }
}

// endregion: --- Query Handlers
