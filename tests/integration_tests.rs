use chrono::Utc;
use livestock_auction_service::bidding::commands::{handle_place_bid, PlaceBidCommand};
use livestock_auction_service::bidding::model::{AmountInput, Listing};
use livestock_auction_service::catalog::InMemoryListingCatalog;
use livestock_auction_service::error::BidError;
use livestock_auction_service::ledger::{BidLedger, InMemoryBidLedger};
use std::sync::Arc;
use tracing::info;

/// 트레이싱 초기화
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("트레이싱 구독자 설정 실패");
}

/// 테스트용 상품 생성
fn test_listing(id: i64, owner_id: i64, starting_price: f64) -> Listing {
    Listing {
        id,
        category: "Cattle".to_string(),
        breed: Some("Brahman".to_string()),
        location: Some("Batangas".to_string()),
        weight: 450.0,
        gender: "Male".to_string(),
        starting_price,
        owner_id,
        image_uri: None,
        created_at: Utc::now(),
    }
}

/// 카탈로그/원장 설정. 상품 1번(소유자 10, 시작가 5000)을 등록한다.
fn setup() -> (InMemoryListingCatalog, InMemoryBidLedger) {
    let catalog = InMemoryListingCatalog::new();
    catalog.insert(test_listing(1, 10, 5000.0));
    (catalog, InMemoryBidLedger::new())
}

fn bid(listing_id: i64, bidder_id: i64, amount: f64) -> PlaceBidCommand {
    PlaceBidCommand {
        listing_id,
        bidder_id,
        bid_amount: AmountInput::Number(amount),
    }
}

/// 입찰이 없는 상품의 집계 테스트
#[tokio::test]
async fn test_fresh_listing_state() {
    let (_, ledger) = setup();
    let listing = test_listing(1, 10, 5000.0);

    let state = ledger.current_state(&listing).await.unwrap();
    assert_eq!(state.highest_amount, 5000.0);
    assert_eq!(state.bidder_count, 0);
}

/// 입찰 시나리오 테스트: 시작가 5000, 입찰자 2명
#[tokio::test]
async fn test_bid_scenario() {
    let (catalog, ledger) = setup();

    // A가 4000 입찰 -> 시작가 미만이므로 거절, 최고가는 5000 유지
    let err = handle_place_bid(bid(1, 2, 4000.0), &catalog, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::BidTooLow { current } if current == 5000.0));

    // A가 6000 입찰 -> 성공, 최고가 6000, 입찰자 1명
    let state = handle_place_bid(bid(1, 2, 6000.0), &catalog, &ledger)
        .await
        .unwrap();
    assert_eq!(state.highest_amount, 6000.0);
    assert_eq!(state.bidder_count, 1);

    // B가 같은 6000 입찰 -> 초과가 아니므로 거절
    let err = handle_place_bid(bid(1, 3, 6000.0), &catalog, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::BidTooLow { current } if current == 6000.0));

    // B가 7000 입찰 -> 성공, 최고가 7000, 입찰자 2명
    let state = handle_place_bid(bid(1, 3, 7000.0), &catalog, &ledger)
        .await
        .unwrap();
    assert_eq!(state.highest_amount, 7000.0);
    assert_eq!(state.bidder_count, 2);
}

/// 수락된 입찰마다 최고가가 직전 수락 금액과 같아지는지 테스트
#[tokio::test]
async fn test_highest_follows_each_accepted_bid() {
    let (catalog, ledger) = setup();

    for amount in [6000.0, 7000.0, 8500.0, 12000.0] {
        let state = handle_place_bid(bid(1, 2, amount), &catalog, &ledger)
            .await
            .unwrap();
        assert_eq!(state.highest_amount, amount);
    }
}

/// 본인 상품 입찰 거절 테스트. 금액과 무관하게 거절된다.
#[tokio::test]
async fn test_self_bid_rejected() {
    let (catalog, ledger) = setup();

    let err = handle_place_bid(bid(1, 10, 999_999.0), &catalog, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::SelfBidProhibited));
    assert!(ledger.bids_for(1).await.unwrap().is_empty());
}

/// 숫자가 아닌 입찰 금액 거절 테스트
#[tokio::test]
async fn test_malformed_amount_rejected() {
    let (catalog, ledger) = setup();

    let cmd = PlaceBidCommand {
        listing_id: 1,
        bidder_id: 2,
        bid_amount: AmountInput::Text("abc".to_string()),
    };
    let err = handle_place_bid(cmd, &catalog, &ledger).await.unwrap_err();
    assert!(matches!(err, BidError::MalformedAmount));
    assert!(ledger.bids_for(1).await.unwrap().is_empty());
}

/// 없는 상품 입찰 거절 테스트
#[tokio::test]
async fn test_unknown_listing_rejected() {
    let (catalog, ledger) = setup();

    let err = handle_place_bid(bid(42, 2, 6000.0), &catalog, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::InvalidItem));
}

/// 거절이 원장을 건드리지 않는지 테스트
#[tokio::test]
async fn test_rejection_leaves_ledger_untouched() {
    let (catalog, ledger) = setup();
    let listing = test_listing(1, 10, 5000.0);

    handle_place_bid(bid(1, 2, 6000.0), &catalog, &ledger)
        .await
        .unwrap();
    let before = ledger.bids_for(1).await.unwrap().len();

    // 최고가 이하, 본인 입찰, 잘못된 금액을 차례로 거절시킨다
    assert!(handle_place_bid(bid(1, 3, 5500.0), &catalog, &ledger)
        .await
        .is_err());
    assert!(handle_place_bid(bid(1, 10, 20_000.0), &catalog, &ledger)
        .await
        .is_err());
    let cmd = PlaceBidCommand {
        listing_id: 1,
        bidder_id: 3,
        bid_amount: AmountInput::Text("".to_string()),
    };
    assert!(handle_place_bid(cmd, &catalog, &ledger).await.is_err());

    assert_eq!(ledger.bids_for(1).await.unwrap().len(), before);
    let state = ledger.current_state(&listing).await.unwrap();
    assert_eq!(state.highest_amount, 6000.0);
    assert_eq!(state.bidder_count, 1);
}

/// 동시 입찰 테스트: 수락된 입찰 금액 열이 항상 순증가해야 한다
#[tokio::test]
async fn test_concurrent_bids_stay_monotonic() {
    // 테스트 시작 시 tracing 초기화
    init_tracing();

    let catalog = Arc::new(InMemoryListingCatalog::new());
    catalog.insert(test_listing(1, 10, 5000.0));
    let ledger = Arc::new(InMemoryBidLedger::new());

    // 50개의 동시 입찰 생성
    let mut handles = vec![];
    for i in 1..=50i64 {
        let catalog = Arc::clone(&catalog);
        let ledger = Arc::clone(&ledger);
        let amount = 5000.0 + (i as f64) * 1000.0;

        handles.push(tokio::spawn(async move {
            handle_place_bid(bid(1, i, amount), catalog.as_ref(), ledger.as_ref()).await
        }));
    }

    // 모든 입찰 처리 대기 및 결과 확인
    let mut successful_bids = 0;
    let mut failed_bids = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successful_bids += 1,
            Err(BidError::BidTooLow { .. }) => failed_bids += 1,
            Err(e) => panic!("예상하지 못한 실패: {:?}", e),
        }
    }
    info!(
        "성공한 입찰 수: {}, 실패한 입찰 수: {}",
        successful_bids, failed_bids
    );
    assert!(successful_bids >= 1);
    assert_eq!(successful_bids + failed_bids, 50);

    // 최고 금액 입찰은 어떤 순서로 끝나도 반드시 수락된다
    let listing = test_listing(1, 10, 5000.0);
    let state = ledger.current_state(&listing).await.unwrap();
    assert_eq!(state.highest_amount, 55_000.0);

    // 수락된 입찰 열은 기록 순서대로 순증가한다
    let mut history = ledger.bids_for(1).await.unwrap();
    history.reverse();
    assert_eq!(history.len(), successful_bids);
    for pair in history.windows(2) {
        assert!(pair[0].bid_amount < pair[1].bid_amount);
    }
}
