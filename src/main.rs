// region:    --- Imports
use crate::catalog::{PostgresListingCatalog, SharedCatalog};
use crate::database::DatabaseManager;
use crate::ledger::{PostgresBidLedger, SharedLedger};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Modules
mod bidding;
mod catalog;
mod database;
mod error;
mod handlers;
mod ledger;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db_manager = match DatabaseManager::new(&database_url).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
            return Err(e.into());
        }
    };

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 카탈로그와 입찰 원장은 트레이트 뒤에 둔다. 핸들러에는 쿼리가 없다.
    let catalog: SharedCatalog = Arc::new(PostgresListingCatalog::new(Arc::clone(&db_manager)));
    let ledger: SharedLedger = Arc::new(PostgresBidLedger::new(Arc::clone(&db_manager)));

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        .route("/bid", post(handlers::handle_bid))
        .route("/auctions/:category", get(handlers::handle_get_listings_by_category))
        .route("/livestock/:id", get(handlers::handle_get_listing))
        .route("/livestock/:id/state", get(handlers::handle_get_bid_state))
        .route("/livestock/:id/bids", get(handlers::handle_get_bid_history))
        .layer(cors)
        .with_state((catalog, ledger));

    // 리스너 생성(로컬 호스트의 3000번 포트를 사용)
    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr().unwrap()
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
