mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use config::Config;
use db::db::DBClient;
use dotenv::dotenv;
use routes::create_router;
use service::credit_service::CreditService;
use service::listing_query::ListingQueryEngine;
use service::payment_gateway::PaymentGateway;
use service::property_service::PropertyService;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub listing_engine: ListingQueryEngine,
    pub credit_service: Arc<CreditService>,
    pub property_service: PropertyService,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH]);

    let db_client = Arc::new(DBClient::new(pool));
    let gateway = Arc::new(PaymentGateway::new(&config));
    let credit_service = Arc::new(CreditService::new(db_client.clone(), gateway));
    let app_state = AppState {
        env: config.clone(),
        db_client: db_client.clone(),
        listing_engine: ListingQueryEngine::new(db_client.clone()),
        credit_service: credit_service.clone(),
        property_service: PropertyService::new(db_client, credit_service, config.clone()),
    };

    let app = create_router(Arc::new(app_state)).layer(cors);

    tracing::info!("server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
