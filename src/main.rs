mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    db::db::DBClient, mail::sendmail::ResendMailer, service::ticket_service::TicketService,
    utils::token::TokenVerifier,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub ticket_service: Arc<TicketService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client = Arc::new(db_client);

        let mailer = Arc::new(ResendMailer::new(
            config.resend_api_key.clone(),
            config.from_email.clone(),
        ));
        let verifier = TokenVerifier::new(config.jwt_secret.clone());
        let ticket_service = Arc::new(TicketService::new(db_client.clone(), mailer, verifier));

        Self {
            env: config,
            db_client,
            ticket_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            println!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let allowed_origins = vec![
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state).layer(cors);

    println!("🚀 Server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
