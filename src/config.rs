// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub resend_api_key: String,
    pub from_email: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let port = std::env::var("PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(8000);

        // Mail settings default to a no-op sender for local development.
        let resend_api_key = std::env::var("RESEND_API_KEY").unwrap_or_else(|_| "".to_string());
        let from_email = std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "Ticketdesk <noreply@ticketdesk.local>".to_string());

        Config {
            database_url,
            jwt_secret,
            port,
            resend_api_key,
            from_email,
        }
    }
}
