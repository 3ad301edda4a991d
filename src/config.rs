#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    // Payment gateway (subscription billing API)
    pub gateway_url: String,
    pub gateway_api_key: String,
    // Transactional mail
    pub mail_api_key: String,
    pub mail_from: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let gateway_url = std::env::var("GATEWAY_URL")
            .unwrap_or_else(|_| "https://api.billing.example.com/v1".to_string());
        let gateway_api_key = std::env::var("GATEWAY_API_KEY")
            .unwrap_or_else(|_| "test_api_key".to_string());

        let mail_api_key = std::env::var("MAIL_API_KEY").unwrap_or_else(|_| "".to_string());
        let mail_from =
            std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@moradia.app".to_string());

        Config {
            database_url,
            port,
            gateway_url,
            gateway_api_key,
            mail_api_key,
            mail_from,
        }
    }
}
