use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub verify_token: String,
    pub app_secret: String,
    pub page_access_token: String,
    pub platform_base_url: String,
    pub platform_api_user: String,
    pub platform_api_secret: String,
    pub player_param_prefix: String,
    pub league_timezone: Option<String>,
    pub graph_api_base: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            verify_token: env::var("VERIFY_TOKEN").map_err(|e| format!("VERIFY_TOKEN: {}", e))?,
            app_secret: env::var("APP_SECRET").map_err(|e| format!("APP_SECRET: {}", e))?,
            page_access_token: env::var("PAGE_ACCESS_TOKEN")
                .map_err(|e| format!("PAGE_ACCESS_TOKEN: {}", e))?,
            platform_base_url: env::var("PLATFORM_BASE_URL")
                .map_err(|e| format!("PLATFORM_BASE_URL: {}", e))?,
            platform_api_user: env::var("PLATFORM_API_USER")
                .map_err(|e| format!("PLATFORM_API_USER: {}", e))?,
            platform_api_secret: env::var("PLATFORM_API_SECRET")
                .map_err(|e| format!("PLATFORM_API_SECRET: {}", e))?,
            player_param_prefix: env::var("PLAYER_PARAM_PREFIX")
                .map_err(|e| format!("PLAYER_PARAM_PREFIX: {}", e))?,
            league_timezone: env::var("LEAGUE_TIMEZONE").ok(),
            graph_api_base: env::var("GRAPH_API_BASE").ok(),
        })
    }
}
