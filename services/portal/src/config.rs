/// Portal service configuration loaded from environment variables.
#[derive(Debug)]
pub struct PortalConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (activation sessions).
    pub redis_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// Cookie domain attribute (e.g. "uni.example").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3120). Env var: `PORTAL_PORT`.
    pub portal_port: u16,
    /// Reset link prefix; the token is appended. Env var: `PASSWORD_RESET_URL`.
    pub password_reset_url: String,
    /// Echo verification codes and reset links in responses (development only).
    pub expose_verification_codes: bool,
    /// OpenAI-compatible API base URL. Unset disables the language model.
    pub ai_api_base_url: Option<String>,
    pub ai_api_key: Option<String>,
    /// Model name (default "gemini-2.5-flash").
    pub ai_model: String,
    /// Study-aid requests per user per rolling hour (default 10).
    pub ai_rate_limit_per_hour: u32,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            portal_port: std::env::var("PORTAL_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            password_reset_url: std::env::var("PASSWORD_RESET_URL").expect("PASSWORD_RESET_URL"),
            expose_verification_codes: std::env::var("EXPOSE_VERIFICATION_CODES")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            ai_api_base_url: std::env::var("AI_API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            ai_api_key: std::env::var("AI_API_KEY").ok().filter(|v| !v.is_empty()),
            ai_model: std::env::var("AI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_owned()),
            ai_rate_limit_per_hour: std::env::var("AI_RATE_LIMIT_PER_HOUR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}
