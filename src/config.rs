use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted database/auth service.
    pub supabase_url: String,
    /// Service-role key sent on every database request.
    pub supabase_service_key: String,
    /// HS256 secret the auth service signs access tokens with.
    pub supabase_jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    /// Optional append-only log file served by the debug logs endpoint.
    pub download_log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let supabase_url = env::var("SUPABASE_URL").map_err(|_| {
            anyhow::anyhow!("SUPABASE_URL and SUPABASE_SERVICE_KEY must be set in .env")
        })?;
        let supabase_service_key = env::var("SUPABASE_SERVICE_KEY").map_err(|_| {
            anyhow::anyhow!("SUPABASE_URL and SUPABASE_SERVICE_KEY must be set in .env")
        })?;

        // The JWT secret is required - tokens are verified, never just decoded
        let supabase_jwt_secret = env::var("SUPABASE_JWT_SECRET").map_err(|_| {
            anyhow::anyhow!(
                "SUPABASE_JWT_SECRET environment variable must be set. \
                Copy it from the project's API settings (JWT secret)"
            )
        })?;

        // Validate JWT secret length (at least 32 bytes for HS256)
        if supabase_jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "SUPABASE_JWT_SECRET must be at least 32 characters long for HS256 verification"
            ));
        }

        Ok(Config {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_service_key,
            supabase_jwt_secret,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            download_log_file: env::var("DOWNLOAD_LOG_FILE").ok().map(PathBuf::from),
        })
    }
}
