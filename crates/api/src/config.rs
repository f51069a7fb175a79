use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. Malformed values panic at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Not applied to
    /// `/api/v1/ai`, which is bounded by [`AiConfig::attempt_timeout_secs`].
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Shared secret the content engine signs hook bodies with.
    pub content_hook_secret: String,
    pub upload: UploadConfig,
    pub ai: AiConfig,
}

/// Local object store settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploaded objects are written to (default: `storage/uploads`).
    pub dir: String,
    /// URL prefix objects are served under (default: `/uploads`).
    pub public_base_url: String,
}

/// Generation provider settings.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Provider credential. `None` means AI generation is not configured.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Deadline for backend discovery and for each backend attempt, in
    /// seconds (default: `30`). A generation call takes at most
    /// `attempt_timeout_secs * (1 + usable backends)`.
    pub attempt_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                          |
    /// |---------------------------|--------------------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                                        |
    /// | `PORT`                    | `5000`                                           |
    /// | `CORS_ORIGINS`            | `http://localhost:3000`                          |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                             |
    /// | `CONTENT_HOOK_SECRET`     | **required**                                     |
    /// | `UPLOAD_DIR`              | `storage/uploads`                                |
    /// | `UPLOAD_PUBLIC_BASE_URL`  | `/uploads`                                       |
    /// | `GEMINI_API_KEY`          | unset (AI disabled)                              |
    /// | `AI_BASE_URL`             | `https://generativelanguage.googleapis.com/v1`   |
    /// | `AI_ATTEMPT_TIMEOUT_SECS` | `30`                                             |
    ///
    /// `REQUEST_TIMEOUT_SECS` covers every route but `/api/v1/ai`.
    /// Generation is instead bounded per step by `AI_ATTEMPT_TIMEOUT_SECS`,
    /// so a hung backend times out and the next one is still tried.
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let content_hook_secret = std::env::var("CONTENT_HOOK_SECRET")
            .expect("CONTENT_HOOK_SECRET must be set in the environment");
        assert!(
            !content_hook_secret.is_empty(),
            "CONTENT_HOOK_SECRET must not be empty"
        );

        let upload = UploadConfig {
            dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".into()),
            public_base_url: std::env::var("UPLOAD_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "/uploads".into()),
        };

        let ai = AiConfig {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("AI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1".into()),
            attempt_timeout_secs: std::env::var("AI_ATTEMPT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .expect("AI_ATTEMPT_TIMEOUT_SECS must be a valid u64"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            content_hook_secret,
            upload,
            ai,
        }
    }
}
