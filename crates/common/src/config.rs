use std::fmt;

/// Global application configuration loaded from environment variables.
///
/// Built once at startup and handed to the pipeline by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Email provider settings
    pub mailgun: MailgunConfig,

    /// Where verification times are recorded
    pub database: DatabaseConfig,

    /// Base of the verification link, e.g. `https://example.com:8080`
    pub verification_base_url: String,

    /// Which `EmailSender` the handler wires in (default: mailgun)
    pub email_backend: EmailBackend,

    /// Listen port for the push endpoint (default: 8080)
    pub port: u16,

    /// Apply `migrations/` on startup (default: false)
    pub run_migrations: bool,
}

/// Mailgun messages API settings.
#[derive(Clone)]
pub struct MailgunConfig {
    /// Sending domain registered with Mailgun
    pub domain: String,

    /// Private API key, used as the Basic auth password
    pub api_key: String,

    /// `from` address on outgoing mail
    pub sender_email: String,

    /// API root without trailing slash (default: `https://api.mailgun.net/v3`)
    pub api_base: String,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl MailgunConfig {
    /// Full URL of the messages endpoint for the configured domain.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.domain
        )
    }
}

impl fmt::Debug for MailgunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailgunConfig")
            .field("domain", &self.domain)
            .field("api_key", &"<redacted>")
            .field("sender_email", &self.sender_email)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// MySQL connection parameters.
///
/// `url` wins over everything else when set. Otherwise `instance_connection_name`
/// selects the Cloud SQL unix socket, falling back to TCP on `host:port`.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub instance_connection_name: Option<String>,
    /// Schema name. Defaults to the username when `DB_NAME` is unset.
    pub database: String,
}

impl DatabaseConfig {
    /// Unix socket path for a Cloud SQL instance, if one is configured.
    pub fn socket_path(&self) -> Option<String> {
        self.instance_connection_name
            .as_ref()
            .map(|name| format!("/cloudsql/{}", name))
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("instance_connection_name", &self.instance_connection_name)
            .field("database", &self.database)
            .finish()
    }
}

/// Selectable email delivery backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailBackend {
    Mailgun,
    /// Log instead of sending. For local runs.
    Noop,
}

impl EmailBackend {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "mailgun" => Ok(Self::Mailgun),
            "noop" => Ok(Self::Noop),
            other => Err(anyhow::anyhow!(
                "EMAIL_BACKEND must be one of 'mailgun' or 'noop' (got {other})"
            )),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("{key} environment variable is required"))
        };

        let mailgun = MailgunConfig {
            domain: required("MAILGUN_DOMAIN")?,
            api_key: required("MAILGUN_API_KEY")?,
            sender_email: required("MAILGUN_SENDER_EMAIL")?,
            api_base: lookup("MAILGUN_API_BASE")
                .unwrap_or_else(|| "https://api.mailgun.net/v3".to_string()),
            timeout_secs: lookup("MAILGUN_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAILGUN_TIMEOUT_SECS must be a valid u64"))?,
        };

        let url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        // The username is only mandatory when no full URL is given.
        let username = match &url {
            Some(_) => lookup("DB_USERNAME").unwrap_or_default(),
            None => required("DB_USERNAME")?,
        };
        let database = DatabaseConfig {
            url,
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            host: lookup("DB_HOST_NAME").unwrap_or_else(|| "localhost".to_string()),
            port: lookup("DB_PORT")
                .unwrap_or_else(|| "3306".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_PORT must be a valid u16"))?,
            instance_connection_name: lookup("INSTANCE_CONNECTION_NAME").filter(|v| !v.is_empty()),
            database: lookup("DB_NAME")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| username.clone()),
            username,
        };

        Ok(Self {
            mailgun,
            database,
            verification_base_url: required("VERIFICATION_BASE_URL")?,
            email_backend: EmailBackend::parse(
                &lookup("EMAIL_BACKEND").unwrap_or_else(|| "mailgun".to_string()),
            )?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid u16"))?,
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
        })
    }
}
