use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub resend: ResendConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Peers allowed to set `Forwarded` / `X-Forwarded-For`. Empty means the
    /// socket peer address is always used as the client address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Expected `iss` claim, e.g. `https://dobeu.us.auth0.com/`
    #[serde(default)]
    pub issuer: Option<String>,
    /// Expected `aud` claim
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResendConfig {
    pub api_key: String,
    #[serde(default)]
    pub from_email: String,
    /// Inbox receiving contact / privacy request notifications
    #[serde(default)]
    pub notify_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    pub interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

fn parse_ip_list(value: &str) -> Result<Vec<IpAddr>, Box<dyn std::error::Error>> {
    let mut ips = Vec::new();
    for v in value.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        let ip = v
            .parse::<IpAddr>()
            .map_err(|e| format!("Invalid proxy address '{v}': {e}"))?;
        ips.push(ip);
    }
    Ok(ips)
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse::<T>().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            // no config file: build from environment variables and defaults
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(s).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(get_env: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and no config.toml was found")?;
        let jwt_secret = get_env("JWT_SECRET")
            .ok_or("JWT_SECRET is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(get_env("SERVER_PORT"), 8080u16),
                trusted_proxies: match get_env("TRUSTED_PROXIES") {
                    Some(v) => parse_ip_list(&v)?,
                    None => Vec::new(),
                },
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(get_env("DB_MAX_CONNECTIONS"), 10u32),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: get_env("JWT_ISSUER"),
                audience: get_env("JWT_AUDIENCE"),
            },
            twilio: TwilioConfig {
                account_sid: get_env("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                auth_token: get_env("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                from_phone: get_env("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            },
            resend: ResendConfig {
                api_key: get_env("RESEND_API_KEY").unwrap_or_default(),
                from_email: get_env("RESEND_FROM_EMAIL").unwrap_or_default(),
                notify_email: get_env("RESEND_NOTIFY_EMAIL").unwrap_or_default(),
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_or(get_env("RATE_LIMIT_MAX_REQUESTS"), 5u32),
                window_secs: parse_or(get_env("RATE_LIMIT_WINDOW_SECS"), 900u64),
            },
            maintenance: MaintenanceConfig {
                interval_secs: parse_or(get_env("MAINTENANCE_INTERVAL_SECS"), 300u64),
            },
        })
    }

    /// Reject settings that would leave the service unsafe to run.
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.jwt.secret.trim().is_empty() {
            return Err("JWT secret must not be empty".into());
        }
        Ok(())
    }

    /// Environment variables win over file values.
    fn apply_env_overrides(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("TRUSTED_PROXIES") {
            self.server.trusted_proxies = parse_ip_list(&v)?;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.jwt.issuer = Some(v);
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            self.jwt.audience = Some(v);
        }
        if let Ok(v) = env::var("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = v;
        }
        if let Ok(v) = env::var("TWILIO_PHONE_NUMBER") {
            self.twilio.from_phone = v;
        }
        if let Ok(v) = env::var("RESEND_API_KEY") {
            self.resend.api_key = v;
        }
        if let Ok(v) = env::var("RESEND_FROM_EMAIL") {
            self.resend.from_email = v;
        }
        if let Ok(v) = env::var("RESEND_NOTIFY_EMAIL") {
            self.resend.notify_email = v;
        }
        if let Ok(v) = env::var("RATE_LIMIT_MAX_REQUESTS")
            && let Ok(n) = v.parse()
        {
            self.rate_limit.max_requests = n;
        }
        if let Ok(v) = env::var("RATE_LIMIT_WINDOW_SECS")
            && let Ok(n) = v.parse()
        {
            self.rate_limit.window_secs = n;
        }
        if let Ok(v) = env::var("MAINTENANCE_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.maintenance.interval_secs = n;
        }
        Ok(())
    }
}
