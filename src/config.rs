use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: SocketAddr,
    pub env_mode: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub upstream_timeout: Duration,
    pub static_dir: String,
    pub razorpay: RazorpayConfig,
    pub cms: CmsConfig,
    pub org: OrgConfig,
    pub storage: StorageConfig,
    pub links: LinkConfig,
    pub smtp: Option<SmtpConfig>,
    pub geocoder_base: String,
}

#[derive(Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub api_base: String,
}

#[derive(Clone, Debug)]
pub struct CmsConfig {
    pub space_id: String,
    pub access_token: String,
    pub environment: String,
    pub api_base: String,
}

/// Organisation details printed on every receipt.
#[derive(Clone, Debug)]
pub struct OrgConfig {
    pub name: String,
    pub address: String,
    pub registration_no: String,
    pub pan: String,
    pub exemption_no: String,
    pub signatory: String,
    pub logo_path: Option<String>,
    pub signature_path: Option<String>,
    pub receipt_prefix: String,
    pub include_certificate: bool,
}

#[derive(Clone, Debug)]
pub enum StorageConfig {
    Fs {
        root: String,
    },
    S3 {
        endpoint: String,
        bucket: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
    },
}

#[derive(Clone, Debug)]
pub struct LinkConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub admin_email: Option<String>,
}

/// Filesystem root for receipts; objects land in `<root>/receipts/<id>.pdf`.
pub const DEFAULT_RECEIPT_ROOT: &str = "public";

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} must be set", name))
}

fn or_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let env_mode = or_default("RUST_ENV", "development");

        let server_addr = or_default("SERVER_ADDR", "0.0.0.0:8080")
            .parse::<SocketAddr>()
            .context("SERVER_ADDR must be a socket address")?;

        let allowed_origins: Vec<String> = env::var("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if allowed_origins.is_empty() && env_mode == "production" {
            anyhow::bail!("ALLOWED_ORIGINS must contain at least one origin in production");
        }

        let razorpay = RazorpayConfig {
            key_id: required("RAZORPAY_KEY_ID")?,
            key_secret: required("RAZORPAY_KEY_SECRET")?,
            api_base: or_default("RAZORPAY_API_BASE", "https://api.razorpay.com/v1"),
        };

        let cms = CmsConfig {
            space_id: required("CONTENTFUL_SPACE_ID")?,
            access_token: required("CONTENTFUL_ACCESS_TOKEN")?,
            environment: or_default("CONTENTFUL_ENVIRONMENT", "master"),
            api_base: or_default("CONTENTFUL_API_BASE", "https://cdn.contentful.com"),
        };

        let storage = match or_default("RECEIPT_STORAGE", "fs").as_str() {
            "s3" => StorageConfig::S3 {
                endpoint: required("OBJECT_STORAGE_ENDPOINT")?,
                bucket: required("OBJECT_STORAGE_BUCKET")?,
                region: or_default("OBJECT_STORAGE_REGION", "ap-south-1"),
                access_key_id: required("OBJECT_STORAGE_ACCESS_KEY_ID")?,
                secret_access_key: required("OBJECT_STORAGE_SECRET_ACCESS_KEY")?,
            },
            "fs" => StorageConfig::Fs {
                root: or_default("RECEIPT_DIR", DEFAULT_RECEIPT_ROOT),
            },
            other => anyhow::bail!("RECEIPT_STORAGE must be `fs` or `s3`, got `{}`", other),
        };

        let links = LinkConfig {
            secret: required("RECEIPT_LINK_SECRET")?,
            ttl_hours: parsed_or("RECEIPT_LINK_TTL_HOURS", 72),
        };

        let smtp = match env::var("SMTP_HOST").ok().filter(|h| !h.trim().is_empty()) {
            Some(host) => Some(SmtpConfig {
                host,
                port: parsed_or("SMTP_PORT", 587),
                username: env::var("SMTP_USERNAME").ok(),
                password: env::var("SMTP_PASSWORD").ok(),
                from: required("MAIL_FROM")?,
                admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            }),
            None => None,
        };

        Ok(Self {
            server_addr,
            env_mode,
            allowed_origins,
            rate_limit_per_second: parsed_or("RATE_LIMIT_PER_SECOND", 50),
            rate_limit_burst: parsed_or("RATE_LIMIT_BURST", 100),
            upstream_timeout: Duration::from_secs(parsed_or("UPSTREAM_TIMEOUT_SECS", 10)),
            static_dir: or_default("STATIC_DIR", "static"),
            razorpay,
            cms,
            org: OrgConfig::from_env(),
            storage,
            links,
            smtp,
            geocoder_base: or_default("GEOCODER_BASE", "https://nominatim.openstreetmap.org"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.env_mode == "production"
    }
}

impl OrgConfig {
    pub fn from_env() -> Self {
        Self {
            name: or_default("ORG_NAME", "Seva Foundation"),
            address: or_default("ORG_ADDRESS", ""),
            registration_no: or_default("ORG_REGISTRATION_NO", ""),
            pan: or_default("ORG_PAN", ""),
            exemption_no: or_default("ORG_80G_NO", ""),
            signatory: or_default("ORG_SIGNATORY", "Authorised Signatory"),
            logo_path: env::var("ORG_LOGO_PATH").ok().filter(|v| !v.trim().is_empty()),
            signature_path: env::var("ORG_SIGNATURE_PATH").ok().filter(|v| !v.trim().is_empty()),
            receipt_prefix: or_default("RECEIPT_PREFIX", "REC"),
            include_certificate: flag("RECEIPT_CERTIFICATE", true),
        }
    }
}
