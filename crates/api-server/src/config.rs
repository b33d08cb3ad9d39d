use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,

    // Market data
    pub chart_url: String,
    pub market_timeout: Duration,

    // OCR
    pub tesseract_cmd: String,
    pub tesseract_lang: String,
    pub max_upload_bytes: usize,

    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            chart_url: yahoo_client::DEFAULT_CHART_URL.to_string(),
            market_timeout: Duration::from_secs(10),
            tesseract_cmd: "tesseract".to_string(),
            tesseract_lang: "eng".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset keys take the defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = get("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse()
            .context("PORT must be a port number")?;
        let ip: IpAddr = host
            .trim()
            .parse()
            .with_context(|| format!("HOST must be an IP address: {}", host))?;
        let addr = SocketAddr::new(ip, port);

        let market_timeout = match get("MARKET_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.parse().context("MARKET_TIMEOUT_SECS must be whole seconds")?),
            None => defaults.market_timeout,
        };
        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(bytes) => bytes.parse().context("MAX_UPLOAD_BYTES must be a byte count")?,
            None => defaults.max_upload_bytes,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            addr,
            chart_url: get("YAHOO_CHART_URL").unwrap_or(defaults.chart_url),
            market_timeout,
            tesseract_cmd: get("TESSERACT_CMD").unwrap_or(defaults.tesseract_cmd),
            tesseract_lang: get("TESSERACT_LANG").unwrap_or(defaults.tesseract_lang),
            max_upload_bytes,
            allowed_origins,
        })
    }
}
