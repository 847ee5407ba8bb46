use std::env;
use std::fmt;
use std::path::PathBuf;

use url::Url;

pub const DEFAULT_REGISTRY_URL: &str = "https://api.company-information.service.gov.uk";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub registry_api_key: String,
    pub registry_base_url: Url,
    pub reports_dir: PathBuf,
    pub public_dir: PathBuf,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

// Keeps the registry key out of log output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("registry_api_key", &"[REDACTED]")
            .field("registry_base_url", &self.registry_base_url.as_str())
            .field("reports_dir", &self.reports_dir)
            .field("public_dir", &self.public_dir)
            .field("otel_service_name", &self.otel_service_name)
            .field("otel_exporter_endpoint", &self.otel_exporter_endpoint)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            registry_api_key: env::var("COMPANIES_HOUSE_API_KEY")
                .expect("COMPANIES_HOUSE_API_KEY must be set"),
            registry_base_url: env::var("COMPANIES_HOUSE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_REGISTRY_URL.to_string())
                .parse()
                .expect("COMPANIES_HOUSE_BASE_URL must be a valid URL"),
            reports_dir: env::var("REPORTS_DIR")
                .unwrap_or_else(|_| "reports".to_string())
                .into(),
            public_dir: env::var("PUBLIC_DIR")
                .unwrap_or_else(|_| "public".to_string())
                .into(),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "overdue-report".to_string()),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
