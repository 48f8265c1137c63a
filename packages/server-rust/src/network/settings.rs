//! Application settings served by the info and branding endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Application name reported by the info endpoint.
    pub app_name: String,
    /// Build version reported by the info endpoint.
    pub version: String,
    /// Deployment environment label (development, staging, production).
    pub environment: String,
    /// White-label branding fields.
    pub branding: BrandingSettings,
    /// Maximum time to wait for a request to complete.
    #[serde(skip)]
    pub request_timeout: Duration,
    /// Allowed CORS origins. A `"*"` entry allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: "tenantfence".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            branding: BrandingSettings::default(),
            request_timeout: Duration::from_secs(30),
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Branding payload returned verbatim by the branding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingSettings {
    /// Product name shown in client UIs.
    pub product_name: String,
    /// Logo URL for client UIs.
    pub logo_url: String,
    /// Support contact address.
    pub support_email: String,
}

impl Default for BrandingSettings {
    fn default() -> Self {
        Self {
            product_name: "TenantFence".to_string(),
            logo_url: "/static/logo.svg".to_string(),
            support_email: "support@tenantfence.example".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_package_version() {
        let settings = AppSettings::default();
        assert_eq!(settings.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(settings.environment, "development");
    }

    #[test]
    fn branding_serializes_with_named_fields() {
        let json = serde_json::to_value(BrandingSettings::default()).unwrap();
        assert_eq!(json["product_name"], "TenantFence");
        assert!(json["support_email"].is_string());
    }
}
