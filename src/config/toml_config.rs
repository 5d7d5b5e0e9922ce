use crate::adapters::http::DEFAULT_TIMEOUT_SECONDS;
use crate::core::cart_store::DEFAULT_CART_KEY;
use crate::core::pricing::PricingConfig;
use crate::domain::booking::ServiceCatalog;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SafariError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub services: ServiceCatalog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
    pub cart_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./.safari-cart".to_string(),
            cart_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SafariError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SafariError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SafariError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;

        validation::validate_path("storage.path", &self.storage.path)?;
        validation::validate_storage_key("storage.cart_key", &self.storage.cart_key)?;

        validation::validate_range(
            "pricing.service_fee_rate",
            self.pricing.service_fee_rate,
            Decimal::ZERO,
            Decimal::ONE,
        )?;
        for (field, value) in [
            ("pricing.free_shipping_threshold", self.pricing.free_shipping_threshold),
            ("pricing.flat_shipping_fee", self.pricing.flat_shipping_fee),
        ] {
            if value.is_sign_negative() {
                return Err(SafariError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Amount cannot be negative".to_string(),
                });
            }
        }
        validation::validate_non_empty_string("pricing.currency", &self.pricing.currency)?;

        let mut seen = HashSet::new();
        for service in self.services.services() {
            validation::validate_non_empty_string("services.id", &service.id)?;
            if !seen.insert(service.id.as_str()) {
                return Err(SafariError::InvalidConfigValueError {
                    field: "services.id".to_string(),
                    value: service.id.clone(),
                    reason: "Duplicate service id".to_string(),
                });
            }
            if service.price.is_sign_negative() {
                return Err(SafariError::InvalidConfigValueError {
                    field: format!("services.{}.price", service.id),
                    value: service.price.to_string(),
                    reason: "Price cannot be negative".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds
    }

    fn storage_path(&self) -> &str {
        &self.storage.path
    }

    fn cart_key(&self) -> &str {
        &self.storage.cart_key
    }

    fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    fn catalog(&self) -> &ServiceCatalog {
        &self.services
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
