#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "safari-cart")]
#[command(about = "Shopping cart and booking client for the conservancy site")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override api.base_url
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Override storage.path
    #[arg(long, global = true)]
    pub storage_path: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: cli::Command,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// File settings (or defaults) with command-line overrides applied on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(url) = &self.api_base_url {
            config.api.base_url = url.clone();
        }
        if let Some(path) = &self.storage_path {
            config.storage.path = path.clone();
        }
        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let cli = CliConfig::parse_from([
            "safari-cart",
            "--api-base-url",
            "https://api.example.com",
            "--storage-path",
            "/tmp/cart",
            "show",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.storage.path, "/tmp/cart");
        assert_eq!(config.storage.cart_key, "shoppingCart");
    }

    #[test]
    fn test_set_quantity_accepts_negative_input() {
        let cli = CliConfig::parse_from([
            "safari-cart",
            "set-quantity",
            "--id",
            "1",
            "--quantity",
            "-5",
        ]);

        match cli.command {
            cli::Command::SetQuantity { quantity, .. } => assert_eq!(quantity, "-5"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_quote_parses_comma_separated_services() {
        let cli = CliConfig::parse_from([
            "safari-cart",
            "quote",
            "--visitors",
            "3",
            "--service",
            "guided_walk,homestay",
        ]);

        match cli.command {
            cli::Command::Quote(args) => {
                assert_eq!(args.services, vec!["guided_walk", "homestay"]);
                assert_eq!(args.visitors, "3");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
