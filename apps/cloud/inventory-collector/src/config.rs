//! Configuration for the inventory collector

use core_config::database::DatabaseConfig;
use core_config::server::ServerConfig;
use core_config::{ConfigError, FromEnv, env_list, env_or_default, env_parse};
use domain_inventory::lookup::DEFAULT_LICENSE_SENSITIVE_ENGINES;
use domain_inventory::pipeline::DEFAULT_PRICING_CONCURRENCY;

/// Every 6 hours
pub const DEFAULT_COLLECT_CRON: &str = "0 0 */6 * * *";

/// The Price List API is only served from a few regions
pub const DEFAULT_PRICING_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` keeps collected resources in memory only
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub aws: AwsConfig,
    /// Pricing requests in flight per listing page
    pub pricing_concurrency: usize,
    /// Engine families priced per license model and edition
    pub license_sensitive_engines: Vec<String>,
    pub collect_cron: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    /// Name stored on every resource of this account
    pub name: String,
    /// Shared-config profile used for credentials; the default chain when absent
    pub profile: Option<String>,
}

impl AccountConfig {
    /// Parse `name[:profile]`
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (name, profile) = match raw.split_once(':') {
            Some((name, profile)) => (name.trim(), Some(profile.trim())),
            None => (raw.trim(), None),
        };

        if name.is_empty() {
            return Err(ConfigError::ParseError {
                key: "AWS_ACCOUNTS".to_string(),
                details: format!("account entry '{}' has no name", raw),
            });
        }

        Ok(Self {
            name: name.to_string(),
            profile: profile.filter(|p| !p.is_empty()).map(String::from),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub accounts: Vec<AccountConfig>,
    /// Regions walked for every account
    pub regions: Vec<String>,
    /// Region of the Price List API endpoint
    pub pricing_region: String,
}

fn default_aws_regions() -> [&'static str; 3] {
    ["us-east-1", "us-west-2", "eu-west-1"]
}

impl FromEnv for AwsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let accounts = env_list("AWS_ACCOUNTS", &["default"])
            .iter()
            .map(|raw| AccountConfig::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            accounts,
            regions: env_list("AWS_REGIONS", &default_aws_regions()),
            pricing_region: env_or_default("AWS_PRICING_REGION", DEFAULT_PRICING_REGION),
        })
    }
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let database = match DatabaseConfig::from_env() {
            Ok(database) => Some(database),
            Err(ConfigError::MissingEnvVar(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            database,
            server: ServerConfig::from_env()?,
            aws: AwsConfig::from_env()?,
            pricing_concurrency: env_parse("PRICING_CONCURRENCY", DEFAULT_PRICING_CONCURRENCY)?
                .max(1),
            license_sensitive_engines: env_list(
                "LICENSE_SENSITIVE_ENGINES",
                DEFAULT_LICENSE_SENSITIVE_ENGINES,
            ),
            collect_cron: env_or_default("COLLECT_CRON", DEFAULT_COLLECT_CRON),
        })
    }
}
