use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default address for both the client and the server
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3333";

/// Environment variable overriding `DEFAULT_ADDRESS`
pub const ADDRESS_ENV: &str = "FOOD_ORDER_ADDRESS";

/// Errors that can occur when parsing the command line arguments
#[derive(Debug, Clone, Error)]
pub enum CLIError {
    #[error("Invalid target format. Should be <host>:<port>")]
    InvalidUrlFormat,
    #[error("Missing parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("Invalid parameter '{0}'")]
    InvalidParameter(String),
}

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9\.\-]+:\d{1,5}$").expect("address pattern is a valid regex")
    })
}

/// Validate the format of the TCP address provided by the user
///
/// Returns its input if the address is in the format <host>:<port>, otherwise InvalidUrlFormat
pub fn validate_address(url: &str) -> Result<&str, CLIError> {
    if address_pattern().is_match(url) {
        Ok(url)
    } else {
        Err(CLIError::InvalidUrlFormat)
    }
}

/// Address to use when none is given on the command line.
///
/// `FOOD_ORDER_ADDRESS` wins over the default when it is set and well-formed.
pub fn default_address() -> Result<String, CLIError> {
    resolve_default(std::env::var(ADDRESS_ENV).ok())
}

fn resolve_default(from_env: Option<String>) -> Result<String, CLIError> {
    match from_env {
        Some(address) => validate_address(address.trim()).map(str::to_string),
        None => Ok(DEFAULT_ADDRESS.to_string()),
    }
}

/// Parse a numeric argument
pub fn parse_id(arg: &str) -> Result<u32, CLIError> {
    arg.parse::<u32>()
        .map_err(|_| CLIError::InvalidParameter(arg.to_string()))
}

/// Install the console logger. Verbosity comes from `RUST_LOG`, `info` by default.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}
