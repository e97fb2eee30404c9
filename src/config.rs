use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// Longest explanation wait a request handler will tolerate.
pub const MAX_EXPLAIN_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "paisa",
    version,
    about = "Personal finance calculators for Indian households, served over HTTP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the JSON API server.
    Serve(Settings),
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Port to listen on.
    #[arg(long, env = "PAISA_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Key for the text-generation service; explanations fall back to a placeholder without it.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_API_URL", default_value = DEFAULT_GEMINI_API_URL)]
    pub gemini_api_url: String,

    /// Upper bound on a single explanation request, in seconds.
    #[arg(long, env = "EXPLAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub explain_timeout_secs: u64,

    /// Inflation rate in percent used when a request omits one.
    #[arg(long, env = "DEFAULT_INFLATION_RATE", default_value_t = 6.0)]
    pub default_inflation_rate: f64,

    /// Comma-separated allowed origins, or `*`.
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://127.0.0.1:3000"
    )]
    pub cors_origins: Vec<String>,

    /// Seed for the mandi price trend.
    #[arg(long, env = "MARKET_SEED", default_value_t = 42)]
    pub market_seed: u64,

    /// Emit logs as JSON lines.
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Settings {
    pub fn explain_timeout(&self) -> Duration {
        Duration::from_secs(self.explain_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_EXPLAIN_TIMEOUT_SECS).contains(&self.explain_timeout_secs) {
            return Err(format!(
                "explain-timeout-secs must be between 1 and {MAX_EXPLAIN_TIMEOUT_SECS}"
            ));
        }
        if !self.default_inflation_rate.is_finite()
            || !(0.0..=50.0).contains(&self.default_inflation_rate)
        {
            return Err("default-inflation-rate must be between 0 and 50".to_string());
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8000,
            gemini_api_key: None,
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            explain_timeout_secs: 30,
            default_inflation_rate: 6.0,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            market_seed: 42,
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_parses_flags_and_origin_list() {
        let cli = Cli::try_parse_from([
            "paisa",
            "serve",
            "--port",
            "9100",
            "--cors-origins",
            "https://a.example,https://b.example",
            "--market-seed",
            "7",
        ])
        .expect("valid args");
        let Command::Serve(settings) = cli.command;
        assert_eq!(settings.port, 9100);
        assert_eq!(settings.market_seed, 7);
        assert_eq!(
            settings.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let settings = Settings {
            explain_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn rejects_timeout_above_cap() {
        let settings = Settings {
            explain_timeout_secs: 3_600,
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            Err("explain-timeout-secs must be between 1 and 30".to_string())
        );
        let at_cap = Settings {
            explain_timeout_secs: MAX_EXPLAIN_TIMEOUT_SECS,
            ..Settings::default()
        };
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_inflation() {
        let settings = Settings {
            default_inflation_rate: 75.0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
