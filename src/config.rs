use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fmt::Display};

use anyhow::{Context, anyhow};
use dotenvy::dotenv;

use crate::report::layout::DeductionSummary;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub api_prefix: String,

    // Report output
    pub reports_dir: PathBuf,
    pub reports_url_prefix: String,
    pub report_file_prefix: String,
    pub deduction_summary: DeductionSummary,
    pub payment_mode: String,

    // Rendering backend
    pub chrome_bin: Option<PathBuf>,
    pub render_budget_ms: u64,

    pub rate_report_per_min: u32,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            api_prefix: or_default("API_PREFIX", "/api"),

            reports_dir: PathBuf::from(or_default("REPORTS_DIR", "reports")),
            reports_url_prefix: or_default("REPORTS_URL_PREFIX", "/reports")
                .trim_end_matches('/')
                .to_string(),
            report_file_prefix: or_default("REPORT_FILE_PREFIX", "report"),
            deduction_summary: parsed(&lookup, "REPORT_DEDUCTION_TOTAL", DeductionSummary::Declared)?,
            payment_mode: or_default("REPORT_PAYMENT_MODE", "Cash"),

            chrome_bin: lookup("CHROME_BIN")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            render_budget_ms: parsed(&lookup, "RENDER_BUDGET_MS", 10_000)?,

            rate_report_per_min: parsed(&lookup, "RATE_REPORT_PER_MIN", 30)?,
            log_dir: or_default("LOG_DIR", "logs"),
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
