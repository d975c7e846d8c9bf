//! Configuration module for the rate service
//!
//! Values come from command-line flags, then environment variables (and
//! `.env`), then defaults. Flags win over the environment.

use clap::Parser;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RateError, Result};
use crate::source::DEFAULT_DEPTH_URL;

/// Log output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl FromStr for Mode {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(RateError::Config(format!("unknown mode: {}", other))),
        }
    }
}

/// Command-line flags. Each one overrides the environment variable of the
/// same name in upper snake case (`--db-host` over `DB_HOST`).
#[derive(Debug, Default, Parser)]
#[command(name = "rate-service", version, about = "USDT/RUB best ask/bid rate service")]
pub struct Args {
    /// IP address for the gRPC server
    #[arg(long)]
    pub app_ip: Option<String>,
    /// Port for the gRPC server
    #[arg(long)]
    pub app_port: Option<u16>,

    /// Database name
    #[arg(long)]
    pub db_name: Option<String>,
    /// Database host
    #[arg(long)]
    pub db_host: Option<String>,
    /// Database port
    #[arg(long)]
    pub db_port: Option<u16>,
    /// Database user
    #[arg(long)]
    pub db_user: Option<String>,
    /// Database password
    #[arg(long)]
    pub db_password: Option<String>,
    /// Connection pool size
    #[arg(long)]
    pub db_max_connections: Option<u32>,

    /// Log mode: development or production
    #[arg(long)]
    pub mode: Option<String>,

    /// Listen address of the metrics server
    #[arg(long)]
    pub metrics_endpoint: Option<String>,

    /// Upstream depth endpoint
    #[arg(long)]
    pub upstream_url: Option<String>,

    /// Deadline for each GetRate call, in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
}

impl Args {
    /// Flag value standing in for the environment variable `key`
    pub fn value(&self, key: &str) -> Option<String> {
        let text = |v: &Option<String>| v.clone();
        let num = |v: Option<u64>| v.map(|n| n.to_string());

        match key {
            "APP_IP" => text(&self.app_ip),
            "APP_PORT" => num(self.app_port.map(u64::from)),
            "DB_NAME" => text(&self.db_name),
            "DB_HOST" => text(&self.db_host),
            "DB_PORT" => num(self.db_port.map(u64::from)),
            "DB_USER" => text(&self.db_user),
            "DB_PASSWORD" => text(&self.db_password),
            "DB_MAX_CONNECTIONS" => num(self.db_max_connections.map(u64::from)),
            "MODE" => text(&self.mode),
            "METRICS_ENDPOINT" => text(&self.metrics_endpoint),
            "UPSTREAM_URL" => text(&self.upstream_url),
            "REQUEST_TIMEOUT_MS" => num(self.request_timeout_ms),
            _ => None,
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// gRPC listen IP
    pub app_ip: String,
    /// gRPC listen port
    pub app_port: u16,

    pub database: DatabaseConfig,

    pub mode: Mode,

    /// Listen address of the metrics server
    pub metrics_endpoint: String,

    /// Upstream depth endpoint
    pub upstream_url: String,

    /// Deadline applied to each GetRate call
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from flags layered over environment variables
    /// (and `.env` if present)
    pub fn load(args: &Args) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(args, |key| env::var(key).ok())
    }

    /// Build configuration from flags, falling back to `lookup` for anything
    /// not given on the command line
    pub fn from_sources<F>(args: &Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| args.value(key).or_else(|| lookup(key)))
    }

    /// Build configuration from a key lookup.
    ///
    /// Every missing required key is reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &str| {
            get(key).unwrap_or_else(|| {
                missing.push(key.to_string());
                String::new()
            })
        };

        let db_name = required("DB_NAME");
        let db_host = required("DB_HOST");
        let db_port = required("DB_PORT");
        let db_user = required("DB_USER");
        let db_password = required("DB_PASSWORD");

        if !missing.is_empty() {
            return Err(RateError::Config(format!(
                "missing required configuration fields: {}",
                missing.join(", ")
            )));
        }

        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => positive("DB_MAX_CONNECTIONS", parse("DB_MAX_CONNECTIONS", &raw)?)?,
            None => 10,
        };
        let request_timeout = get("REQUEST_TIMEOUT_MS")
            .map(|raw| parse("REQUEST_TIMEOUT_MS", &raw))
            .transpose()?
            .map(|ms: u64| positive("REQUEST_TIMEOUT_MS", ms))
            .transpose()?
            .map(Duration::from_millis);

        Ok(Self {
            app_ip: get("APP_IP").unwrap_or_else(|| "0.0.0.0".to_string()),
            app_port: get("APP_PORT")
                .map(|raw| parse("APP_PORT", &raw))
                .transpose()?
                .unwrap_or(50051),
            database: DatabaseConfig {
                name: db_name,
                host: db_host,
                port: parse("DB_PORT", &db_port)?,
                user: db_user,
                password: db_password,
                max_connections,
            },
            mode: get("MODE").map(|m| m.parse()).transpose()?.unwrap_or_default(),
            metrics_endpoint: get("METRICS_ENDPOINT")
                .unwrap_or_else(|| "0.0.0.0:9090".to_string()),
            upstream_url: get("UPSTREAM_URL").unwrap_or_else(|| DEFAULT_DEPTH_URL.to_string()),
            request_timeout,
        })
    }

    /// gRPC listen address
    pub fn app_addr(&self) -> String {
        format!("{}:{}", self.app_ip, self.app_port)
    }

    /// PostgreSQL connection options. Credentials are passed as-is, so any
    /// characters are allowed in them.
    pub fn connect_options(&self) -> PgConnectOptions {
        let db = &self.database;
        PgConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .username(&db.user)
            .password(&db.password)
            .database(&db.name)
            .ssl_mode(PgSslMode::Disable)
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| RateError::Config(format!("invalid value for {}: {}", key, raw)))
}

fn positive<T: PartialEq + Default>(key: &str, value: T) -> Result<T> {
    if value == T::default() {
        return Err(RateError::Config(format!("{} must be greater than zero", key)));
    }
    Ok(value)
}
