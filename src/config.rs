use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account created at startup so a fresh install has someone who can
/// provision teachers and students.
#[derive(Clone, Debug)]
pub struct BootstrapAdmin {
    pub email: String,
    pub full_name: String,
    pub token: String,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://sikms.db?mode=rwc".to_string());

        let bind_addr = parse_bind_addr(
            &env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => parse_max_connections(&raw)?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL"),
            env::var("BOOTSTRAP_ADMIN_NAME"),
            env::var("BOOTSTRAP_ADMIN_TOKEN"),
        ) {
            (Ok(email), Ok(full_name), Ok(token)) => Some(BootstrapAdmin {
                email,
                full_name,
                token,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections,
            bootstrap_admin,
        })
    }
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, AppError> {
    raw.trim()
        .parse::<SocketAddr>()
        .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))
}

fn parse_max_connections(raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(AppError::Config(
            "DB_MAX_CONNECTIONS must be at least 1".to_string(),
        )),
        Ok(n) => Ok(n),
        Err(e) => Err(AppError::Config(format!(
            "DB_MAX_CONNECTIONS is invalid: {}",
            e
        ))),
    }
}
