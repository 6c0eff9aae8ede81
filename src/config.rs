use std::env;

use crate::db::Dialect;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub dialect: Dialect,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub server_port: u16,
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let dialect = match env::var("DATABASE_TYPE")
            .unwrap_or_else(|_| "postgresql".to_string())
            .as_str()
        {
            "postgresql" | "postgres" => Dialect::Postgres,
            "mysql" => Dialect::MySql,
            other => return Err(format!("Invalid DATABASE_TYPE: {other}")),
        };

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());

        let default_db_port = match dialect {
            Dialect::Postgres => "5432",
            Dialect::MySql => "3306",
        };
        let db_port = env::var("DB_PORT")
            .unwrap_or_else(|_| default_db_port.to_string())
            .parse()
            .map_err(|_| "Invalid DB_PORT")?;

        let default_db_user = match dialect {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "root",
        };
        let db_user = env::var("DB_USER").unwrap_or_else(|_| default_db_user.to_string());

        let db_password = env::var("DB_PASSWORD").unwrap_or_default();

        let db_name = env::var("DB_NAME").unwrap_or_else(|_| "sheetbase".to_string());

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| "Invalid PORT")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string());

        Ok(Config {
            dialect,
            db_host,
            db_port,
            db_user,
            db_password,
            db_name,
            server_port,
            allowed_origins,
            static_dir,
        })
    }

    /// Connection URL for the configured dialect
    pub fn database_url(&self) -> String {
        let scheme = match self.dialect {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
        };
        format!(
            "{}://{}:{}@{}:{}/{}",
            scheme, self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("0.0.0.0:{}", self.server_port)
    }
}
