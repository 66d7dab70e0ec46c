use clap::{Args, Parser, Subcommand};

use crossroad_stats::ClickHouseConfig;
use tracklet_relay::RedisConfig;

#[derive(Parser)]
#[command(name = "semaforo-server", about = "Smart city traffic dashboard backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Запустить сервер
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// HTTP порт дашборда
    #[arg(long, default_value_t = 5000, env = "DASHBOARD_PORT")]
    pub port: u16,

    // --- Upstream message stream (Redis) ---
    #[arg(long, default_value = "127.0.0.1", env = "REDIS_HOST")]
    pub redis_host: String,

    #[arg(long, default_value_t = 6379, env = "REDIS_PORT")]
    pub redis_port: u16,

    #[arg(long, env = "REDIS_PASSWORD")]
    pub redis_password: Option<String>,

    /// Topic по умолчанию для /api/stream
    #[arg(
        long,
        default_value = "camera:skylinewebcams_largo_argentina",
        env = "REDIS_TOPIC"
    )]
    pub default_topic: String,

    // --- Aggregate store (ClickHouse) ---
    #[arg(long, default_value = "localhost", env = "CLICKHOUSE_HOST")]
    pub clickhouse_host: String,

    #[arg(long, default_value_t = 8123, env = "CLICKHOUSE_PORT")]
    pub clickhouse_port: u16,

    #[arg(long, default_value = "default", env = "CLICKHOUSE_USER")]
    pub clickhouse_user: String,

    #[arg(long, default_value = "", env = "CLICKHOUSE_PASSWORD")]
    pub clickhouse_password: String,

    #[arg(long, default_value = "default", env = "CLICKHOUSE_DATABASE")]
    pub clickhouse_database: String,

    /// Отдавать встроенные mock данные вместо запросов в ClickHouse
    #[arg(
        long,
        default_value_t = true,
        env = "MOCK_DATA",
        action = clap::ArgAction::Set
    )]
    pub mock_data: bool,
}

impl ServeArgs {
    pub fn redis(&self) -> RedisConfig {
        RedisConfig {
            host: self.redis_host.clone(),
            port: self.redis_port,
            password: self.redis_password.clone(),
        }
    }

    pub fn clickhouse(&self) -> ClickHouseConfig {
        ClickHouseConfig {
            host: self.clickhouse_host.clone(),
            port: self.clickhouse_port,
            user: self.clickhouse_user.clone(),
            password: self.clickhouse_password.clone(),
            database: self.clickhouse_database.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let cli = Cli::parse_from(["semaforo-server", "serve"]);
        let Commands::Serve(args) = cli.command;
        assert_eq!(args.port, 5000);
        assert_eq!(args.redis_port, 6379);
        assert_eq!(args.default_topic, "camera:skylinewebcams_largo_argentina");
        assert!(args.mock_data);
        assert!(args.redis_password.is_none());
    }

    #[test]
    fn mock_data_can_be_disabled() {
        let cli = Cli::parse_from(["semaforo-server", "serve", "--mock-data", "false"]);
        let Commands::Serve(args) = cli.command;
        assert!(!args.mock_data);
    }
}
