use envconfig::Envconfig;

/// The outer process shell's environment-driven configuration. This is
/// deliberately separate from `klite_dispatcher::WorkerConfig`, which is
/// loaded from a JSON document and has no environment coupling of its
/// own — environment variables belong to the binary wiring things
/// together, not to the core dispatch engine.
#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "BIND_PORT", default = "3301")]
    pub port: u16,

    #[envconfig(from = "DATABASE_PATH", default = "klite.db")]
    pub database_path: String,

    #[envconfig(from = "DISPATCHER_CONFIG_PATH", default = "dispatcher.json")]
    pub dispatcher_config_path: String,

    #[envconfig(from = "MAX_SQLITE_CONNECTIONS", default = "10")]
    pub max_sqlite_connections: u32,

    #[envconfig(from = "REQUEST_TIMEOUT_MS", default = "5000")]
    pub request_timeout_ms: u64,
}

impl Config {
    /// Produce a host:port address for binding a TcpListener.
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database_path)
    }
}
