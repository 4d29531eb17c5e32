use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySqlConnectOptions as SqlxConnectOptions, MySqlSslMode as SqlxSslMode};

use crate::SerializableSecretString;

/// Configuration for connecting to a MySQL database.
///
/// This struct holds all necessary connection parameters and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MySqlConnectionConfig {
    /// Hostname or IP address of the MySQL server.
    pub host: String,
    /// Port number on which the MySQL server is listening.
    pub port: u16,
    /// Name of the MySQL database to connect to.
    pub name: String,
    /// Username for authenticating with the MySQL server.
    pub username: String,
    /// Password for the specified user. This field is sensitive and redacted in debug output.
    pub password: Option<SerializableSecretString>,
    /// TLS configuration for secure connections.
    pub tls: TlsConfig,
}

/// TLS settings for secure MySQL connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TlsConfig {
    /// Whether TLS is enabled for the connection.
    pub enabled: bool,
}

/// A trait which can be used to convert the implementation into a crate
/// specific connect options. The connection parameters are kept centralized
/// in [`MySqlConnectionConfig`] so every consumer derives its options from
/// the same source.
pub trait IntoConnectOptions<Output> {
    /// Creates connection options for connecting to a specific database.
    ///
    /// Returns [`Output`] configured with all connection parameters including
    /// the database name from this instance.
    fn with_db(&self) -> Output;
}

impl IntoConnectOptions<SqlxConnectOptions> for MySqlConnectionConfig {
    fn with_db(&self) -> SqlxConnectOptions {
        let ssl_mode = if self.tls.enabled {
            SqlxSslMode::VerifyIdentity
        } else {
            SqlxSslMode::Preferred
        };
        let mut options = SqlxConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.name)
            .ssl_mode(ssl_mode);

        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }

        options
    }
}
