//! Settings of the MCP server process that hosts the formatter.
//!
//! Read once from the environment at startup and passed into server
//! construction. None of it changes how records are flattened.

use {
    std::{fmt, num::ParseIntError, str::FromStr},
    tap::Pipe,
};

pub const TRANSPORT_VAR: &str = "MCP_TRANSPORT";
pub const API_KEY_VAR: &str = "POLYGON_API_KEY";
pub const HOST_VAR: &str = "HOST";
pub const PORT_VAR: &str = "PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown transport '{0}', expected one of: stdio, sse, streamable-http")]
    UnknownTransport(String),
    #[error("invalid PORT value '{value}'")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

type Result<T> = std::result::Result<T, self::Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Stdio,
    Sse,
    StreamableHttp,
}

impl Transport {
    pub const fn as_str(self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Sse => "sse",
            Transport::StreamableHttp => "streamable-http",
        }
    }
}

impl FromStr for Transport {
    type Err = self::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stdio" => Ok(Transport::Stdio),
            "sse" => Ok(Transport::Sse),
            "streamable-http" => Ok(Transport::StreamableHttp),
            other => Err(self::Error::UnknownTransport(other.to_owned())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    transport: Transport,
    api_key: Option<Box<str>>,
    host: Box<str>,
    port: u16,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("transport", &self.transport)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. An unknown transport falls
    /// back to stdio, a blank api key counts as missing, a bad port is an error.
    /// `HOST` overrides the `0.0.0.0` bind host when set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let transport = lookup(TRANSPORT_VAR)
            .map(|value| {
                value.parse::<Transport>().unwrap_or_else(|error| {
                    tracing::warn!(%error, "falling back to {}", Transport::Stdio);
                    Transport::Stdio
                })
            })
            .unwrap_or_default();

        let api_key: Option<Box<str>> = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .map(Box::from);
        match api_key {
            Some(_) => tracing::info!("api key configured"),
            None => tracing::warn!("{API_KEY_VAR} environment variable not set"),
        }

        let host: Box<str> = lookup(HOST_VAR)
            .filter(|host| !host.is_empty())
            .map(Box::from)
            .unwrap_or_else(|| Box::from(DEFAULT_HOST));

        let port = lookup(PORT_VAR)
            .map(|value| {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|source| self::Error::InvalidPort { value, source })
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        Self {
            transport,
            api_key,
            host,
            port,
        }
        .pipe(Ok)
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashMap};

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test_log::test]
    fn test_defaults() -> anyhow::Result<()> {
        let config = config(&[])?;
        assert_eq!(config.transport(), Transport::Stdio);
        assert_eq!(config.api_key(), None);
        assert_eq!(config.bind_addr(), "0.0.0.0:10000");
        Ok(())
    }

    #[test]
    fn test_all_set() -> anyhow::Result<()> {
        let config = config(&[
            (TRANSPORT_VAR, "streamable-http"),
            (API_KEY_VAR, "secret"),
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, "8080"),
        ])?;
        assert_eq!(config.transport(), Transport::StreamableHttp);
        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 8080);
        assert!(!format!("{config:?}").contains("secret"));
        Ok(())
    }

    #[test_log::test]
    fn test_unknown_transport_falls_back_to_stdio() -> anyhow::Result<()> {
        assert_eq!(config(&[(TRANSPORT_VAR, "carrier-pigeon")])?.transport(), Transport::Stdio);
        assert_eq!(config(&[(TRANSPORT_VAR, "sse")])?.transport(), Transport::Sse);
        Ok(())
    }

    #[test]
    fn test_blank_api_key_is_missing() -> anyhow::Result<()> {
        assert_eq!(config(&[(API_KEY_VAR, "  ")])?.api_key(), None);
        Ok(())
    }

    #[test]
    fn test_bad_port_is_an_error() {
        assert!(matches!(
            config(&[(PORT_VAR, "http")]),
            Err(Error::InvalidPort { value, .. }) if value == "http"
        ));
        assert!(config(&[(PORT_VAR, "70000")]).is_err());
    }

    #[test]
    fn test_transport_names() {
        for transport in [Transport::Stdio, Transport::Sse, Transport::StreamableHttp] {
            assert_eq!(transport.to_string().parse::<Transport>().ok(), Some(transport));
        }
    }
}
