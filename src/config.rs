use std::{net::IpAddr, str::FromStr};

use tracing::Level;

/// An error that can occur while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{key} has an invalid value: {value:?}")]
	Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read from the environment (and a `.env` file, if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub host: IpAddr,
	pub port: u16,
	pub log_level: Level,
	/// When set, traces and metrics are exported to this OTLP collector.
	pub otlp_endpoint: Option<String>,
	/// Whether the authentication routes are rate limited per peer IP.
	pub rate_limit: bool,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Builds the configuration from an arbitrary key lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
	where
		F: Fn(&str) -> Option<String>,
	{
		let database_url = lookup("DATABASE_URL").ok_or(Error::Missing("DATABASE_URL"))?;

		Ok(Self {
			database_url,
			host: parse(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse(&lookup, "PORT", 3000)?,
			log_level: parse(&lookup, "LOG_LEVEL", Level::INFO)?,
			otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty()),
			rate_limit: parse(&lookup, "RATE_LIMIT", true)?,
		})
	}
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, Error>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
{
	match lookup(key) {
		None => Ok(default),
		Some(value) => value.trim().parse().map_err(|_| Error::Invalid { key, value }),
	}
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::*;

	fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
		let vars = vars
			.iter()
			.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
			.collect::<HashMap<_, _>>();

		Config::from_lookup(|key| vars.get(key).cloned())
	}

	#[test]
	fn test_defaults() {
		let config = config(&[("DATABASE_URL", "postgres://localhost/blog")]).unwrap();

		assert_eq!(config.port, 3000);
		assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
		assert_eq!(config.log_level, Level::INFO);
		assert!(config.rate_limit);
		assert!(config.otlp_endpoint.is_none());
	}

	#[test]
	fn test_missing_database_url() {
		assert!(matches!(config(&[]), Err(Error::Missing("DATABASE_URL"))));
	}

	#[test]
	fn test_overrides() {
		let config = config(&[
			("DATABASE_URL", "postgres://localhost/blog"),
			("PORT", "8080"),
			("HOST", "0.0.0.0"),
			("LOG_LEVEL", "debug"),
			("RATE_LIMIT", "false"),
			("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
		])
		.unwrap();

		assert_eq!(config.port, 8080);
		assert_eq!(config.host, IpAddr::from([0, 0, 0, 0]));
		assert_eq!(config.log_level, Level::DEBUG);
		assert!(!config.rate_limit);
		assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
	}

	#[test]
	fn test_invalid_port() {
		let error = config(&[("DATABASE_URL", "postgres://"), ("PORT", "http")]).unwrap_err();

		assert!(matches!(error, Error::Invalid { key: "PORT", .. }));
	}
}
