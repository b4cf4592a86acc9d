use overbot_core::profiles::ProfileLimits;
use overbot_overwatch::DEFAULT_BASE_URL;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    net::SocketAddr,
    str::FromStr,
    time::Duration,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_SELECT_TIMEOUT: u64 = 60;

pub struct Config {
    pub database_url: String,
    pub discord_token: String,
    pub discord_public_key: String,
    pub application_id: u64,
    pub bind_addr: SocketAddr,
    pub overwatch_url: String,
    pub limits: ProfileLimits,
    pub select_timeout: Duration,
}

#[derive(Debug, Eq, PartialEq)]
pub enum ConfigError {
    MissingEnvVar(&'static str),
    InvalidEnvVar(&'static str, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingEnvVar(key));
        let defaults = ProfileLimits::default();

        Ok(Self {
            database_url: required("DATABASE_CONN")?,
            discord_token: required("DISCORD_TOKEN")?,
            discord_public_key: required("DISCORD_PUBLIC_KEY")?,
            application_id: parse("DISCORD_APPLICATION_ID", &required("DISCORD_APPLICATION_ID")?)
                .and_then(|id: u64| {
                    if id == 0 {
                        Err(ConfigError::InvalidEnvVar("DISCORD_APPLICATION_ID", id.to_string()))
                    } else {
                        Ok(id)
                    }
                })?,
            bind_addr: parse(
                "BIND_ADDR",
                &lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            )?,
            overwatch_url: lookup("OVERWATCH_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            limits: ProfileLimits {
                free: optional(&lookup, "PROFILE_LIMIT")?.unwrap_or(defaults.free),
                premium: optional(&lookup, "PREMIUM_PROFILE_LIMIT")?.unwrap_or(defaults.premium),
            },
            select_timeout: Duration::from_secs(
                optional(&lookup, "SELECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_SELECT_TIMEOUT),
            ),
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(key, value.to_string()))
}

fn optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(key).map(|value| parse(key, &value)).transpose()
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConfigError::MissingEnvVar(key) => write!(f, "missing environment variable {key}"),
            ConfigError::InvalidEnvVar(key, value) => {
                write!(f, "invalid value for {key}: {value:?}")
            }
        }
    }
}

impl StdError for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DATABASE_CONN", "postgres://localhost/overbot"),
        ("DISCORD_TOKEN", "token"),
        ("DISCORD_PUBLIC_KEY", "abcd"),
        ("DISCORD_APPLICATION_ID", "1234"),
    ];

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.application_id, 1234);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.overwatch_url, DEFAULT_BASE_URL);
        assert_eq!(config.limits, ProfileLimits::default());
        assert_eq!(config.select_timeout, Duration::from_secs(60));
    }

    #[test]
    fn overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PROFILE_LIMIT", "2"),
            ("PREMIUM_PROFILE_LIMIT", "10"),
            ("SELECT_TIMEOUT_SECS", "15"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.limits, ProfileLimits { free: 2, premium: 10 });
        assert_eq!(config.select_timeout, Duration::from_secs(15));
    }

    #[test]
    fn missing_and_invalid() {
        assert_eq!(
            Config::from_lookup(lookup(&REQUIRED[1..])).err(),
            Some(ConfigError::MissingEnvVar("DATABASE_CONN"))
        );

        let mut vars = REQUIRED.to_vec();
        vars.push(("PROFILE_LIMIT", "many"));
        assert_eq!(
            Config::from_lookup(lookup(&vars)).err(),
            Some(ConfigError::InvalidEnvVar("PROFILE_LIMIT", "many".into()))
        );
    }
}
