use std::env;

use anyhow::{Context, anyhow, bail};
use chrono::Duration;
use gatehouse_core::identity::PasswordPolicy;

pub const DEFAULT_PASSWORD_PEPPER: &str = "change-me-password-pepper";
pub const DEFAULT_TOKEN_KEY: &str = "change-me-hmac-key";

/// Server configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,

    /// PostgreSQL URL. When unset the server keeps everything in memory.
    pub database_url: Option<String>,

    // Authentication secrets (pepper for Argon2 + HMAC key for tokens)
    pub auth_password_pepper: String,
    pub auth_token_key: String,

    pub session_lifetime: Duration,
    pub cookie_secure: bool,

    /// Role required for `/Admin/*`. Unset leaves the admin area open.
    pub admin_role: Option<String>,
    /// Roles created at startup when missing.
    pub seed_roles: Vec<String>,

    pub password_policy: PasswordPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            database_url: None,
            auth_password_pepper: DEFAULT_PASSWORD_PEPPER.to_string(),
            auth_token_key: DEFAULT_TOKEN_KEY.to_string(),
            session_lifetime: Duration::hours(336),
            cookie_secure: false,
            admin_role: None,
            seed_roles: Vec::new(),
            password_policy: PasswordPolicy::default(),
        }
    }
}

/// A loaded configuration plus anything worth warning about once logging is
/// up.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub env_file_loaded: bool,
    pub warnings: Vec<String>,
}

/// Longest accepted `SESSION_LIFETIME_HOURS` (ten years).
pub const MAX_SESSION_LIFETIME_HOURS: i64 = 24 * 365 * 10;

impl Config {
    pub fn from_env() -> anyhow::Result<ConfigLoad> {
        let env_file_loaded = dotenvy::dotenv().map(|_| true).or_else(|err| match err {
            dotenvy::Error::Io(_) => Ok(false),
            _ => Err(err),
        })?;

        let config = Self::from_lookup(|name| env::var(name).ok())?;
        let warnings = config.warnings();
        Ok(ConfigLoad {
            config,
            env_file_loaded,
            warnings,
        })
    }

    /// Build a config from an arbitrary variable source. Unset or blank
    /// variables fall back to the defaults; malformed ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Config::default();
        let policy = defaults.password_policy.clone();
        let var = |name: &str| lookup(name).filter(|raw| !raw.trim().is_empty());

        Ok(Config {
            server_host: var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var(&var, "SERVER_PORT")?.unwrap_or(defaults.server_port),

            database_url: var("DATABASE_URL"),

            auth_password_pepper: var("AUTH_PASSWORD_PEPPER")
                .unwrap_or(defaults.auth_password_pepper),
            auth_token_key: var("AUTH_TOKEN_KEY").unwrap_or(defaults.auth_token_key),

            session_lifetime: parse_var(&var, "SESSION_LIFETIME_HOURS")?
                .map(session_lifetime)
                .transpose()?
                .unwrap_or(defaults.session_lifetime),
            cookie_secure: parse_bool_var(&var, "COOKIE_SECURE")?
                .unwrap_or(defaults.cookie_secure),

            admin_role: var("ADMIN_ROLE").map(|role| role.trim().to_string()),
            seed_roles: parse_csv_var(&var, "SEED_ROLES").unwrap_or_default(),

            password_policy: PasswordPolicy {
                min_length: parse_var(&var, "PASSWORD_MIN_LENGTH")?
                    .unwrap_or(policy.min_length),
                require_non_alphanumeric: parse_bool_var(
                    &var,
                    "PASSWORD_REQUIRE_NON_ALPHANUMERIC",
                )?
                .unwrap_or(policy.require_non_alphanumeric),
                require_digit: parse_bool_var(&var, "PASSWORD_REQUIRE_DIGIT")?
                    .unwrap_or(policy.require_digit),
                require_lowercase: parse_bool_var(&var, "PASSWORD_REQUIRE_LOWERCASE")?
                    .unwrap_or(policy.require_lowercase),
                require_uppercase: parse_bool_var(&var, "PASSWORD_REQUIRE_UPPERCASE")?
                    .unwrap_or(policy.require_uppercase),
                required_unique_chars: parse_var(&var, "PASSWORD_REQUIRED_UNIQUE_CHARS")?
                    .unwrap_or(policy.required_unique_chars),
            },
        })
    }

    fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.auth_password_pepper == DEFAULT_PASSWORD_PEPPER {
            warnings.push("AUTH_PASSWORD_PEPPER is using the built-in default".to_string());
        }
        if self.auth_token_key == DEFAULT_TOKEN_KEY {
            warnings.push("AUTH_TOKEN_KEY is using the built-in default".to_string());
        }
        warnings
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn session_lifetime(hours: i64) -> anyhow::Result<Duration> {
    if !(1..=MAX_SESSION_LIFETIME_HOURS).contains(&hours) {
        bail!("SESSION_LIFETIME_HOURS must be between 1 and {MAX_SESSION_LIFETIME_HOURS}, got {hours}");
    }
    Duration::try_hours(hours)
        .with_context(|| format!("SESSION_LIFETIME_HOURS out of range: {hours}"))
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .with_context(|| format!("invalid value for {name}: {raw:?}"))
        })
        .transpose()
}

fn parse_csv_var(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Vec<String>> {
    var(name).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn parse_bool_var(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> anyhow::Result<Option<bool>> {
    var(name)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("invalid value for {name}: {raw:?} (expected true or false)")),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_warn_about_placeholder_secrets() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.session_lifetime, Duration::days(14));
        assert_eq!(config.warnings().len(), 2);
    }

    #[test]
    fn custom_secrets_silence_warnings() {
        let config = Config {
            auth_password_pepper: "pepper".into(),
            auth_token_key: "key".into(),
            ..Config::default()
        };
        assert!(config.warnings().is_empty());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        }
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "  "),
            ("SESSION_LIFETIME_HOURS", "24"),
            ("COOKIE_SECURE", "on"),
            ("ADMIN_ROLE", " Admin "),
            ("SEED_ROLES", "Admin, Editor,,"),
            ("PASSWORD_REQUIRE_DIGIT", "false"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.database_url, None);
        assert_eq!(config.session_lifetime, Duration::hours(24));
        assert!(config.cookie_secure);
        assert_eq!(config.admin_role.as_deref(), Some("Admin"));
        assert_eq!(config.seed_roles, vec!["Admin", "Editor"]);
        assert!(!config.password_policy.require_digit);
        assert!(config.password_policy.require_uppercase);
    }

    #[test]
    fn session_lifetime_outside_bounds_is_rejected() {
        for hours in ["0", "-5", "3000000000", "9223372036854775807"] {
            let err = Config::from_lookup(lookup(&[("SESSION_LIFETIME_HOURS", hours)]))
                .unwrap_err();
            assert!(
                err.to_string().contains("SESSION_LIFETIME_HOURS"),
                "{hours}: {err}"
            );
        }

        let longest = MAX_SESSION_LIFETIME_HOURS.to_string();
        let config =
            Config::from_lookup(lookup(&[("SESSION_LIFETIME_HOURS", longest.as_str())])).unwrap();
        assert_eq!(config.session_lifetime, Duration::hours(MAX_SESSION_LIFETIME_HOURS));
    }

    #[test]
    fn malformed_values_are_errors() {
        for (name, raw) in [
            ("COOKIE_SECURE", "ture"),
            ("PASSWORD_REQUIRE_UPPERCASE", "maybe"),
            ("SERVER_PORT", "eighty"),
        ] {
            let err = Config::from_lookup(lookup(&[(name, raw)])).unwrap_err();
            assert!(err.to_string().contains(name), "{name}: {err}");
        }
    }
}
