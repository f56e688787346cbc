//! Deployment configuration of the protocol components, read from TOML.
//!
//! ```toml
//! [logging]
//! env-filter = "info,arbitration=debug"
//!
//! [pool]
//! name = "test lp"
//! symbol = "TESTLP"
//! fee = 0.02
//! curve = "spot-price"
//!
//! [[wrapper]]
//! name = "wrapper test"
//! symbol = "TEST"
//!
//! [router]
//! min-out-percent = 50
//! max-out-percent = 100
//! ```

use {
    anyhow::{Context, Result, ensure},
    serde::Deserialize,
    std::path::Path,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub pool: Pool,
    #[serde(default, rename = "wrapper")]
    pub wrappers: Vec<Wrapper>,
    #[serde(default)]
    pub router: Router,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Logging {
    #[serde(default = "default_env_filter")]
    pub env_filter: String,
    /// Events at or above this level are written to stderr instead of
    /// stdout.
    #[serde(default)]
    pub stderr_threshold: Option<String>,
    #[serde(default)]
    pub use_json_format: bool,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            env_filter: default_env_filter(),
            stderr_threshold: None,
            use_json_format: false,
        }
    }
}

impl Logging {
    pub fn to_observe(&self) -> Result<observe::Config> {
        let stderr_threshold = self
            .stderr_threshold
            .as_deref()
            .map(str::parse::<tracing::Level>)
            .transpose()
            .context("invalid stderr-threshold")?;
        Ok(observe::Config::new(
            &self.env_filter,
            stderr_threshold,
            self.use_json_format,
        ))
    }
}

fn default_env_filter() -> String {
    "info".to_string()
}

/// Parameters of a liquidity pool deployment.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Pool {
    #[serde(default = "default_pool_name")]
    pub name: String,
    #[serde(default = "default_pool_symbol")]
    pub symbol: String,
    /// Swap fee as a fraction in `[0, 1]`.
    #[serde(default = "default_fee")]
    pub fee: f64,
    #[serde(default)]
    pub curve: Curve,
}

impl Default for Pool {
    fn default() -> Self {
        Self {
            name: default_pool_name(),
            symbol: default_pool_symbol(),
            fee: default_fee(),
            curve: Curve::default(),
        }
    }
}

fn default_pool_name() -> String {
    "liquidity pool".to_string()
}

fn default_pool_symbol() -> String {
    "LP".to_string()
}

fn default_fee() -> f64 {
    0.003
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Curve {
    #[default]
    ConstantProduct,
    SpotPrice,
    DiscountedSpot,
}

/// Parameters of a wrapped asset deployment.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Wrapper {
    pub name: String,
    pub symbol: String,
}

/// Default price bounds of the swap router, in percent of the oracle implied
/// output.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Router {
    pub min_out_percent: u32,
    pub max_out_percent: u32,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            min_out_percent: 95,
            max_out_percent: 105,
        }
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.pool.fee.is_finite() && (0.0..=1.0).contains(&self.pool.fee),
            "pool fee {} is not a fraction in [0, 1]",
            self.pool.fee
        );
        ensure!(
            self.router.min_out_percent <= self.router.max_out_percent,
            "router min-out-percent {} exceeds max-out-percent {}",
            self.router.min_out_percent,
            self.router.max_out_percent
        );
        Ok(())
    }
}

/// Parses and validates a configuration.
pub fn from_str(data: &str) -> Result<Config> {
    let config: Config = toml::from_str(data).context("invalid configuration")?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration from a TOML file.
pub fn load(path: &Path) -> Result<Config> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    let config = from_str(&data).with_context(|| format!("while loading {path:?}"))?;
    tracing::debug!(?path, ?config, "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn empty_config_uses_defaults() {
        let config = from_str("").unwrap();
        assert_eq!(config.pool.curve, Curve::ConstantProduct);
        assert_eq!(config.pool.fee, 0.003);
        assert!(config.wrappers.is_empty());
        assert_eq!(config.router, Router::default());
        assert_eq!(config.logging.env_filter, "info");
    }

    #[test]
    fn parses_full_config() {
        let config = from_str(
            r#"
            [logging]
            env-filter = "warn"
            stderr-threshold = "warn"
            use-json-format = true

            [pool]
            name = "test lp"
            symbol = "TESTLP"
            fee = 0.02
            curve = "spot-price"

            [[wrapper]]
            name = "foo"
            symbol = "BAR"

            [[wrapper]]
            name = "wrapper test"
            symbol = "TEST"

            [router]
            min-out-percent = 50
            max-out-percent = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.pool.name, "test lp");
        assert_eq!(config.pool.fee, 0.02);
        assert_eq!(config.pool.curve, Curve::SpotPrice);
        assert_eq!(config.wrappers.len(), 2);
        assert_eq!(config.wrappers[1].symbol, "TEST");
        assert_eq!(
            config.router,
            Router {
                min_out_percent: 50,
                max_out_percent: 100,
            }
        );
        let observe = config.logging.to_observe().unwrap();
        assert_eq!(observe.env_filter(), "warn");
    }

    #[test]
    fn parses_curves() {
        for (name, curve) in [
            ("constant-product", Curve::ConstantProduct),
            ("spot-price", Curve::SpotPrice),
            ("discounted-spot", Curve::DiscountedSpot),
        ] {
            let config = from_str(&format!("[pool]\ncurve = \"{name}\"")).unwrap();
            assert_eq!(config.pool.curve, curve);
        }
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(from_str("[pool]\nfee = 1.5").is_err());
        assert!(from_str("[pool]\nfee = -0.1").is_err());
        assert!(from_str("[router]\nmin-out-percent = 10\nmax-out-percent = 5").is_err());
        assert!(from_str("[pool]\nunknown = 1").is_err());
        assert!(from_str("[pool]\ncurve = \"stable\"").is_err());

        let config = from_str("[logging]\nstderr-threshold = \"loud\"").unwrap();
        assert!(config.logging.to_observe().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pool]\nfee = 0.01").unwrap();
        let config = load(file.path()).unwrap();
        assert_eq!(config.pool.fee, 0.01);

        assert!(load(Path::new("/does/not/exist.toml")).is_err());
    }
}
