use gendef_lang::generator::OutputOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings read from a `gendef.toml` file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub output: Option<PathBuf>,
    pub remove_partial_output: Option<bool>,
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(p: P) -> Result<Self, ConfigError> {
        let path = p.as_ref();
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        s.parse().map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn output_options(&self) -> OutputOptions {
        let mut opts = OutputOptions::new();
        if let Some(p) = &self.output {
            opts.path(p);
        }
        if let Some(remove) = self.remove_partial_output {
            opts.remove_on_failure(remove);
        }
        opts
    }
}
