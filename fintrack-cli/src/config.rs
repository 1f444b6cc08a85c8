use anyhow::{Context, Result};
use fintrack_ingest::ImportOptions;
use fintrack_ingest::types::DEFAULT_DATE_FORMAT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_categories_path, ensure_fintrack_home, fintrack_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageSection,
    pub import: ImportSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Category dictionary location (default: `<home>/categories.json`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    /// chrono format of the statement's `Date` column
    pub date_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Label printed after amounts; no conversion is ever done
    pub currency: String,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            currency: "AED".to_string(),
        }
    }
}

impl Config {
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            date_format: self.import.date_format.clone(),
        }
    }

    pub fn categories_path(&self) -> Result<PathBuf> {
        match &self.storage.categories_file {
            Some(p) => Ok(p.clone()),
            None => default_categories_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(fintrack_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    ensure_fintrack_home()?;
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
