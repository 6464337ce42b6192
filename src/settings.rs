use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

use crate::category::{Category, MatchMode};
use crate::error::Result;
use crate::sql_script::DEFAULT_BATCH_SIZE;

pub const DEFAULT_SQL_PATH: &str = "companies_from_pdfs.sql";
pub const SETTINGS_FILE: &str = "echowork_seed";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub sql_path: PathBuf,
    pub pdf_dir: PathBuf,
    pub batch_size: usize,
    pub default_category: u8,
    pub match_mode: MatchMode,
}

impl Settings {
    /// Built-in defaults, overlaid by `echowork_seed.toml` in the working
    /// directory when present, or by `explicit` (which must exist).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => File::from(path).required(true),
            None => File::with_name(SETTINGS_FILE).required(false),
        };
        let settings = Config::builder()
            .set_default("sql_path", DEFAULT_SQL_PATH)?
            .set_default("pdf_dir", ".")?
            .set_default("batch_size", DEFAULT_BATCH_SIZE as i64)?
            .set_default("default_category", Category::Banking.id() as i64)?
            .set_default("match_mode", "whole-word")?
            .add_source(file)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn default_category(&self) -> Category {
        Category::from_id(self.default_category).unwrap_or(Category::Banking)
    }
}
