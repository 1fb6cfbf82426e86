use arch::word::MEMORY_BASE;
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use crate::error::Error;

/// Longest accepted source line, in characters.
pub const MAX_LINE_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address of the first object word.
    pub base: u32,
    pub max_line_len: usize,
    /// Legacy symbol semantics: first definition wins, undefined labels
    /// resolve to -1, unresolved entries are dropped. All reported as warnings.
    pub compat: bool,
    /// Where `.am/.ob/.ent/.ext` files go; next to the source when unset.
    pub out_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base: MEMORY_BASE,
            max_line_len: MAX_LINE_LEN,
            compat: false,
            out_dir: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, Error> {
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::FileOpen(name.clone(), e))?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|e| Error::Config(name, e))
    }

    pub fn from_yaml(text: &str) -> Result<Config, Error> {
        serde_yaml::from_str(text).map_err(|e| Error::Config("<inline>".to_string(), e))
    }
}
