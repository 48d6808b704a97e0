use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, ZettelkastenError};
use crate::model::Format;
use crate::vfs::FileSystem;

/// Name of the configuration file looked up in the notes directory
pub const CONFIG_FILE: &str = "zettel.yaml";

/// Version of this build, checked against `min_version`
pub const RUNNING_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level configuration for a zettelkasten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZettelConfig {
    /// Title shown on the index page
    #[serde(default = "default_site_title")]
    pub site_title: String,
    /// Minimum version of the tool this zettelkasten requires
    #[serde(default = "default_min_version")]
    pub min_version: String,
    /// Enabled note formats, in processing order
    #[serde(default = "default_formats")]
    pub formats: Vec<Format>,
    /// Scan subdirectories as well as the top level
    #[serde(default)]
    pub recurse_dir: bool,
    /// Redirects: source identifier -> target identifier
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_site_title() -> String {
    "My Zettelkasten".to_string()
}

fn default_min_version() -> String {
    "0.1".to_string()
}

fn default_formats() -> Vec<Format> {
    vec![Format::Markdown]
}

impl Default for ZettelConfig {
    fn default() -> Self {
        Self {
            site_title: default_site_title(),
            min_version: default_min_version(),
            formats: default_formats(),
            recurse_dir: false,
            aliases: BTreeMap::new(),
        }
    }
}

impl ZettelConfig {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load `zettel.yaml` from the notes directory; a missing file yields defaults.
    pub fn load(root: &Path, fs: &dyn FileSystem) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        match fs.read_bytes(&path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let config = Self::from_yaml(&text)?;
                if config.enabled_formats().len() != config.formats.len() {
                    log::warn!("{} lists a format more than once; repeats are ignored", CONFIG_FILE);
                }
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {} in {:?}, using defaults", CONFIG_FILE, root);
                Ok(Self::default())
            }
            Err(e) => Err(ZettelkastenError::io(path, e)),
        }
    }

    /// Configured formats without repeats, in first-seen order.
    pub fn enabled_formats(&self) -> Vec<Format> {
        let mut formats = Vec::with_capacity(self.formats.len());
        for &format in &self.formats {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    /// Fails when the configured minimum version is newer than `running`.
    pub fn check_version(&self, running: &str) -> Result<()> {
        if compare_versions(&self.min_version, running)? == Ordering::Greater {
            return Err(ZettelkastenError::VersionTooOld {
                required: self.min_version.clone(),
                running: running.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_version(v: &str) -> Result<Vec<u64>> {
    v.trim()
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| ZettelkastenError::InvalidVersion(v.to_string()))
        })
        .collect()
}

/// Compare dotted numeric versions; missing components count as zero.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    let a = parse_version(a)?;
    let b = parse_version(b)?;
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}
