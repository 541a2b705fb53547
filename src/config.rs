// Parser options, loadable from a RON file the way the teacher's settings
// module loads its (much larger) app configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// When set, `parse` returns the raw container tree as debug output on
    /// the debug channel and an empty `Blocks` instead of running the
    /// transformer.
    pub debug: bool,
    pub allow_raw_html: bool,
    pub sanitize: bool,
    pub preserve_hard_breaks: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            debug: false,
            allow_raw_html: true,
            sanitize: false,
            preserve_hard_breaks: false,
        }
    }
}

impl ParserOptions {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading parser options from {}", path.display()))?;
        let options: ParserOptions = ron::de::from_str(&contents)
            .with_context(|| format!("parsing parser options from {}", path.display()))?;
        log::debug!("Loaded parser options from {}", path.display());
        Ok(options)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let serialized = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("serializing parser options")?;
        fs::write(path, serialized)
            .with_context(|| format!("writing parser options to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_default_options() {
        let options = ParserOptions::default();
        assert!(!options.debug);
        assert!(!options.sanitize);
    }

    #[test]
    fn smoke_test_roundtrip_through_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.ron");
        let options = ParserOptions {
            debug: true,
            allow_raw_html: false,
            sanitize: true,
            preserve_hard_breaks: true,
        };
        options.save_to_file(&path).unwrap();
        let loaded = ParserOptions::load_from_file(&path).unwrap();
        assert_eq!(options, loaded);
    }
}
