//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// User-facing render options consumed by the viewport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Newly created viewports start with the gridline overlay on.
    pub always_show_gridlines: bool,
    /// Show height markers in raw map units instead of a measurement format.
    pub show_height_as_units: bool,
    /// Use feet rather than metres for height markers.
    pub imperial_heights: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            always_show_gridlines: false,
            show_height_as_units: true,
            imperial_heights: false,
        }
    }
}

impl RenderConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// String-table offset for height marker labels: raw units, feet, or
    /// metres, each a block of 256 strings.
    pub fn height_marker_offset(&self) -> u32 {
        if self.show_height_as_units {
            0
        } else if self.imperial_heights {
            256
        } else {
            512
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RenderConfig::default();
        assert!(!c.always_show_gridlines);
        assert_eq!(c.height_marker_offset(), 0);
    }

    #[test]
    fn from_toml_partial() {
        let c = RenderConfig::from_toml("always_show_gridlines = true\n").unwrap();
        assert!(c.always_show_gridlines);
        assert!(c.show_height_as_units);
    }

    #[test]
    fn from_toml_invalid_is_error() {
        assert!(RenderConfig::from_toml("always_show_gridlines = [[[").is_err());
    }

    #[test]
    fn height_marker_offsets() {
        let mut c = RenderConfig::default();
        c.show_height_as_units = false;
        c.imperial_heights = true;
        assert_eq!(c.height_marker_offset(), 256);
        c.imperial_heights = false;
        assert_eq!(c.height_marker_offset(), 512);
    }
}
