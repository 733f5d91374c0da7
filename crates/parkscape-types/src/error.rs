//! Error types for Parkscape.

/// Errors produced by the Parkscape render pipeline.
///
/// The render path itself never fails; conditions like an off-viewport
/// damage rect or an unknown track kind degrade to silent no-ops. The
/// only fatal error in the core is running out of viewport slots.
#[derive(Debug, thiserror::Error)]
pub enum ParkscapeError {
    #[error("no free viewport slots ({0} in use)")]
    ViewportSlotsExhausted(usize),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ParkscapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_exhausted_display() {
        let e = ParkscapeError::ViewportSlotsExhausted(9);
        assert_eq!(format!("{e}"), "no free viewport slots (9 in use)");
    }

    #[test]
    fn backend_error_display() {
        let e = ParkscapeError::Backend("blit failed".into());
        assert_eq!(format!("{e}"), "backend error: blit failed");
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad).unwrap_err();
        let e: ParkscapeError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn result_alias_ok() {
        let r: Result<i32> = Ok(42);
        assert_eq!(r.unwrap(), 42);
    }
}
