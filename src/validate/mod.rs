/// Input validation helpers shared by the CLI boundary and installers
use crate::error::{Error, Result};
use crate::platform;

/// Parse a boolean token, accepting only case-insensitive "true"/"false"
pub fn parse_boolean(token: &str) -> Result<bool> {
    if token.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if token.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::InvalidArgument(format!(
            "expected 'true' or 'false', got '{}'",
            token
        )))
    }
}

/// Require that every named environment variable is set and non-empty
#[allow(dead_code)]
pub fn require_env(names: &[&str]) -> Result<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| match std::env::var(name) {
            Ok(value) => value.is_empty(),
            Err(_) => true,
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "required environment variables not set: {}",
            missing.join(", ")
        )))
    }
}

/// Require that every named executable resolves on the search path
pub fn require_binaries(names: &[&str]) -> Result<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| !platform::is_installed(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingDependency(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_boolean_accepts_any_case() {
        assert!(parse_boolean("true").unwrap());
        assert!(parse_boolean("True").unwrap());
        assert!(parse_boolean("TRUE").unwrap());
        assert!(!parse_boolean("false").unwrap());
        assert!(!parse_boolean("False").unwrap());
        assert!(!parse_boolean("FALSE").unwrap());
    }

    #[test]
    fn test_parse_boolean_rejects_everything_else() {
        for token in ["yes", "no", "1", "0", "", " true", "truthy"] {
            let err = parse_boolean(token).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", token);
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    #[serial]
    fn test_require_env_reports_all_missing() {
        std::env::set_var("OUTFITTER_TEST_SET", "value");
        std::env::set_var("OUTFITTER_TEST_EMPTY", "");
        std::env::remove_var("OUTFITTER_TEST_UNSET");

        assert!(require_env(&["OUTFITTER_TEST_SET"]).is_ok());

        let err = require_env(&[
            "OUTFITTER_TEST_SET",
            "OUTFITTER_TEST_EMPTY",
            "OUTFITTER_TEST_UNSET",
        ])
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("OUTFITTER_TEST_EMPTY"));
        assert!(message.contains("OUTFITTER_TEST_UNSET"));
        assert!(!message.contains("OUTFITTER_TEST_SET"));

        std::env::remove_var("OUTFITTER_TEST_SET");
        std::env::remove_var("OUTFITTER_TEST_EMPTY");
    }

    #[test]
    #[serial]
    fn test_require_binaries() {
        assert!(require_binaries(&["sh"]).is_ok());

        let err = require_binaries(&["sh", "definitely-not-a-real-binary-name"]).unwrap_err();
        assert!(matches!(err, Error::MissingDependency(_)));
        assert!(err
            .to_string()
            .contains("definitely-not-a-real-binary-name"));
    }
}
