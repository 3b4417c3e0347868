//! # Environment Variables
//!
//! Utilities for reading and parsing environment variables.

use std::env;
use std::str::FromStr;

/// Get an environment variable by name.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Get an environment variable, falling back to `default` when unset.
pub fn get_env_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable.
pub fn get_env_parse<T: FromStr>(name: &'static str) -> Result<T, Error> {
    let val = get_env(name)?;
    val.trim().parse::<T>().map_err(|_| Error::WrongFormat(name))
}

/// Read a boolean flag. Unset yields `default`; `1/true/yes/on` and
/// `0/false/no/off` are accepted in any case.
pub fn get_env_bool(name: &'static str, default: bool) -> Result<bool, Error> {
    let Ok(val) = env::var(name) else {
        return Ok(default);
    };

    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::WrongFormat(name)),
    }
}

/// Read a comma-separated list, dropping empty items.
pub fn get_env_list(name: &'static str) -> Option<Vec<String>> {
    let val = env::var(name).ok()?;
    let items: Vec<String> = val
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    (!items.is_empty()).then_some(items)
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    MissingEnv(&'static str),
    WrongFormat(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MissingEnv(name) => write!(fmt, "{name} must be set in environment"),
            Error::WrongFormat(name) => write!(fmt, "{name} has an invalid format"),
        }
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_bool_default_when_unset() {
        assert!(get_env_bool("LIB_UTILS_TEST_UNSET_FLAG", true).unwrap());
        assert!(!get_env_bool("LIB_UTILS_TEST_UNSET_FLAG", false).unwrap());
    }

    #[test]
    fn test_get_env_list_splits_and_trims() {
        env::set_var("LIB_UTILS_TEST_LIST", " a, b ,,c ");
        assert_eq!(
            get_env_list("LIB_UTILS_TEST_LIST"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        env::remove_var("LIB_UTILS_TEST_LIST");
    }

    #[test]
    fn test_get_env_parse_wrong_format() {
        env::set_var("LIB_UTILS_TEST_NUMBER", "abc");
        let err = get_env_parse::<u64>("LIB_UTILS_TEST_NUMBER").unwrap_err();
        assert!(matches!(err, Error::WrongFormat("LIB_UTILS_TEST_NUMBER")));
        env::remove_var("LIB_UTILS_TEST_NUMBER");
    }
}
// endregion: --- Tests
