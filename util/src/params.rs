//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (GUIDANCE_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "$GUIDANCE_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError> 
where
    P: DeserializeOwned
{
    // Get the params dir
    let mut path = crate::host::get_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>
{
    // Load the file into a string
    let params_str = read_to_string(path)
        .map_err(LoadError::FileLoadError)?;

    from_toml_str(&params_str)
}

/// Parse parameters from a TOML string.
pub fn from_toml_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

/// Load a parameter file, falling back on the default parameters if the file cannot be found or
/// the software root is not set.
///
/// A file which exists but cannot be parsed is still an error, silently ignoring a typo in a
/// parameter file would leave the vehicle running on values nobody asked for.
pub fn load_or_default<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned + Default
{
    match load(param_file_path) {
        Ok(p) => Ok(p),
        Err(LoadError::SwRootNotSet) => {
            warn!(
                "Software root not set, using default parameters for \"{}\"", 
                param_file_path
            );
            Ok(P::default())
        },
        Err(LoadError::FileLoadError(e)) => {
            warn!(
                "Could not load \"{}\" ({}), using default parameters", 
                param_file_path, 
                e
            );
            Ok(P::default())
        },
        Err(e) => Err(e)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct TestParams {
        gain: f64,
        window: usize
    }

    impl Default for TestParams {
        fn default() -> Self {
            Self { gain: 1.0, window: 1 }
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let p: TestParams = from_toml_str("gain = 2.5").unwrap();
        assert_eq!(p, TestParams { gain: 2.5, window: 1 });
    }

    #[test]
    fn test_invalid_toml() {
        let r: Result<TestParams, _> = from_toml_str("gain = ");
        assert!(matches!(r, Err(LoadError::DeserialiseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let r: Result<TestParams, _> = load_from_path("/this/path/does/not/exist.toml");
        assert!(matches!(r, Err(LoadError::FileLoadError(_))));
    }
}
