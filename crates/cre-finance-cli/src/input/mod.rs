pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a calculator input from `--input <file>` or piped stdin.
///
/// Returns `None` when neither is supplied so the caller can fall back to
/// individual flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// As [`load`], for calculators whose input has no flag form.
pub fn require<T: DeserializeOwned>(
    path: Option<&str>,
    calculator: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    load(path)?.ok_or_else(|| format!("--input <file.json> or stdin required for {calculator}").into())
}
