/// Parameter store loading and saving
use cal_core::{CalError, Result, SessionParams};
use std::path::{Path, PathBuf};

/// File used when no `--config` is given
pub const DEFAULT_PARAMS_FILE: &str = "presenter.toml";

/// Environment prefix for overrides (`CAL_DESIRED_LEVEL_DB=60`)
pub const ENV_PREFIX: &str = "CAL";

/// Path the store is read from and written back to
pub fn params_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(DEFAULT_PARAMS_FILE), Path::to_path_buf)
}

/// Load the parameter store
///
/// Layers, lowest first: built-in defaults, the parameter file, `CAL_*`
/// environment variables. A missing default file is fine; a missing file
/// named explicitly is not.
pub fn load_params(explicit: Option<&Path>) -> Result<SessionParams> {
    let path = params_path(explicit);
    let mut settings = config::Config::builder();

    if path.exists() {
        settings = settings.add_source(config::File::from(path.as_path()));
    } else if explicit.is_some() {
        return Err(CalError::config(format!(
            "parameter file {} does not exist",
            path.display()
        )));
    }

    // Override with environment variables (prefixed with CAL_)
    settings = settings.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    let config = settings
        .build()
        .map_err(|e| CalError::config(e.to_string()))?;

    let params: SessionParams = config
        .try_deserialize()
        .map_err(|e| CalError::config(e.to_string()))?;

    params.validate()?;
    Ok(params)
}

/// Write the parameter store back as TOML
pub fn save_params(path: &Path, params: &SessionParams) -> Result<()> {
    let text = toml::to_string_pretty(params).map_err(|e| CalError::config(e.to_string()))?;
    std::fs::write(path, text)?;
    tracing::debug!("Saved parameters to {}", path.display());
    Ok(())
}
