use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("ledger.root_fs_path must not be empty")]
    EmptyRootPath,

    #[error("ledger.root_fs_path '{path}' exists and is not a directory")]
    RootPathNotDirectory { path: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_ledger(config)?;
    Ok(())
}

fn validate_ledger(config: &Config) -> Result<(), ValidationError> {
    let root = &config.ledger.root_fs_path;

    if root.as_os_str().is_empty() {
        return Err(ValidationError::EmptyRootPath);
    }

    if root.exists() && !root.is_dir() {
        return Err(ValidationError::RootPathNotDirectory {
            path: root.display().to_string(),
        });
    }

    Ok(())
}
