//! Flag combination checks.

use crate::config::HttpOptions;
use crate::error_handling::ValidationError;

impl HttpOptions {
    /// Rejects flag combinations that cannot be honored.
    ///
    /// - `data` and `data_file` are mutually exclusive
    /// - `client_cert` and `client_key` are required together
    ///
    /// Runs before any other validation and before any file is opened.
    pub fn check_preconditions(&self) -> Result<(), ValidationError> {
        if self.data.is_some() && self.data_file.is_some() {
            return Err(ValidationError::ConfigConflict(
                "flags --data and --data-file are mutually exclusive".to_string(),
            ));
        }

        match (&self.tls.client_cert, &self.tls.client_key) {
            (Some(_), None) => Err(ValidationError::ConfigConflict(
                "flag --cert requires --key to be set as well".to_string(),
            )),
            (None, Some(_)) => Err(ValidationError::ConfigConflict(
                "flag --key requires --cert to be set as well".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
