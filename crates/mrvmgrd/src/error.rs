//! Error types for the daemon.

use std::io;
use thiserror::Error;

use mrv_netconf::NetconfError;

/// Result type alias for daemon operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors surfaced at the daemon boundary.
///
/// Transport failures against individual switches are deliberately not
/// here: they are caught at the switch manager boundary, logged with
/// the switch identifier and reported as a boolean, so a flapping
/// device cannot crash the control loop.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Reading the configuration file failed.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        /// The file path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A NETCONF error escaped a context where it is fatal
    /// (currently none in the control loop itself).
    #[error("NETCONF error: {0}")]
    Netconf(#[from] NetconfError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_read_display() {
        let err = DriverError::ConfigRead {
            path: "/etc/mrvmgrd/config.yaml".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("/etc/mrvmgrd/config.yaml"));
    }
}
