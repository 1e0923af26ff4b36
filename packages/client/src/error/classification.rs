use std::error::Error as StdError;
use std::io;

use super::helpers::TimedOut;
use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        if matches!(self.inner.kind, Kind::Timeout) {
            return true;
        }

        let mut source = self.source();

        while let Some(err) = source {
            if err.is::<TimedOut>() {
                return true;
            }
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if io.kind() == io::ErrorKind::TimedOut {
                    return true;
                }
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the fetch never produced a response.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::NetworkUnavailable | Kind::Timeout | Kind::Aborted
        )
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self.inner.kind, Kind::Aborted)
    }

    /// Returns true if the persistent store failed.
    #[must_use]
    pub fn is_store(&self) -> bool {
        matches!(self.inner.kind, Kind::StoreUnavailable)
    }

    #[must_use]
    pub fn is_install(&self) -> bool {
        matches!(self.inner.kind, Kind::Install)
    }

    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self.inner.kind, Kind::Config)
    }
}
