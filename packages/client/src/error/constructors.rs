use super::types::{Error, Kind};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for a fetch that failed without a response.
pub fn network<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::NetworkUnavailable).with(e.into())
}

/// Creates an `Error` for a fetch that missed its deadline.
pub fn timeout(url: url::Url) -> Error {
    Error::new(Kind::Timeout)
        .with(super::helpers::TimedOut)
        .with_url(url)
}

/// Creates an `Error` for a fetch cancelled through its abort signal.
pub fn aborted(url: url::Url) -> Error {
    Error::new(Kind::Aborted)
        .with(super::helpers::OperationCanceled)
        .with_url(url)
}

/// Creates an `Error` for a failed store read or write.
pub fn store<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::StoreUnavailable).with(e.into())
}

/// Creates an `Error` for an aborted installation.
pub fn install<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Install).with(e.into())
}

pub fn configuration<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Config).with(e.into())
}

pub fn invalid_request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidRequest).with(e.into())
}
