use std::error::Error as StdError;
use std::fmt;

/// A Result alias where the Err case is `cachegate_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised inside the interception engine.
///
/// Most of these never reach the caller of `handle`: strategies absorb
/// network and store failures and fall back to cached or offline responses.
/// Installation failures and configuration problems are the exceptions.
#[derive(Clone)]
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub url: Option<url::Url>,
}

impl Clone for Inner {
    fn clone(&self) -> Self {
        Inner {
            kind: self.kind.clone(),
            source: None, // Cannot clone trait objects, so we lose the source
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// The fetch failed before producing a response
    NetworkUnavailable,
    /// The fetch did not complete before its deadline
    Timeout,
    /// The fetch was cancelled through its abort signal
    Aborted,
    /// The persistent store could not be read or written
    StoreUnavailable,
    /// Bootstrap population failed; the new version never becomes live
    Install,
    /// Invalid or conflicting configuration
    Config,
    /// Request cannot be used as a cache identity
    InvalidRequest,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner { kind, source: None, url: None }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.inner.url = Some(url);
        self
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    /// Get the URL associated with this error, if any
    #[must_use]
    pub fn url(&self) -> Option<&url::Url> {
        self.inner.url.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("cachegate::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref url) = self.inner.url {
            f.field("url", &url.as_str());
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::NetworkUnavailable => f.write_str("network unavailable")?,
            Kind::Timeout => f.write_str("network deadline exceeded")?,
            Kind::Aborted => f.write_str("fetch aborted")?,
            Kind::StoreUnavailable => f.write_str("cache store unavailable")?,
            Kind::Install => f.write_str("installation failed")?,
            Kind::Config => f.write_str("invalid configuration")?,
            Kind::InvalidRequest => f.write_str("request not cacheable by identity")?,
        }

        if let Some(ref url) = self.inner.url {
            write!(f, " for url ({url})")?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
