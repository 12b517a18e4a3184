use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, StatusCode};
use serde::Serialize;

/// Broad classification of every failure the crate can surface.
///
/// Callers can branch on this without inspecting message text: `Validation`
/// is a caller bug and should never be retried, while `Exchange` and
/// `Transport` come from the remote side.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Missing or invalid credentials or endpoint configuration.
    Config,
    /// Malformed domain input, rejected before any request is sent.
    Validation,
    /// Network failure, timeout, unsupported method or undecodable body.
    Transport,
    /// The exchange answered with an HTTP status >= 400.
    Exchange,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Config => "config",
            Kind::Validation => "validation",
            Kind::Transport => "transport",
            Kind::Exchange => "exchange",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    pub fn config<S: Into<String>>(reason: S) -> Self {
        Config {
            reason: reason.into(),
        }
        .into()
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Validation {
            reason: reason.into(),
        }
        .into()
    }

    pub fn transport<S: Into<String>>(kind: TransportKind, message: S) -> Self {
        Transport {
            kind,
            message: message.into(),
        }
        .into()
    }

    pub fn exchange<S: Into<String>>(
        status_code: StatusCode,
        code: Option<i64>,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Exchange {
            status_code,
            code,
            method,
            path,
            message: message.into(),
        }
        .into()
    }

    /// The sub-kind of a transport failure, if this is one.
    #[must_use]
    pub fn transport_kind(&self) -> Option<TransportKind> {
        self.downcast_ref::<Transport>().map(|t| t.kind)
    }

    /// Human-facing message without the kind prefix, as recorded in TWAP outcomes.
    #[must_use]
    pub fn message(&self) -> String {
        if let Some(e) = self.downcast_ref::<Exchange>() {
            return e.message.clone();
        }
        if let Some(t) = self.downcast_ref::<Transport>() {
            return t.message.clone();
        }
        if let Some(v) = self.downcast_ref::<Validation>() {
            return v.reason.clone();
        }
        if let Some(c) = self.downcast_ref::<Config>() {
            return c.reason.clone();
        }
        self.source
            .as_deref()
            .map_or_else(|| self.kind.to_string(), ToString::to_string)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{}: {src}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct Config {
    pub reason: String,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.reason)
    }
}

impl StdError for Config {}

#[derive(Debug)]
#[non_exhaustive]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Connection, DNS or TLS failure before a response was received.
    Network,
    /// The request exceeded the configured timeout.
    Timeout,
    /// The HTTP method is not one of GET, POST or DELETE.
    UnsupportedMethod,
    /// A successful response whose body is not valid JSON.
    MalformedResponse,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::Network => "network failure",
            TransportKind::Timeout => "request timed out",
            TransportKind::UnsupportedMethod => "unsupported method",
            TransportKind::MalformedResponse => "malformed response",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct Transport {
    pub kind: TransportKind,
    pub message: String,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Transport {}

/// Remote rejection of a request.
#[derive(Debug)]
#[non_exhaustive]
pub struct Exchange {
    pub status_code: StatusCode,
    /// Exchange-specific error code, e.g. `-1013`.
    pub code: Option<i64>,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {}",
            self.status_code, self.method, self.path
        )?;
        if let Some(code) = self.code {
            write!(f, " [code {code}]")?;
        }
        write!(f, " with {}", self.message)
    }
}

impl StdError for Exchange {}

impl From<Config> for Error {
    fn from(err: Config) -> Self {
        Error::with_source(Kind::Config, err)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<Transport> for Error {
    fn from(err: Transport) -> Self {
        Error::with_source(Kind::Transport, err)
    }
}

impl From<Exchange> for Error {
    fn from(err: Exchange) -> Self {
        Error::with_source(Kind::Exchange, err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else {
            TransportKind::Network
        };
        Error::transport(kind, err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::config(format!("invalid url: {err}"))
    }
}
