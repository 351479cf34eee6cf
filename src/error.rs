use zbus::fdo;

/// Top-level process error: anything that can abort startup or the event loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("D-Bus error: {0}")]
    Zbus(#[from] zbus::Error),

    #[error("D-Bus fdo error: {0}")]
    Fdo(#[from] fdo::Error),

    #[error("netlink error: {0}")]
    Rtnetlink(#[from] rtnetlink::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The two error kinds the object-manager surface exposes to clients (§7).
///
/// `TransportError` is never constructed here — the transport rejects
/// malformed paths/variants before a handler runs — but the variant exists
/// so call sites that need to round-trip it through `zbus::fdo::Error` have
/// somewhere to land.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LoomError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    TransportError(String),
}

impl LoomError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LoomError::InvalidArgument(msg.into())
    }
}

impl From<LoomError> for fdo::Error {
    fn from(e: LoomError) -> Self {
        match e {
            LoomError::InvalidArgument(msg) => fdo::Error::InvalidArgs(msg),
            LoomError::TransportError(msg) => fdo::Error::InvalidArgs(msg),
        }
    }
}
