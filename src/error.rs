/*!
error module defines the error types used in bgpkit-originas.
*/
use oneio::OneIoError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OriginAsError {
    /// A dump source or AS name directory could not be opened, or the decompressor could not be
    /// set up for it.
    ///
    /// ## Occurs during:
    ///  - Opening a routing table dump (plain or `.gz`)
    ///  - Opening the AS name directory
    #[error("cannot open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: OneIoError,
    },
    /// Reading from an already opened source failed, e.g. a truncated or corrupt gzip stream.
    ///
    /// ## Occurs during:
    ///  - Reading lines of a routing table dump or the AS name directory
    #[error("cannot read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: io::Error,
    },
    /// A general IO error triggered by a reader or writer that is not tied to a named source.
    #[error(transparent)]
    IoError(#[from] io::Error),
    /// This error represents a [ipnet::PrefixLenError] error. It occurs if an address mask is
    /// larger than the length of the address it is being applied to.
    #[error("invalid network prefix mask")]
    InvalidPrefixLength(#[from] ipnet::PrefixLenError),
    /// Address text that cannot be turned into an address range.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
    /// AS number text that is neither plain decimal nor `hi.lo` dotted notation.
    #[error("invalid AS number: {0}")]
    InvalidAsn(String),
    /// A field selector list entry that is not a positive 1-based index.
    #[error("invalid field selector: {0}")]
    InvalidFieldSelector(String),
}

impl OriginAsError {
    pub(crate) fn open_failed(path: &str, source: OneIoError) -> Self {
        OriginAsError::OpenFailed {
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn read_failed(path: &str, source: io::Error) -> Self {
        OriginAsError::ReadFailed {
            path: path.to_string(),
            source,
        }
    }
}
