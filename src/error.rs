use core::fmt;

/// Error returned by the pair store and the device cache.
///
/// `E` is the error type of the underlying [`BlobStore`](crate::blob::BlobStore).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The flash blob primitive failed. Never retried.
    Storage(E),
    /// A caller supplied buffer is smaller than the stored data.
    BufferTooSmall { required: usize },
    /// Requested key, singleton record or cursor position does not exist.
    NotFound,
    /// An allocation for a read buffer failed.
    OutOfMemory,
    /// No more pair slots can be addressed.
    StorageFull,
    /// Invalid interface name, path or argument combination.
    InvalidParam,
    /// A stored value record could not be encoded or decoded.
    Encoding,
}

impl<E> From<postcard::Error> for Error<E> {
    fn from(_e: postcard::Error) -> Self {
        Self::Encoding
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Storage(e) => write!(f, "flash storage error: {:?}", e),
            Error::BufferTooSmall { required } => {
                write!(f, "buffer too small, {} bytes required", required)
            }
            Error::NotFound => write!(f, "not found"),
            Error::OutOfMemory => write!(f, "out of memory"),
            Error::StorageFull => write!(f, "pair storage full"),
            Error::InvalidParam => write!(f, "invalid parameter"),
            Error::Encoding => write!(f, "value encoding error"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
