use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into three tiers. Per-entry recoverable conditions (malformed class bytes,
/// name mismatches) are handled inside the recovery pipeline and never surface here. Per-operation
/// reportable conditions are logged with the offending key and processing continues. Only the
/// fatal tier is represented by this enum: container I/O failures and table precondition
/// violations, which indicate a caller-level contract violation rather than bad input data.
///
/// # Examples
///
/// ```rust,ignore
/// use jarscope::{Error, workspace::Resource};
///
/// match resource.read() {
///     Ok(report) => println!("loaded, {} classes recovered", report.patches_recovered),
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed container: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// This error indicates that a class file, dex container, or archive structure is
    /// corrupted beyond what the recovery pipeline is willing to repair. The error includes
    /// the source location where the malformation was detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the input.
    ///
    /// This is a safety check to prevent buffer overruns during class file and
    /// container parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This input type is not supported.
    ///
    /// The container is not a recognized archive, directory, class, or dex input,
    /// or uses features that are not implemented in this library.
    #[error("This input type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or reading the top-level
    /// container, or while writing export output.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Archive structure error from the zip layer.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// A table operation referenced a key that does not exist.
    ///
    /// Returned by [`crate::workspace::VersionedItemTable::rename`] and
    /// [`crate::workspace::VersionedItemTable::history_decrement`] when the source key
    /// is absent. This is a caller contract violation, not bad input data.
    #[error("No entry for key '{0}'")]
    KeyNotFound(String),

    /// A rename target key is already occupied.
    ///
    /// Returned by [`crate::workspace::VersionedItemTable::rename`]; the table is left
    /// unchanged.
    #[error("Key '{0}' is already occupied")]
    KeyOccupied(String),

    /// A long-running operation observed its cancel token and stopped early.
    ///
    /// Raised by phantom synthesis and other background work when the owning task slot
    /// is restarted, e.g. because a new workspace was opened mid-run.
    #[error("Operation was cancelled")]
    Cancelled,

    /// Remote instrumentation agent transport failure.
    ///
    /// Raised when the connection to the remote agent cannot be established or drops
    /// mid-request. Replies of an unexpected type are *not* errors; they are logged and
    /// treated as "no data".
    #[error("Agent transport failure: {0}")]
    Agent(String),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for wrapping external
    /// failures with additional context.
    #[error("{0}")]
    Error(String),
}
