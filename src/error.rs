//! Unified error type for thermofan.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// Option-byte erase/program sequence failed.
    Storage(StorageError),

    // UI / Display
    /// Transaction to the display failed.
    Display,
}

/// Failures of the option-byte save sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The busy flag never cleared within the poll budget.
    Timeout,
    /// A word read back after programming differs from what was written.
    Verify {
        /// Index of the first mismatching word.
        word: usize,
    },
}

// Convenience conversions

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}
