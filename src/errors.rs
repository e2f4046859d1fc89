//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`BakeError`] covers the failure modes of the
//! streaming-buffer subsystem:
//! - GPU buffer allocation and mapping failures
//! - Fence synchronization stalls
//! - Section capacity violations
//!
//! All public APIs that can fail return [`Result<T>`], an alias for
//! `std::result::Result<T, BakeError>`.
//!
//! Note that an invalid part id is *not* represented here: recording a
//! transform for an id outside the registered range is a programming error
//! and fails fast through debug assertions rather than a runtime error path.

use thiserror::Error;

/// The main error type for the streaming-buffer subsystem.
#[derive(Error, Debug)]
pub enum BakeError {
    // ========================================================================
    // GPU Allocation & Mapping Errors
    // ========================================================================
    /// The driver rejected the streaming buffer allocation. Fatal for this
    /// subsystem: capacities must be chosen so this cannot occur under
    /// normal load, and callers should disable GPU baking entirely when it
    /// does.
    #[error("Failed to allocate GPU streaming buffer `{label}` ({size} bytes): {reason}")]
    BufferAllocationFailed {
        /// Debug label of the buffer being created.
        label: String,
        /// Requested total allocation size in bytes.
        size: u64,
        /// Driver-reported failure description.
        reason: String,
    },

    /// Re-mapping a section's staging memory for host writes failed.
    #[error("Failed to map section {section} of `{label}` for host writes")]
    BufferMapFailed {
        /// Debug label of the ring buffer.
        label: String,
        /// Index of the section being mapped.
        section: u32,
    },

    // ========================================================================
    // Synchronization Errors
    // ========================================================================
    /// The GPU did not signal a section's fence within the bounded wait.
    /// Indicates unrecoverable driver or queue failure, not routine
    /// contention; proceeding would corrupt in-flight GPU reads.
    #[error("GPU fence for section {section} not signaled within {timeout_ms} ms")]
    FenceTimeout {
        /// Index of the section whose fence stalled.
        section: u32,
        /// The bounded wait that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// A section was written without an intervening fence wait.
    #[error("Section {section} written before its previous fence was consumed")]
    SectionNotReady {
        /// Index of the offending section.
        section: u32,
    },

    // ========================================================================
    // Capacity Errors
    // ========================================================================
    /// A write would cross a section boundary.
    #[error("Write of {needed} bytes exceeds section capacity of {capacity} bytes")]
    SectionOverflow {
        /// Bytes the write would occupy, measured from the section start.
        needed: u64,
        /// Fixed byte capacity of one section.
        capacity: u64,
    },
}

/// Alias for `Result<T, BakeError>`.
pub type Result<T> = std::result::Result<T, BakeError>;
