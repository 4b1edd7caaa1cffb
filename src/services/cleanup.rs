//! # Cleanup Sweep
//!
//! Wipes every entry directly inside the Storage Area. Runs at process start,
//! after shutdown and whenever a tool's upload page is opened.
//!
//! The sweep is not coordinated with in-flight requests: a page load can delete
//! a file another client is about to transform or download, which then fails
//! with "not found". Scoping files to per-session subdirectories would remove
//! that race; it is left in place so page loads keep their reset semantics.

use tracing::{debug, error, info, instrument, warn};

use crate::services::storage::Storage;

/// Deletes every entry in the Storage Area.
///
/// Errors are logged and swallowed so a failed sweep never blocks serving.
///
/// # Returns
///
/// A tuple of (deleted_count, error_count).
#[instrument(skip_all)]
pub async fn sweep(storage: &dyn Storage) -> (usize, usize) {
    let names = match storage.list().await {
        Ok(names) => names,
        Err(e) => {
            error!(error = %e, "Failed to list Storage Area during cleanup");
            return (0, 1);
        }
    };

    if names.is_empty() {
        debug!("Storage Area already empty");
        return (0, 0);
    }

    let mut deleted = 0;
    let mut errors = 0;

    for name in names {
        match storage.delete(&name).await {
            Ok(()) => deleted += 1,
            Err(e) => {
                warn!(file = %name, error = %e, "Failed to delete entry during cleanup");
                errors += 1;
            }
        }
    }

    info!(deleted, errors, "Cleanup sweep complete");
    (deleted, errors)
}
