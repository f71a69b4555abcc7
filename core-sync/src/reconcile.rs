//! Local versus remote comparison.
//!
//! Files are matched by base name only. A local file whose name already
//! exists in the target directory is skipped even if the content differs,
//! and two local files sharing a name map to the same remote file.

use core_discovery::LocalFileRef;
use provider_webdav::RemoteInventory;

/// Local files whose base name is not in `remote`, in their original order.
pub fn pending_uploads(local: &[LocalFileRef], remote: &RemoteInventory) -> Vec<LocalFileRef> {
    local
        .iter()
        .filter(|file| !remote.contains(file.base_name()))
        .cloned()
        .collect()
}
