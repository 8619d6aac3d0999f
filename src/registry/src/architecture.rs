//! Supported CPU architectures of a manifest document.

use std::collections::BTreeSet;

use crate::manifest::{ManifestDocument, ManifestKind};

/// Architectures a manifest or index supports, deduplicated and sorted.
///
/// Index entries without a platform or architecture are skipped. Unknown
/// media types yield an empty list.
pub fn extract_architectures(document: &ManifestDocument) -> Vec<String> {
    let architectures: BTreeSet<&str> = match document.kind() {
        ManifestKind::Index(entries) => entries
            .iter()
            .filter_map(|entry| entry.platform.as_ref())
            .filter_map(|platform| platform.architecture.as_deref())
            .filter(|arch| !arch.is_empty())
            .collect(),
        ManifestKind::Image(architecture) => {
            architecture.into_iter().filter(|arch| !arch.is_empty()).collect()
        }
        ManifestKind::Unknown => BTreeSet::new(),
    };

    architectures.into_iter().map(str::to_string).collect()
}
