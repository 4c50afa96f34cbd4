use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

/// Hex fingerprint over ordered configuration parts.
///
/// Part boundaries are hashed too, so `["ab", "c"]` and `["a", "bc"]` differ.
/// Stable for a given toolchain; manifests written by another build may not
/// match and are then treated as stale.
pub fn fingerprint<I, S>(version: u8, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let hash = stable_hash_with(|hasher| {
        version.hash(hasher);
        for part in parts {
            part.as_ref().hash(hasher);
        }
    });
    format!("{hash:016x}")
}
