//! Contains containers which are used by the engine.
mod prefix_cache;

use fnv::FnvBuildHasher;
pub use prefix_cache::PrefixCache;
pub(crate) use prefix_cache::TERMINATOR;

/// [`std::collections::HashMap`] that defaults to a deterministic hasher.
pub type HashMap<K, V, Hasher = FnvBuildHasher> = std::collections::HashMap<K, V, Hasher>;
