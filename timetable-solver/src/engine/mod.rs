//! The search machinery: depth-first assembly, evolutionary improvement,
//! and the counters describing the work both of them did.
pub(crate) mod evolution;
pub(crate) mod search;
pub(crate) mod statistics;
