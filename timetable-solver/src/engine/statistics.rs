use log::debug;

/// Counters describing the work done by an [`Assembler`][crate::Assembler]
/// since its creation.
///
/// Purely informational; the counters never influence the search.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStatistics {
    /// Streams tested against the clash bound during depth-first descents.
    pub num_candidates_tested: u64,
    /// Retreats from a component whose streams were all rejected.
    pub num_backtracks: u64,
    /// Prefix clash totals served from the cache.
    pub num_cache_hits: u64,
    /// Prefix clash totals computed and stored.
    pub num_cache_misses: u64,
    /// Mutations tried by the improvement pass.
    pub num_evolution_iterations: u64,
    /// Times the improvement pass found a strictly better timetable.
    pub num_improvements: u64,
}

impl SearchStatistics {
    pub(crate) fn log(&self) {
        debug!("candidatesTested={}", self.num_candidates_tested);
        debug!("backtracks={}", self.num_backtracks);
        debug!("cacheHits={}", self.num_cache_hits);
        debug!("cacheMisses={}", self.num_cache_misses);
        debug!("evolutionIterations={}", self.num_evolution_iterations);
        debug!("improvements={}", self.num_improvements);
    }
}
