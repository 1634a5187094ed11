//! Depth-first assembly of a feasible timetable.
//!
//! Components are decided in their fixed input order, one stream per
//! component, with chronological backtracking. A partial assignment is
//! pruned as soon as its running clash total exceeds the configured bound;
//! the total only grows as more components commit, so no feasible extension
//! is ever discarded. With fixed component and stream orders the first
//! timetable found is the same on every run over the same input.

use log::debug;

use crate::clash::ClashTable;
use crate::containers::PrefixCache;
use crate::containers::TERMINATOR;
use crate::engine::statistics::SearchStatistics;
use crate::model::Problem;
use crate::timetable_assert_eq_simple;
use crate::timetable_assert_extreme;
use crate::timetable_assert_simple;

/// The phase the search is in, per the component depth being worked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    /// Deciding which stream to commit for the component at this depth.
    Exploring(usize),
    /// Every remaining stream at this depth broke the clash bound; retreat.
    Backtrack(usize),
    /// A stream is committed for every component.
    Found,
    /// Backtracked past the first component: no assignment fits the bound.
    Exhausted,
}

/// The result of one depth-first descent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SearchOutcome {
    /// The first feasible assignment in scan order, with its clash total.
    Found { choices: Vec<usize>, clashes: u32 },
    /// No assignment satisfies the clash bound. This is an ordinary result,
    /// not an error; relaxing the bound and retrying is the caller's call.
    Exhausted,
}

/// One configured depth-first search over a problem's choice space.
#[derive(Debug)]
pub(crate) struct DepthFirstSearch<'a> {
    problem: &'a Problem,
    clash_table: &'a ClashTable,
    max_clashes: u32,
}

impl<'a> DepthFirstSearch<'a> {
    pub(crate) fn new(
        problem: &'a Problem,
        clash_table: &'a ClashTable,
        max_clashes: u32,
    ) -> DepthFirstSearch<'a> {
        DepthFirstSearch {
            problem,
            clash_table,
            max_clashes,
        }
    }

    /// Run the search to completion.
    ///
    /// Prefix clash totals are looked up in (and added to) `cache`; entries
    /// stay valid for as long as the problem itself is unchanged, so a warm
    /// cache from an earlier run over the same problem is fine.
    pub(crate) fn run(
        &self,
        cache: &mut PrefixCache<u32>,
        statistics: &mut SearchStatistics,
    ) -> SearchOutcome {
        let num_components = self.problem.num_components();
        let mut choices: Vec<usize> = Vec::with_capacity(num_components);
        let mut totals: Vec<u32> = Vec::with_capacity(num_components);
        // Where to resume the stream scan at each depth: reset to zero when
        // a depth is entered by advancing, one past the abandoned choice
        // when re-entered by backtracking.
        let mut resume = vec![0; num_components];

        let mut state = if num_components == 0 {
            SearchState::Found
        } else {
            SearchState::Exploring(0)
        };

        loop {
            match state {
                SearchState::Exploring(depth) => {
                    timetable_assert_eq_simple!(choices.len(), depth);

                    match self.pick_stream(depth, resume[depth], &mut choices, &totals, cache, statistics)
                    {
                        Some((stream, total)) => {
                            choices.push(stream);
                            totals.push(total);

                            if depth + 1 == num_components {
                                state = SearchState::Found;
                            } else {
                                resume[depth + 1] = 0;
                                state = SearchState::Exploring(depth + 1);
                            }
                        }
                        None => state = SearchState::Backtrack(depth),
                    }
                }
                SearchState::Backtrack(depth) => {
                    statistics.num_backtracks += 1;

                    if depth == 0 {
                        state = SearchState::Exhausted;
                    } else {
                        let abandoned = choices
                            .pop()
                            .expect("backtracking above depth 0 implies a committed choice");
                        let _ = totals.pop();
                        resume[depth - 1] = abandoned + 1;
                        state = SearchState::Exploring(depth - 1);
                    }
                }
                SearchState::Found => {
                    let clashes = totals.last().copied().unwrap_or(0);
                    debug!("assembled a timetable with {clashes} clashes");
                    return SearchOutcome::Found { choices, clashes };
                }
                SearchState::Exhausted => {
                    debug!(
                        "no timetable satisfies the clash bound {}",
                        self.max_clashes
                    );
                    return SearchOutcome::Exhausted;
                }
            }
        }
    }

    /// Scan the streams of the component at `depth` in order, starting from
    /// `first`, and return the first whose committed total stays within the
    /// bound, together with that total.
    fn pick_stream(
        &self,
        depth: usize,
        first: usize,
        choices: &mut Vec<usize>,
        totals: &[u32],
        cache: &mut PrefixCache<u32>,
        statistics: &mut SearchStatistics,
    ) -> Option<(usize, u32)> {
        let running = totals.last().copied().unwrap_or(0);
        let num_streams = self.problem.components()[depth].streams().len();

        for candidate in first..num_streams {
            statistics.num_candidates_tested += 1;

            let total = self.committed_total(depth, candidate, choices, running, cache, statistics);
            timetable_assert_simple!(
                total >= running,
                "the running clash total must never decrease"
            );

            if total <= self.max_clashes {
                return Some((candidate, total));
            }
        }

        None
    }

    /// The clash total of the partial assignment `choices + [candidate]`,
    /// served from the cache when this exact prefix has been costed before.
    ///
    /// Totals are keyed at `prefix + [TERMINATOR]` so that each prefix's
    /// entry survives the entries stored for its extensions.
    fn committed_total(
        &self,
        depth: usize,
        candidate: usize,
        choices: &mut Vec<usize>,
        running: u32,
        cache: &mut PrefixCache<u32>,
        statistics: &mut SearchStatistics,
    ) -> u32 {
        choices.push(candidate);
        choices.push(TERMINATOR);

        let total = match cache.get(choices).copied() {
            Some(total) => {
                statistics.num_cache_hits += 1;
                total
            }
            None => {
                statistics.num_cache_misses += 1;
                let total = running + self.added_clashes(depth, candidate, &choices[..depth]);
                cache.set(choices, total);
                total
            }
        };

        timetable_assert_extreme!(
            total == running + self.added_clashes(depth, candidate, &choices[..depth]),
            "memoized clash total diverged from recomputation"
        );

        let _ = choices.pop();
        let _ = choices.pop();
        total
    }

    /// The clashes `candidate` adds against all committed streams.
    fn added_clashes(&self, depth: usize, candidate: usize, committed: &[usize]) -> u32 {
        let global = self.problem.global_stream_index(depth, candidate);

        committed
            .iter()
            .enumerate()
            .map(|(component, &choice)| {
                self.clash_table
                    .between(self.problem.global_stream_index(component, choice), global)
            })
            .sum()
    }
}
