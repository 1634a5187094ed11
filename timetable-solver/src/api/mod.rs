//! The public entry point of the engine.
//!
//! External collaborators hand a validated [`Problem`] to an [`Assembler`]
//! and receive either a timetable or the verdict that none exists under the
//! configured clash bound. Everything else (where course data comes from,
//! where chosen timetables go, how they are rendered) lives outside this
//! crate.

use log::debug;
use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::basic_types::Assignment;
use crate::clash::ClashTable;
use crate::containers::PrefixCache;
use crate::engine::evolution;
use crate::engine::evolution::Candidate;
use crate::engine::search::DepthFirstSearch;
use crate::engine::search::SearchOutcome;
use crate::model::Problem;
use crate::scoring::ScoreWeights;
use crate::scoring::Scorer;
use crate::termination::TerminationCondition;
use crate::timetable_assert_eq_simple;

pub use crate::engine::evolution::EvolutionConfig;
pub use crate::engine::statistics::SearchStatistics;

/// Options controlling one assembly run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    /// Upper bound on the number of clashing session pairs a timetable may
    /// contain. The default of zero tolerates no conflicts; callers are
    /// free to relax it (for example after an [`AssemblyResult::Exhausted`]).
    pub max_clashes: u32,
    /// Weights of the scoring features.
    pub weights: ScoreWeights,
    /// Configuration of the evolutionary improvement pass.
    pub evolution: EvolutionConfig,
    /// Seed of the RNG driving the improvement pass. The fixed default
    /// keeps repeated runs over identical input reproducible.
    pub seed: u64,
}

/// The result of [`Assembler::assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyResult {
    /// The best timetable found within the clash bound.
    Found(Assignment),
    /// No timetable satisfies the clash bound. This is a normal outcome,
    /// not an error; typical caller policies are to relax the bound and
    /// retry, or to report infeasibility.
    Exhausted,
}

/// Orchestrates the depth-first search, the scorer, and the improvement
/// pass over one problem.
///
/// The assembler owns a cache of prefix clash totals which stays warm
/// across repeated [`Assembler::assemble`] calls; this is sound because the
/// problem is owned and immutable. The cache is never shared: each
/// assembler instance has exclusive access to its own.
#[derive(Debug)]
pub struct Assembler {
    problem: Problem,
    clash_table: ClashTable,
    options: AssemblyOptions,
    clash_cache: PrefixCache<u32>,
    statistics: SearchStatistics,
}

impl Assembler {
    pub fn new(problem: Problem, options: AssemblyOptions) -> Assembler {
        if problem.num_components() == 0 {
            warn!("the assembler was given a problem without components");
        }

        let clash_table = ClashTable::new(&problem);

        Assembler {
            problem,
            clash_table,
            options,
            clash_cache: PrefixCache::new(),
            statistics: SearchStatistics::default(),
        }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// The counters accumulated over all assembly runs of this instance.
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Assemble the best timetable within the clash bound.
    ///
    /// The search itself runs to completion as one atomic unit; the
    /// termination condition is only polled while improving, so a tight
    /// budget degrades the result's quality, never its feasibility.
    pub fn assemble(&mut self, termination: &mut impl TerminationCondition) -> AssemblyResult {
        self.assemble_inner(None, termination)
    }

    /// Like [`Assembler::assemble`], but rewards timetables that agree with
    /// `previous`, so that re-running after a small upstream change tends
    /// to keep the familiar streams.
    pub fn assemble_from(
        &mut self,
        previous: &Assignment,
        termination: &mut impl TerminationCondition,
    ) -> AssemblyResult {
        self.assemble_inner(Some(previous.choices().to_vec()), termination)
    }

    fn assemble_inner(
        &mut self,
        previous: Option<Vec<usize>>,
        termination: &mut impl TerminationCondition,
    ) -> AssemblyResult {
        let search =
            DepthFirstSearch::new(&self.problem, &self.clash_table, self.options.max_clashes);

        let (choices, clashes) = match search.run(&mut self.clash_cache, &mut self.statistics) {
            SearchOutcome::Found { choices, clashes } => (choices, clashes),
            SearchOutcome::Exhausted => {
                self.statistics.log();
                return AssemblyResult::Exhausted;
            }
        };

        let mut scorer = Scorer::new(
            &self.problem,
            &self.clash_table,
            self.options.weights,
            previous,
        );
        let evaluation = scorer.evaluate(&choices);
        timetable_assert_eq_simple!(evaluation.clashes, clashes);

        let seed = Candidate {
            choices,
            score: evaluation.score,
            clashes,
        };

        let mut rng = SmallRng::seed_from_u64(self.options.seed);
        let best = evolution::improve(
            &self.problem,
            &mut scorer,
            &self.options.evolution,
            self.options.max_clashes,
            seed,
            &mut rng,
            termination,
            &mut self.statistics,
        );

        debug!("selected timetable scores {}", best.score);
        self.statistics.log();

        AssemblyResult::Found(Assignment::new(best.choices, best.clashes, best.score))
    }
}
