//! Evolutionary improvement of an assembled timetable.
//!
//! The depth-first search returns the first feasible timetable in scan
//! order, which is rarely the best-scoring one. This pass runs a small
//! genetic scheme over choice sequences: seed a population of random
//! candidates, repeatedly mutate a (top-biased) parent by re-picking one
//! component's stream, keep the population sorted and culled, and stop at
//! the iteration cap or when the caller's termination condition triggers.
//!
//! Candidates are free to violate the clash bound while evolving (the
//! clash penalty steers the population away from them), but only
//! candidates within the bound are ever returned.

use std::cmp::Ordering;

use log::debug;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::engine::statistics::SearchStatistics;
use crate::model::Problem;
use crate::scoring::Score;
use crate::scoring::Scorer;
use crate::termination::TerminationCondition;

/// Configuration of the improvement pass.
#[derive(Debug, Clone, Copy)]
pub struct EvolutionConfig {
    /// Total mutation budget; zero disables the pass entirely.
    pub max_iterations: u32,
    /// Iterations between population culls and termination checks.
    pub check_interval: u32,
    /// Number of random candidates seeded into the initial population.
    pub initial_population: u32,
    /// Population size cap applied at every cull.
    pub max_population: usize,
    /// Skews parent selection towards the best candidates; the selection
    /// index is drawn from `0..population + bias_top` and wrapped.
    pub bias_top: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            max_iterations: 5000,
            check_interval: 10,
            initial_population: 100,
            max_population: 20,
            bias_top: 5,
        }
    }
}

/// One member of the population: a choice sequence and its derived quality.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) choices: Vec<usize>,
    pub(crate) score: Score,
    pub(crate) clashes: u32,
}

/// Order candidates best-first: higher score wins, ties break by the
/// earliest-decided component's stream index, ascending, so that equal
/// scores still rank reproducibly.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.choices.cmp(&b.choices))
}

/// Improve on `seed`, returning the best candidate found that stays within
/// `max_clashes`. The result is never worse than `seed`.
#[allow(clippy::too_many_arguments, reason = "free function wiring the pass together")]
pub(crate) fn improve(
    problem: &Problem,
    scorer: &mut Scorer<'_>,
    config: &EvolutionConfig,
    max_clashes: u32,
    seed: Candidate,
    rng: &mut SmallRng,
    termination: &mut impl TerminationCondition,
    statistics: &mut SearchStatistics,
) -> Candidate {
    // Components with a single stream have nothing to mutate.
    let mutable: Vec<usize> = problem
        .components()
        .iter()
        .enumerate()
        .filter(|(_, component)| component.streams().len() > 1)
        .map(|(index, _)| index)
        .collect();

    if mutable.is_empty() || config.max_iterations == 0 {
        return seed;
    }

    let check_interval = config.check_interval.max(1);

    let mut best = seed.clone();
    let mut population = vec![seed];
    for _ in 0..config.initial_population {
        let candidate = random_candidate(problem, scorer, rng);
        consider(&mut best, &candidate, max_clashes, statistics);
        population.push(candidate);
    }
    population.sort_by(rank);
    population.truncate(config.max_population);

    for iteration in 0..config.max_iterations {
        statistics.num_evolution_iterations += 1;

        let parent = rng.gen_range(0..population.len() + config.bias_top) % population.len();
        let child = mutate(&population[parent], &mutable, problem, scorer, rng);
        consider(&mut best, &child, max_clashes, statistics);
        population.push(child);

        if (iteration + 1) % check_interval == 0 {
            population.sort_by(rank);
            population.truncate(config.max_population);

            if termination.should_stop() {
                debug!("improvement stopped after {} iterations", iteration + 1);
                break;
            }
        }
    }

    best
}

fn random_candidate(problem: &Problem, scorer: &mut Scorer<'_>, rng: &mut SmallRng) -> Candidate {
    let choices: Vec<usize> = problem
        .components()
        .iter()
        .map(|component| rng.gen_range(0..component.streams().len()))
        .collect();

    evaluate(choices, scorer)
}

/// Derive a child from `parent` by re-picking one mutable component's
/// stream to a different index.
fn mutate(
    parent: &Candidate,
    mutable: &[usize],
    problem: &Problem,
    scorer: &mut Scorer<'_>,
    rng: &mut SmallRng,
) -> Candidate {
    let component = mutable[rng.gen_range(0..mutable.len())];
    let num_streams = problem.components()[component].streams().len();

    // Shift by a non-zero offset so the chosen stream always changes.
    let offset = rng.gen_range(1..num_streams);
    let mut choices = parent.choices.clone();
    choices[component] = (choices[component] + offset) % num_streams;

    evaluate(choices, scorer)
}

fn evaluate(choices: Vec<usize>, scorer: &mut Scorer<'_>) -> Candidate {
    let evaluation = scorer.evaluate(&choices);

    Candidate {
        choices,
        score: evaluation.score,
        clashes: evaluation.clashes,
    }
}

fn consider(
    best: &mut Candidate,
    candidate: &Candidate,
    max_clashes: u32,
    statistics: &mut SearchStatistics,
) {
    if candidate.clashes <= max_clashes && rank(candidate, best) == Ordering::Less {
        statistics.num_improvements += 1;
        *best = candidate.clone();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::basic_types::Day;
    use crate::basic_types::Session;
    use crate::clash::ClashTable;
    use crate::model::Component;
    use crate::model::Stream;
    use crate::scoring::ScoreWeights;
    use crate::termination::Indefinite;

    fn improve_once(problem: &Problem, seed_choices: Vec<usize>, rng_seed: u64) -> Candidate {
        let table = ClashTable::new(problem);
        let mut scorer = Scorer::new(problem, &table, ScoreWeights::default(), None);
        let seed = {
            let evaluation = scorer.evaluate(&seed_choices);
            Candidate {
                choices: seed_choices,
                score: evaluation.score,
                clashes: evaluation.clashes,
            }
        };
        let mut rng = SmallRng::seed_from_u64(rng_seed);
        let mut statistics = SearchStatistics::default();

        improve(
            problem,
            &mut scorer,
            &EvolutionConfig::default(),
            0,
            seed,
            &mut rng,
            &mut Indefinite,
            &mut statistics,
        )
    }

    #[test]
    fn a_heavier_stream_is_preferred() {
        let problem = Problem::new(vec![
            Component::new(
                "A",
                vec![Stream::new(vec![]), Stream::new(vec![]).with_weight(100)],
            ),
            Component::new("B", vec![Stream::new(vec![])]),
        ])
        .expect("valid problem");

        let best = improve_once(&problem, vec![0, 0], 42);

        assert_eq!(best.choices, vec![1, 0]);
    }

    #[test]
    fn the_clash_bound_is_never_violated() {
        // The heavy stream clashes; it must not be returned at bound 0 no
        // matter how attractive its weight is.
        let problem = Problem::new(vec![
            Component::new(
                "A",
                vec![
                    Stream::new(vec![Session::new(Day::Tuesday, 18, 20)]),
                    Stream::new(vec![Session::new(Day::Monday, 18, 20)]).with_weight(10_000),
                ],
            ),
            Component::new(
                "B",
                vec![Stream::new(vec![Session::new(Day::Monday, 18, 20)])],
            ),
        ])
        .expect("valid problem");

        let best = improve_once(&problem, vec![0, 0], 7);

        assert_eq!(best.choices, vec![0, 0]);
        assert_eq!(best.clashes, 0);
    }

    #[test]
    fn identical_seeds_evolve_identically() {
        let problem = Problem::new(vec![
            Component::new(
                "A",
                vec![
                    Stream::new(vec![Session::new(Day::Monday, 18, 20)]),
                    Stream::new(vec![Session::new(Day::Tuesday, 18, 20)]),
                    Stream::new(vec![Session::new(Day::Wednesday, 18, 20)]),
                ],
            ),
            Component::new(
                "B",
                vec![
                    Stream::new(vec![Session::new(Day::Monday, 19, 21)]),
                    Stream::new(vec![Session::new(Day::Thursday, 19, 21)]),
                ],
            ),
        ])
        .expect("valid problem");

        let first = improve_once(&problem, vec![0, 1], 123);
        let second = improve_once(&problem, vec![0, 1], 123);

        assert_eq!(first.choices, second.choices);
        assert_eq!(first.score, second.score);
    }

    #[test]
    fn without_mutable_components_the_seed_is_returned() {
        let problem = Problem::new(vec![Component::new(
            "A",
            vec![Stream::new(vec![Session::new(Day::Monday, 18, 20)])],
        )])
        .expect("valid problem");

        let best = improve_once(&problem, vec![0], 1);

        assert_eq!(best.choices, vec![0]);
    }
}
