//! Scoring of complete and partial assignments.
//!
//! A feasible timetable is not necessarily a pleasant one. The scorer turns
//! an assignment into a single comparable number from weighted features:
//! clashes (dominant), idle time between sessions on the same day, the
//! number of days that have any session at all, per-stream preference
//! weights, and agreement with a previous assignment.
//!
//! Scores of choice prefixes are memoized in a [`PrefixCache`], keyed at
//! `prefix + [TERMINATOR]` so that every prefix of an assignment keeps its
//! entry alongside the entries of its extensions. A cached prefix entry is
//! not just a number: the day-based features depend on how the sessions of
//! later components interleave with the prefix's sessions, so each entry
//! carries the per-day occupied blocks. Extending a cached prefix merges
//! the new stream's sessions into the days it touches and re-derives the
//! day features from the merged blocks, rather than assuming the cached
//! contribution is independent of the extension.

use enum_map::EnumMap;
use itertools::Itertools;

use crate::basic_types::Day;
use crate::clash::ClashTable;
use crate::containers::PrefixCache;
use crate::containers::TERMINATOR;
use crate::model::Problem;
use crate::timetable_assert_moderate;

/// A timetable quality score; higher is better, penalties are negative.
pub type Score = i64;

/// Weights of the scoring features.
///
/// The defaults make a single clash outweigh any realistic combination of
/// the other features; exact values are configuration, not a contract.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    /// Added per clashing session pair.
    pub per_clash: Score,
    /// Added per half-hour tick of idle time between occupied blocks on the
    /// same day.
    pub per_idle_tick: Score,
    /// Added per day which has at least one session.
    pub per_active_day: Score,
    /// Added per component whose chosen stream matches the previous
    /// assignment, when one is supplied.
    pub per_unchanged: Score,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            per_clash: -1000,
            per_idle_tick: -10,
            per_active_day: -60,
            per_unchanged: 30,
        }
    }
}

/// The derived quality of one (partial) assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Evaluation {
    pub(crate) score: Score,
    pub(crate) clashes: u32,
}

/// The occupied blocks of one day, sorted and non-overlapping.
#[derive(Debug, Clone, Default)]
struct DayBlocks {
    blocks: Vec<(i32, i32)>,
}

impl DayBlocks {
    fn insert(&mut self, start: i32, end: i32) {
        let at = self.blocks.partition_point(|block| block.0 <= start);
        self.blocks.insert(at, (start, end));

        // Re-merge the whole day; a day only ever holds a handful of blocks.
        let mut merged: Vec<(i32, i32)> = Vec::with_capacity(self.blocks.len());
        for &(block_start, block_end) in &self.blocks {
            match merged.last_mut() {
                Some(last) if block_start <= last.1 => last.1 = last.1.max(block_end),
                _ => merged.push((block_start, block_end)),
            }
        }
        self.blocks = merged;

        timetable_assert_moderate!(
            self.blocks.windows(2).all(|pair| pair[0].1 < pair[1].0),
            "day blocks must stay sorted and disjoint"
        );
    }

    /// Total idle ticks between consecutive occupied blocks.
    fn idle_ticks(&self) -> i64 {
        self.blocks
            .iter()
            .tuple_windows()
            .map(|(a, b)| i64::from(b.0 - a.1))
            .sum()
    }

    fn is_active(&self) -> bool {
        !self.blocks.is_empty()
    }
}

/// The memoized contribution of a choice prefix.
///
/// `additive` collects the contributions that extend exactly (stream
/// weights and unchanged bonuses); clashes and the per-day blocks are kept
/// in a form that later components can be merged into.
#[derive(Debug, Clone, Default)]
struct PrefixScore {
    clashes: u32,
    additive: Score,
    days: EnumMap<Day, DayBlocks>,
}

/// Evaluates assignments against one problem, memoizing prefix
/// contributions keyed by the choice sequence.
///
/// A scorer is created per search invocation: the previous-assignment bonus
/// is baked into the memoized values, so entries cannot be reused across
/// invocations with different previous assignments.
#[derive(Debug)]
pub(crate) struct Scorer<'a> {
    problem: &'a Problem,
    clash_table: &'a ClashTable,
    weights: ScoreWeights,
    previous: Option<Vec<usize>>,
    cache: PrefixCache<PrefixScore>,
}

impl<'a> Scorer<'a> {
    pub(crate) fn new(
        problem: &'a Problem,
        clash_table: &'a ClashTable,
        weights: ScoreWeights,
        previous: Option<Vec<usize>>,
    ) -> Scorer<'a> {
        Scorer {
            problem,
            clash_table,
            weights,
            previous,
            cache: PrefixCache::new(),
        }
    }

    /// Evaluate the given (partial or complete) choice sequence.
    pub(crate) fn evaluate(&mut self, choices: &[usize]) -> Evaluation {
        let prefix = self.prefix_score(choices);
        let score = self.finish(&prefix);

        Evaluation {
            score,
            clashes: prefix.clashes,
        }
    }

    /// The memoized contribution of `choices`, built by extending the
    /// deepest cached prefix one component at a time.
    fn prefix_score(&mut self, choices: &[usize]) -> PrefixScore {
        let mut key: Vec<usize> = Vec::with_capacity(choices.len() + 1);

        let mut depth = choices.len();
        let mut current = loop {
            if depth == 0 {
                break PrefixScore::default();
            }
            if let Some(cached) = self.cache.get(terminated(&mut key, &choices[..depth])) {
                break cached.clone();
            }
            depth -= 1;
        };

        for component in depth..choices.len() {
            self.extend(&mut current, choices, component);
            let entry = current.clone();
            self.cache.set(terminated(&mut key, &choices[..=component]), entry);
        }

        current
    }

    /// Merge component `component`'s chosen stream into `prefix`.
    fn extend(&self, prefix: &mut PrefixScore, choices: &[usize], component: usize) {
        let choice = choices[component];
        let stream = self.problem.stream(component, choice);
        let global = self.problem.global_stream_index(component, choice);

        for (earlier, &earlier_choice) in choices[..component].iter().enumerate() {
            prefix.clashes += self
                .clash_table
                .between(self.problem.global_stream_index(earlier, earlier_choice), global);
        }

        prefix.additive += stream.weight();
        if let Some(previous) = &self.previous {
            if previous.get(component) == Some(&choice) {
                prefix.additive += self.weights.per_unchanged;
            }
        }

        for session in stream.sessions() {
            prefix.days[session.day].insert(session.start, session.end);
        }
    }

    /// Collapse a prefix contribution into its final score.
    fn finish(&self, prefix: &PrefixScore) -> Score {
        let mut score = prefix.additive;
        score += self.weights.per_clash * Score::from(prefix.clashes);

        for blocks in prefix.days.values() {
            score += self.weights.per_idle_tick * blocks.idle_ticks();
            if blocks.is_active() {
                score += self.weights.per_active_day;
            }
        }

        score
    }
}

/// Rebuild `key` as `prefix + [TERMINATOR]`.
fn terminated<'a>(key: &'a mut Vec<usize>, prefix: &[usize]) -> &'a [usize] {
    key.clear();
    key.extend_from_slice(prefix);
    key.push(TERMINATOR);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Session;
    use crate::model::Component;
    use crate::model::Stream;

    fn weights_with(update: impl FnOnce(&mut ScoreWeights)) -> ScoreWeights {
        let mut weights = ScoreWeights {
            per_clash: 0,
            per_idle_tick: 0,
            per_active_day: 0,
            per_unchanged: 0,
        };
        update(&mut weights);
        weights
    }

    fn one_stream(sessions: Vec<Session>) -> Vec<Stream> {
        vec![Stream::new(sessions)]
    }

    #[test]
    fn idle_time_between_sessions_is_penalized() {
        let problem = Problem::new(vec![
            Component::new("A", one_stream(vec![Session::new(Day::Monday, 18, 20)])),
            Component::new("B", one_stream(vec![Session::new(Day::Monday, 24, 26)])),
        ])
        .expect("valid problem");
        let table = ClashTable::new(&problem);

        let weights = weights_with(|weights| weights.per_idle_tick = -10);
        let mut scorer = Scorer::new(&problem, &table, weights, None);

        // Two hours idle between 10:00 and 12:00.
        assert_eq!(scorer.evaluate(&[0, 0]).score, -40);
    }

    #[test]
    fn overlapping_sessions_leave_no_idle_time() {
        let problem = Problem::new(vec![
            Component::new(
                "A",
                one_stream(vec![Session::tolerant(Day::Monday, 18, 24)]),
            ),
            Component::new("B", one_stream(vec![Session::new(Day::Monday, 20, 22)])),
        ])
        .expect("valid problem");
        let table = ClashTable::new(&problem);

        let weights = weights_with(|weights| weights.per_idle_tick = -10);
        let mut scorer = Scorer::new(&problem, &table, weights, None);

        assert_eq!(scorer.evaluate(&[0, 0]).score, 0);
    }

    #[test]
    fn each_active_day_is_penalized_once() {
        let problem = Problem::new(vec![
            Component::new(
                "A",
                one_stream(vec![
                    Session::new(Day::Monday, 18, 20),
                    Session::new(Day::Tuesday, 18, 20),
                ]),
            ),
            Component::new("B", one_stream(vec![Session::new(Day::Monday, 22, 24)])),
        ])
        .expect("valid problem");
        let table = ClashTable::new(&problem);

        let weights = weights_with(|weights| weights.per_active_day = -60);
        let mut scorer = Scorer::new(&problem, &table, weights, None);

        assert_eq!(scorer.evaluate(&[0, 0]).score, -120);
    }

    #[test]
    fn stream_weights_are_added() {
        let problem = Problem::new(vec![Component::new(
            "A",
            vec![
                Stream::new(vec![]).with_weight(25),
                Stream::new(vec![]).with_weight(-5),
            ],
        )])
        .expect("valid problem");
        let table = ClashTable::new(&problem);

        let mut scorer = Scorer::new(&problem, &table, weights_with(|_| ()), None);

        assert_eq!(scorer.evaluate(&[0]).score, 25);
        assert_eq!(scorer.evaluate(&[1]).score, -5);
    }

    #[test]
    fn unchanged_choices_are_rewarded() {
        let problem = Problem::new(vec![
            Component::new("A", vec![Stream::new(vec![]), Stream::new(vec![])]),
            Component::new("B", vec![Stream::new(vec![]), Stream::new(vec![])]),
        ])
        .expect("valid problem");
        let table = ClashTable::new(&problem);

        let weights = weights_with(|weights| weights.per_unchanged = 30);
        let mut scorer = Scorer::new(&problem, &table, weights, Some(vec![1, 0]));

        assert_eq!(scorer.evaluate(&[1, 0]).score, 60);
        assert_eq!(scorer.evaluate(&[1, 1]).score, 30);
        assert_eq!(scorer.evaluate(&[0, 1]).score, 0);
    }

    #[test]
    fn fewer_clashes_never_score_worse() {
        // Two assignments identical except that the first choice clashes
        // with component B; the tolerant variant occupies the same time.
        let problem = Problem::new(vec![
            Component::new(
                "A",
                vec![
                    Stream::new(vec![Session::new(Day::Monday, 18, 20)]),
                    Stream::new(vec![Session::tolerant(Day::Monday, 18, 20)]),
                ],
            ),
            Component::new("B", one_stream(vec![Session::new(Day::Monday, 18, 20)])),
        ])
        .expect("valid problem");
        let table = ClashTable::new(&problem);

        let mut scorer = Scorer::new(&problem, &table, ScoreWeights::default(), None);

        let clashing = scorer.evaluate(&[0, 0]);
        let clash_free = scorer.evaluate(&[1, 0]);

        assert_eq!(clashing.clashes, 1);
        assert_eq!(clash_free.clashes, 0);
        assert!(clash_free.score >= clashing.score);
    }

    #[test]
    fn extending_a_memoized_prefix_matches_scoring_from_scratch() {
        // The second component's Monday session bridges the gap left by the
        // first, so the cached prefix contribution must be re-derived at the
        // boundary rather than summed.
        let components = vec![
            Component::new(
                "A",
                one_stream(vec![
                    Session::new(Day::Monday, 18, 20),
                    Session::new(Day::Monday, 24, 26),
                ]),
            ),
            Component::new("B", one_stream(vec![Session::new(Day::Monday, 20, 24)])),
        ];
        let problem = Problem::new(components).expect("valid problem");
        let table = ClashTable::new(&problem);

        let mut memoized = Scorer::new(&problem, &table, ScoreWeights::default(), None);
        // Prime the cache with the prefix, then extend it.
        let _ = memoized.evaluate(&[0]);
        let extended = memoized.evaluate(&[0, 0]);

        let mut fresh = Scorer::new(&problem, &table, ScoreWeights::default(), None);
        let from_scratch = fresh.evaluate(&[0, 0]);

        assert_eq!(extended, from_scratch);
        // The bridged day has no idle time left.
        let weights = weights_with(|weights| weights.per_idle_tick = -10);
        let mut gaps_only = Scorer::new(&problem, &table, weights, None);
        assert_eq!(gaps_only.evaluate(&[0, 0]).score, 0);
    }

    #[test]
    fn the_empty_assignment_scores_zero() {
        let problem = Problem::new(vec![]).expect("valid problem");
        let table = ClashTable::new(&problem);

        let mut scorer = Scorer::new(&problem, &table, ScoreWeights::default(), None);

        assert_eq!(scorer.evaluate(&[]).score, 0);
    }
}
