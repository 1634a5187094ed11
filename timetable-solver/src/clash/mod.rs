//! Clash detection: counting conflicting session pairs between streams.

use crate::basic_types::Session;
use crate::model::Problem;
use crate::model::Stream;

/// The number of conflicting pairs `(a, b)` with `a` from `xs` and `b` from
/// `ys`.
///
/// Either side may be empty (a time-free stream), in which case the count is
/// zero. Clash-tolerant sessions never contribute.
pub fn count_clashes(xs: &[Session], ys: &[Session]) -> u32 {
    let mut count = 0;
    for a in xs {
        for b in ys {
            if a.overlaps(b) {
                count += 1;
            }
        }
    }

    count
}

/// Precomputed pairwise clash counts between every pair of streams in a
/// [`Problem`].
///
/// The search adds one stream at a time to a partial assignment and needs
/// the number of clashes the new stream introduces against each committed
/// stream; precomputing the pairwise counts once turns that inner step into
/// a row of table lookups. Streams are identified by their position in the
/// problem's global stream numbering.
#[derive(Debug, Clone)]
pub(crate) struct ClashTable {
    counts: Vec<u32>,
    num_streams: usize,
}

impl ClashTable {
    pub(crate) fn new(problem: &Problem) -> ClashTable {
        let num_streams = problem.num_streams();
        let mut counts = vec![0; num_streams * num_streams];

        let all_streams: Vec<&[Session]> = problem
            .components()
            .iter()
            .flat_map(|component| component.streams().iter().map(Stream::sessions))
            .collect();

        for (i, xs) in all_streams.iter().enumerate() {
            for (j, ys) in all_streams.iter().enumerate().skip(i + 1) {
                let count = count_clashes(xs, ys);
                counts[i * num_streams + j] = count;
                counts[j * num_streams + i] = count;
            }
        }

        ClashTable {
            counts,
            num_streams,
        }
    }

    /// The clash count between the streams at global indices `a` and `b`.
    pub(crate) fn between(&self, a: usize, b: usize) -> u32 {
        self.counts[a * self.num_streams + b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Day;
    use crate::model::Component;

    fn stream(sessions: Vec<Session>) -> Stream {
        Stream::new(sessions)
    }

    #[test]
    fn counts_every_conflicting_pair() {
        let xs = [
            Session::new(Day::Monday, 18, 22),
            Session::new(Day::Tuesday, 18, 22),
        ];
        let ys = [
            Session::new(Day::Monday, 20, 24),
            Session::new(Day::Tuesday, 20, 24),
            Session::new(Day::Friday, 18, 22),
        ];

        assert_eq!(count_clashes(&xs, &ys), 2);
    }

    #[test]
    fn a_time_free_stream_never_clashes() {
        let xs: [Session; 0] = [];
        let ys = [Session::new(Day::Monday, 18, 22)];

        assert_eq!(count_clashes(&xs, &ys), 0);
        assert_eq!(count_clashes(&ys, &xs), 0);
    }

    #[test]
    fn tolerant_pairs_do_not_count() {
        let xs = [Session::tolerant(Day::Monday, 18, 22)];
        let ys = [Session::new(Day::Monday, 18, 22)];

        assert_eq!(count_clashes(&xs, &ys), 0);
    }

    #[test]
    fn the_table_matches_direct_counting() {
        let problem = Problem::new(vec![
            Component::new(
                "A",
                vec![
                    stream(vec![Session::new(Day::Monday, 18, 22)]),
                    stream(vec![Session::new(Day::Monday, 20, 24)]),
                ],
            ),
            Component::new(
                "B",
                vec![stream(vec![
                    Session::new(Day::Monday, 19, 21),
                    Session::new(Day::Friday, 18, 20),
                ])],
            ),
        ])
        .expect("valid problem");

        let table = ClashTable::new(&problem);

        // Both streams of component A clash with component B's single stream
        // exactly once, on Monday.
        assert_eq!(table.between(0, 2), 1);
        assert_eq!(table.between(1, 2), 1);
        // Symmetry.
        assert_eq!(table.between(2, 0), 1);
        // Streams within a component are recorded too, even though the
        // search never selects two of them together.
        assert_eq!(table.between(0, 1), 1);
    }
}
