use crate::scoring::Score;

/// A complete timetable: one chosen stream index per component, together
/// with the derived clash total and score.
///
/// The choice sequence is the sole identity of an assignment; two
/// assignments are equal iff their choice sequences are equal element-wise,
/// regardless of the derived values.
#[derive(Clone, Debug)]
pub struct Assignment {
    choices: Vec<usize>,
    clashes: u32,
    score: Score,
}

impl Assignment {
    pub(crate) fn new(choices: Vec<usize>, clashes: u32, score: Score) -> Assignment {
        Assignment {
            choices,
            clashes,
            score,
        }
    }

    /// The chosen stream index for each component, in component order.
    ///
    /// This sequence can be stored externally and later revalidated against
    /// a (possibly updated) problem with
    /// [`Problem::resolve_choices`][crate::model::Problem::resolve_choices].
    pub fn choices(&self) -> &[usize] {
        &self.choices
    }

    /// The total number of clashing session pairs in this timetable.
    pub fn clash_count(&self) -> u32 {
        self.clashes
    }

    /// The quality score of this timetable; higher is better.
    pub fn score(&self) -> Score {
        self.score
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.choices == other.choices
    }
}

impl Eq for Assignment {}
