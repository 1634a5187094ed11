use enum_map::Enum;

/// A day of the week on which a [`Session`][crate::basic_types::Session] can
/// be scheduled.
///
/// The derived order (Monday first) is the order in which days are reported
/// and aggregated; it carries no scheduling meaning beyond that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Enum)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days, in their derived order.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];
}
