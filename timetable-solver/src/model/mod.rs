//! The input data model: streams, components, and the validated problem.
//!
//! External collaborators normalize raw course data into this shape; the
//! engine itself never parses anything. All validation happens once, at
//! [`Problem::new`], so that the search can rely on well-formed data
//! throughout.

use thiserror::Error;

use crate::basic_types::Day;
use crate::basic_types::Session;

/// The ways in which externally supplied course data can be malformed.
///
/// These are rejected when the [`Problem`] is constructed, before any search
/// begins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("component '{name}' has no streams to choose from")]
    EmptyComponent { name: String },
    #[error("component '{name}' has a session on {day:?} with invalid time range [{start}, {end})")]
    InvalidTimeRange {
        name: String,
        day: Day,
        start: i32,
        end: i32,
    },
}

/// One selectable alternative within a [`Component`]: a set of sessions that
/// are all attended together, plus a caller-supplied preference weight.
///
/// A stream may have no sessions at all (for example a web-delivered
/// offering); such a stream never clashes with anything.
#[derive(Debug, Clone)]
pub struct Stream {
    sessions: Vec<Session>,
    weight: i64,
}

impl Stream {
    pub fn new(sessions: Vec<Session>) -> Stream {
        Stream {
            sessions,
            weight: 0,
        }
    }

    /// Attach a preference weight to this stream; the weight is added to the
    /// score of every assignment that selects the stream.
    pub fn with_weight(mut self, weight: i64) -> Stream {
        self.weight = weight;
        self
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }
}

/// A named group of mutually exclusive [`Stream`]s, exactly one of which must
/// be chosen in any complete assignment (for example "COMP1511 LEC").
///
/// The stream order is fixed for the duration of a search run; it determines
/// both the order in which alternatives are tried and the meaning of stored
/// choice indices.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    streams: Vec<Stream>,
}

impl Component {
    pub fn new(name: impl Into<String>, streams: Vec<Stream>) -> Component {
        Component {
            name: name.into(),
            streams,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }
}

/// A validated, immutable collection of [`Component`]s: the input to one
/// search run.
///
/// The component order is fixed at construction; choice sequences and cache
/// keys are only meaningful relative to that order.
#[derive(Debug, Clone)]
pub struct Problem {
    components: Vec<Component>,
    /// For each component, the index of its first stream in the global
    /// stream numbering used by the clash table.
    stream_offsets: Vec<usize>,
    num_streams: usize,
}

impl Problem {
    /// Validate the given components into a [`Problem`].
    ///
    /// Fails fast on a component without streams or a session whose time
    /// range is inverted, empty, or starts before midnight.
    pub fn new(components: Vec<Component>) -> Result<Problem, ModelError> {
        for component in &components {
            if component.streams.is_empty() {
                return Err(ModelError::EmptyComponent {
                    name: component.name.clone(),
                });
            }

            for stream in &component.streams {
                for session in &stream.sessions {
                    if session.start < 0 || session.start >= session.end {
                        return Err(ModelError::InvalidTimeRange {
                            name: component.name.clone(),
                            day: session.day,
                            start: session.start,
                            end: session.end,
                        });
                    }
                }
            }
        }

        let mut stream_offsets = Vec::with_capacity(components.len());
        let mut num_streams = 0;
        for component in &components {
            stream_offsets.push(num_streams);
            num_streams += component.streams.len();
        }

        Ok(Problem {
            components,
            stream_offsets,
            num_streams,
        })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn num_streams(&self) -> usize {
        self.num_streams
    }

    /// The sessions of the stream selected by `(component, stream)`.
    pub(crate) fn stream(&self, component: usize, stream: usize) -> &Stream {
        &self.components[component].streams[stream]
    }

    /// The position of `(component, stream)` in the global stream numbering.
    pub(crate) fn global_stream_index(&self, component: usize, stream: usize) -> usize {
        self.stream_offsets[component] + stream
    }

    /// Re-derive the streams selected by an externally stored choice
    /// sequence.
    ///
    /// Returns [`None`] when the stored sequence no longer matches this
    /// problem: wrong length, or an index out of range for its component
    /// (typically because the upstream course data changed since the
    /// sequence was stored). Stale data falls back to an unselected state
    /// rather than a panic or a fuzzy re-match.
    pub fn resolve_choices(&self, stored: &[usize]) -> Option<Vec<&Stream>> {
        if stored.len() != self.components.len() {
            return None;
        }

        self.components
            .iter()
            .zip(stored)
            .map(|(component, &choice)| component.streams.get(choice))
            .collect()
    }
}
