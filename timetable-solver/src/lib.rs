//! # Timetable solver
//! A timetable assembly engine: given a set of courses broken into
//! components (lecture, tutorial, ...), each offering several mutually
//! exclusive time-slot streams, it chooses one stream per component so that
//! scheduling clashes stay within a configured bound, and ranks candidate
//! timetables by a weighted score so the best one can be returned.
//!
//! The engine is a pure computation: course data is normalized into the
//! [`model::Problem`] shape by the caller, and the selected
//! [`Assignment`][basic_types::Assignment] is handed back for display or
//! persistence. No I/O happens inside.
//!
//! # Assembling a timetable
//! Times are half-hour ticks from midnight, so 9:00–11:00 is `18..22`:
//! ```rust
//! use timetable_solver::basic_types::Day;
//! use timetable_solver::basic_types::Session;
//! use timetable_solver::model::Component;
//! use timetable_solver::model::Problem;
//! use timetable_solver::model::Stream;
//! use timetable_solver::termination::Indefinite;
//! use timetable_solver::Assembler;
//! use timetable_solver::AssemblyOptions;
//! use timetable_solver::AssemblyResult;
//!
//! let lecture_monday = Stream::new(vec![Session::new(Day::Monday, 18, 22)]);
//! let lecture_tuesday = Stream::new(vec![Session::new(Day::Tuesday, 18, 22)]);
//! let tutorial = Stream::new(vec![Session::new(Day::Monday, 20, 24)]);
//!
//! let problem = Problem::new(vec![
//!     Component::new("COMP1511 LEC", vec![lecture_monday, lecture_tuesday]),
//!     Component::new("COMP1511 TUT", vec![tutorial]),
//! ])
//! .expect("the course data is well-formed");
//!
//! let mut assembler = Assembler::new(problem, AssemblyOptions::default());
//!
//! match assembler.assemble(&mut Indefinite) {
//!     AssemblyResult::Found(assignment) => {
//!         // The Monday lecture clashes with the tutorial, so the Tuesday
//!         // stream is selected.
//!         assert_eq!(assignment.choices(), &[1, 0][..]);
//!         assert_eq!(assignment.clash_count(), 0);
//!     }
//!     AssemblyResult::Exhausted => panic!("a clash-free timetable exists"),
//! }
//! ```
//!
//! [`AssemblyResult::Exhausted`] is an ordinary outcome, not an error: it
//! reports that no timetable satisfies the clash bound, and the caller
//! decides whether to relax [`AssemblyOptions::max_clashes`] and retry.

#[doc(hidden)]
pub mod asserts;

pub mod basic_types;
pub mod clash;
pub mod containers;
pub mod model;
pub mod scoring;
pub mod termination;

pub(crate) mod engine;

// We declare a private module with public use, so that all exports from API
// are exports directly from the crate.
mod api;

pub use api::*;
