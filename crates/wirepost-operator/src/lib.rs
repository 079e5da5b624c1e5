#[macro_use]
extern crate tracing;

pub use self::dispatcher::{result_schema, PostDispatcher};
pub use self::record::{Field, FieldType, FieldValue, Record, Schema};

mod dispatcher;
pub mod record;

/// Stream punctuation marks.
///
/// The dispatcher forwards these untouched; they carry no state of their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punctuation {
    WindowMarker,
    FinalMarker,
}
