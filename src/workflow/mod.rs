pub mod highlight_flow;
pub mod note_builder;
pub mod selector;

pub use highlight_flow::{
    HighlightFlow, ResolveOptions, ResolveOutcome, ResolveProgress, ResolveReport,
};
pub use note_builder::{NoteBuilder, NoteTemplate};
pub use selector::select;
