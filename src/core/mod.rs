mod commands;
mod listing;
mod note;

pub use commands::{Command, NoteRef};
pub use listing::Listing;
pub use note::{NameError, Note, NoteName};
