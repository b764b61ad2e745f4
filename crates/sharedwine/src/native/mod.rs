pub mod entry;
pub mod library;

pub use entry::{SharedWineEntry, WineEntry};
pub use library::{ensure_loaded, SharedLibrary};
