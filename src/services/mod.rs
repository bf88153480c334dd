pub mod quarantine;

pub use quarantine::{Quarantine, QUARANTINE_DIR_NAME};
