pub mod audio_constants;
pub mod extended;
pub mod table;
pub mod types;

pub use audio_constants::*;
pub use extended::{extended_to_f64, f64_to_extended};
pub use table::{SoundTable, TableEntry, TABLE_ALIGNMENT};
pub use types::*;
