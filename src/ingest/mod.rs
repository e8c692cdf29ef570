pub mod normalizer;
pub mod table;

pub use normalizer::{normalize, normalize_post};
pub use table::{COLUMNS, PostRecord, PostTable};

