mod catalog;
mod types;

pub use catalog::{Catalog, CatalogError};
pub use types::{Bin, LockData, MAX_CODE_LEN, PuzzleData, PuzzleKind, QuizData, Room, SortItem};
