//! Settings and saved placements

mod placement;
mod settings;

pub use placement::Placement;
pub use settings::{CatalogEntry, Settings};
