//! Surface derivative operators (Horn 3×3, edge-replicated).
pub mod aspect;
mod gradient;
pub mod hillshade;
pub mod slope;

pub use aspect::{aspect, FLAT_ASPECT};
pub use hillshade::{hillshade, HillshadeParams};
pub use slope::slope;
