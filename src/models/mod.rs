pub mod fallback;
pub mod product;

pub use fallback::fallback_catalog;
pub use product::{Product, ProductDraft, ProductPatch};
