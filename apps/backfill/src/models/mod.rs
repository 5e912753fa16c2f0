pub mod product;
pub mod record;

pub use product::{DimensionPrediction, ReferenceProduct};
pub use record::Record;
