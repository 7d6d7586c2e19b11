pub mod conversion;
pub mod reference;

pub use conversion::{ConversionResult, ReferenceReport, ResolvedFile, SkipReason};
pub use reference::{ImageReference, ReferenceKind};
