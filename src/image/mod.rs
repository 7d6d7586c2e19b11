pub mod encode;
pub mod format;

pub use encode::EncodedImage;
pub use format::ImageFormat;
