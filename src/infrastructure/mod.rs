//! 基础设施层：持有临时目录等资源，提供 PDF 压缩能力

pub mod pdf_compressor;
pub mod temp_store;

pub use pdf_compressor::{strip_images, StrippedPdf};
pub use temp_store::TempStore;
