pub mod normalize;
pub mod ocr;

pub use normalize::DefaultNormalizer;
pub use ocr::TesseractExtractor;
