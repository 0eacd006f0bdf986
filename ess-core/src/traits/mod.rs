mod document_index;
mod generator;
mod structured_data;

pub use document_index::IDocumentIndex;
pub use generator::ITextGenerator;
pub use structured_data::IStructuredData;
