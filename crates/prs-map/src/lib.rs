pub mod engine;
pub mod store;
pub mod synonyms;
pub mod utils;

pub use engine::{MapperConfig, MappingEngine, SIMILARITY_THRESHOLD, TEMPLATE_REPLAY_MIN};
pub use store::{TemplateMetadata, TemplateStore};
pub use synonyms::{SynonymBook, SynonymMap, append_learned, read_synonym_file};
pub use utils::normalize_text;
