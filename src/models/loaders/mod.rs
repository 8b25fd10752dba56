pub mod toml_loader;

pub use toml_loader::{load_all_uploads, load_exam_meta, load_upload};
