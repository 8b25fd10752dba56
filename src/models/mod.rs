pub mod exam_meta;
pub mod group;
pub mod line;
pub mod loaders;
pub mod question;
pub mod upload;
pub mod variant;

pub use exam_meta::{ExamMeta, GenerationOptions};
pub use group::{GroupTag, ShuffleRule};
pub use line::{ClassifiedLine, LineKind};
pub use loaders::{load_all_uploads, load_exam_meta, load_upload};
pub use question::{letter_for_position, Answer, Question, ANSWERS_PER_QUESTION};
pub use upload::ExamUpload;
pub use variant::ExamVariant;
