pub mod answer_key_writer;
pub mod archive_writer;
pub mod correctness;
pub mod line_classifier;
pub mod question_assembler;
pub mod rebuilder;
pub mod shuffler;
pub mod text_extractor;
pub mod warn_writer;

pub use answer_key_writer::AnswerKeyTable;
pub use archive_writer::ExamArchive;
pub use rebuilder::ExamRegion;
pub use warn_writer::WarnWriter;
