pub mod parsed_exam;
pub mod variant_ctx;
pub mod variant_flow;

pub use parsed_exam::ParsedExam;
pub use variant_ctx::VariantCtx;
pub use variant_flow::{VariantFlow, VariantOutput};
