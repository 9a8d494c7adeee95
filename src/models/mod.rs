pub mod classification;
pub mod doc_type;
pub mod document;
pub mod evaluation;
pub mod readiness;

pub use classification::{has_rfp, ClassificationRecord};
pub use doc_type::{normalize_label, DocTypeCatalog, KnownDocType};
pub use document::{Fingerprint, StagedFile, UploadedDocument};
pub use evaluation::{
    Coverage, Evaluation, EvaluationDiagnostic, EvaluationResult, RequirementCoverage,
    SourceFiles,
};
pub use readiness::ReadinessResult;
