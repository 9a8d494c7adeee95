pub mod analysis_flow;
pub mod operations;
pub mod session;
pub mod stage;

pub use analysis_flow::AnalysisFlow;
pub use operations::{Operation, Operations};
pub use session::{Notice, NoticeLevel, SessionState};
pub use stage::Stage;
