//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有会话状态，把用户意图分发给流程层，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (意图分发 + 会话生命周期)
//!     ↓
//! workflow::AnalysisFlow (阶段门控)
//!     ↓
//! services (能力层：FileIntake / BackendGateway)
//!     ↓
//! infrastructure / clients (TempStore、PDF 压缩、HTTP 后端)
//! ```
//!
//! ## 设计原则
//!
//! 1. **唯一所有者**：只有 App 持有 SessionState
//! 2. **错误兜底**：意图产生的错误都变成提示，不会中断会话
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod app;

pub use app::{App, Control};
