//! # pWin Analyzer
//!
//! pWin.ai PDF 分析客户端：上传 PDF，依次调用后端完成文档分类、RFP 需求评估和
//! 就绪度评分，并在终端中展示结果。所有文档理解都在后端完成。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 临时目录（`TempStore`）和 PDF 图片剥离压缩
//! - `clients/` - `Backend` trait，`HttpBackend`（真实后端）和 `ScriptedBackend`（脚本化后端）
//!
//! ### ② 业务能力层（Services）
//! - `FileIntake` - 文件落盘，超过阈值时按从大到小压缩
//! - `BackendGateway` - 带缓存的后端调用
//!
//! ### ③ 流程层（Workflow）
//! - `SessionState` - 唯一的会话状态，阶段由数据推导
//! - `AnalysisFlow` - 阶段门控：upload → classify → edit → confirm → evaluate → score
//!
//! ### ④ 展示层与编排层（Presentation / Orchestration）
//! - `presentation/` - 意图解析、纯投影 `project` 和文本渲染 `render`
//! - `orchestrator::App` - 意图分发，错误兜底，会话生命周期
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{Backend, HttpBackend, ScriptedBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use orchestrator::{App, Control};
pub use presentation::{project, render, Intent, SessionView};
pub use workflow::{AnalysisFlow, Operation, Operations, SessionState, Stage};
