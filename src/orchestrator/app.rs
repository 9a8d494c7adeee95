//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，持有唯一的会话状态并负责资源生命周期。
//!
//! ## 核心功能
//!
//! 1. **意图分发**：把用户意图转为流程层的具名转换
//! 2. **错误兜底**：所有错误都记录为会话提示，会话不会因此中断
//! 3. **两种运行方式**：一次性分析（`run_analysis`）和交互模式（`run_interactive`）
//! 4. **资源清理**：会话结束时释放临时目录

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::clients::{Backend, HttpBackend};
use crate::config::Config;
use crate::error::{AppResult, IntakeError, WorkflowError};
use crate::models::UploadedDocument;
use crate::presentation::{project, render, Intent, SessionView, HELP_TEXT};
use crate::utils::logging::{log_session_end, log_startup};
use crate::workflow::{AnalysisFlow, NoticeLevel, Operations, SessionState, Stage};

/// 分发后的控制信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// 应用主结构
pub struct App<B: Backend> {
    flow: AnalysisFlow<B>,
    session: SessionState,
    operations: Operations,
}

impl App<HttpBackend> {
    /// 初始化应用（连接真实后端）
    pub fn initialize(config: Config) -> Self {
        log_startup(&config);
        let backend = HttpBackend::new(&config);
        Self::with_backend(&config, backend)
    }
}

impl<B: Backend> App<B> {
    pub fn with_backend(config: &Config, backend: B) -> Self {
        Self {
            flow: AnalysisFlow::new(config, backend),
            session: SessionState::new(),
            operations: Operations::all(),
        }
    }

    /// 选择要展示的操作
    pub fn with_operations(mut self, operations: Operations) -> Self {
        self.operations = operations;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    pub fn view(&self) -> SessionView {
        project(&self.session)
    }

    /// 渲染当前视图，并清除已经展示过的提示
    pub fn present(&mut self) -> String {
        let text = render(&self.view(), &self.operations);
        self.session.take_notices();
        text
    }

    /// 分发一个意图
    ///
    /// 错误不会向上传递，而是记录为提示并在下一次渲染时显示。
    pub async fn dispatch(&mut self, intent: Intent) -> Control {
        if intent == Intent::Quit {
            return Control::Quit;
        }
        if let Err(e) = self.apply(intent).await {
            error!("❌ {}", e);
            self.session.notify(NoticeLevel::Error, e.to_string());
        }
        Control::Continue
    }

    async fn apply(&mut self, intent: Intent) -> AppResult<()> {
        match intent {
            Intent::Upload(paths) => {
                let documents = read_documents(&paths).await?;
                self.flow.upload(&mut self.session, documents).await?;
                self.flow.advance(&mut self.session, &self.operations).await?;
            }
            Intent::Classify => self.flow.classify(&mut self.session).await?,
            Intent::Analyze => {
                self.flow.advance(&mut self.session, &self.operations).await?;
            }
            Intent::EditLabel { row, label } => {
                let index = row.checked_sub(1).ok_or(WorkflowError::RecordNotFound {
                    row,
                    len: self.session.records().map_or(0, |r| r.len()),
                })?;
                self.flow.edit_label(&mut self.session, index, &label)?;
            }
            Intent::Confirm => {
                self.flow.confirm(&mut self.session)?;
                self.flow.advance(&mut self.session, &self.operations).await?;
            }
            Intent::Evaluate => self.flow.evaluate(&mut self.session).await?,
            Intent::Score => self.flow.score(&mut self.session).await?,
            Intent::Clear => self.flow.clear(&mut self.session)?,
            Intent::Show | Intent::Help | Intent::Quit => {}
        }
        Ok(())
    }

    /// 一次性分析
    ///
    /// # 参数
    /// - `files`: 要上传的 PDF
    /// - `labels`: 分类后要覆盖的标签（文件名, 标签）
    /// - `auto_confirm`: 为 false 时在终端询问是否确认分类
    ///
    /// # 返回
    /// 返回最终阶段
    pub async fn run_analysis(
        &mut self,
        files: Vec<PathBuf>,
        labels: Vec<(String, String)>,
        auto_confirm: bool,
    ) -> Result<Stage> {
        let documents = read_documents(&files).await?;
        self.flow.upload(&mut self.session, documents).await?;
        if let Err(e) = self.flow.advance(&mut self.session, &self.operations).await {
            println!("{}", self.present());
            return Err(e).context("文档分类失败");
        }

        for (file_name, label) in &labels {
            self.flow
                .edit_label_by_name(&mut self.session, file_name, label)
                .with_context(|| format!("无法修改 {} 的分类", file_name))?;
        }
        println!("{}", self.present());

        if !self.session.has_rfp() {
            warn!("⚠️ 没有 RFP 文档，分析停止在分类阶段");
            return Ok(self.session.stage());
        }
        if !auto_confirm && !ask_confirmation(BufReader::new(tokio::io::stdin())).await? {
            info!("分类未确认，分析结束");
            return Ok(self.session.stage());
        }

        self.flow.confirm(&mut self.session)?;
        let result = self.flow.advance(&mut self.session, &self.operations).await;
        println!("{}", self.present());
        let stage = result.context("分析失败")?;
        Ok(stage)
    }

    /// 交互模式：逐行读取命令直到 quit 或输入结束
    pub async fn run_interactive<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        println!("{}\n", HELP_TEXT);
        println!("{}", self.present());

        let mut lines = input.lines();
        loop {
            print!("pwin> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await.context("读取输入失败")? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.parse::<Intent>() {
                Ok(Intent::Help) => println!("{}", HELP_TEXT),
                Ok(intent) => {
                    if self.dispatch(intent).await == Control::Quit {
                        break;
                    }
                    println!("{}", self.present());
                }
                Err(message) => println!("⚠️ {}", message),
            }
        }
        Ok(())
    }

    /// 结束会话：释放临时目录
    pub fn shutdown(&mut self) {
        let stage = self.session.stage();
        if self.session.batch().is_some() {
            if let Err(e) = self.flow.clear(&mut self.session) {
                warn!("⚠️ 清理临时文件失败: {}", e);
            }
        }
        log_session_end(stage.label());
    }
}

/// 读取磁盘上的文件
async fn read_documents(paths: &[PathBuf]) -> Result<Vec<UploadedDocument>, IntakeError> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let document = UploadedDocument::from_path(path)
            .await
            .map_err(|e| IntakeError::read_failed(path, e))?;
        documents.push(document);
    }
    Ok(documents)
}

/// 询问用户是否确认分类（y/N）
async fn ask_confirmation<R: AsyncBufRead + Unpin>(input: R) -> Result<bool> {
    print!("分类结果是否正确？确认后开始评估 [y/N]: ");
    std::io::stdout().flush().ok();

    let mut lines = input.lines();
    let answer = lines.next_line().await.context("读取输入失败")?;
    Ok(matches!(
        answer.as_deref().map(str::trim),
        Some("y") | Some("Y") | Some("yes")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ScriptedBackend;
    use crate::workflow::Operation;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_pdfs(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, format!("%PDF-1.4 {}", name)).unwrap();
                path
            })
            .collect()
    }

    fn backend() -> ScriptedBackend {
        ScriptedBackend::new()
            .with_label("rfp.pdf", "RFP")
            .with_label("pws.pdf", "PWS")
            .with_evaluation(json!({
                "requirement_met": true,
                "coverage": {"scope": true, "objectives": true, "tasks": true, "deliverables": true},
                "sow_elements_file_name": "rfp.pdf"
            }))
            .with_readiness(json!({"readiness_score": 0.82}))
    }

    #[tokio::test]
    async fn test_dispatch_upload_then_confirm_reaches_scored() {
        let dir = TempDir::new().unwrap();
        let paths = write_pdfs(&dir, &["rfp.pdf", "pws.pdf"]);
        let mut app = App::with_backend(&Config::default(), backend());

        assert_eq!(app.dispatch(Intent::Upload(paths)).await, Control::Continue);
        assert_eq!(app.session().stage(), Stage::Classified);

        app.dispatch(Intent::Confirm).await;
        assert_eq!(app.session().stage(), Stage::Scored);
        assert!(app.present().contains("82.0"));
    }

    #[tokio::test]
    async fn test_errors_become_notices() {
        let mut app = App::with_backend(&Config::default(), backend());

        assert_eq!(app.dispatch(Intent::Score).await, Control::Continue);
        assert_eq!(app.dispatch(Intent::EditLabel { row: 0, label: "RFP".into() }).await, Control::Continue);
        app.dispatch(Intent::Upload(vec![PathBuf::from("/nonexistent/rfp.pdf")]))
            .await;

        let errors = app
            .session()
            .notices()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count();
        assert_eq!(errors, 3);
        assert_eq!(app.session().stage(), Stage::Empty);

        let text = app.present();
        assert!(text.contains("请先完成 RFP 评估"));
        assert!(app.session().notices().is_empty());
    }

    #[tokio::test]
    async fn test_quit_and_clear() {
        let dir = TempDir::new().unwrap();
        let paths = write_pdfs(&dir, &["rfp.pdf"]);
        let mut app = App::with_backend(&Config::default(), backend());

        app.dispatch(Intent::Upload(paths)).await;
        let root = app.session().batch().unwrap().root().to_path_buf();
        app.dispatch(Intent::Clear).await;

        assert_eq!(app.session().stage(), Stage::Empty);
        assert!(!root.exists());
        assert_eq!(app.dispatch(Intent::Quit).await, Control::Quit);
    }

    #[tokio::test]
    async fn test_run_analysis_applies_label_overrides() {
        let dir = TempDir::new().unwrap();
        let paths = write_pdfs(&dir, &["solicitation.pdf", "pws.pdf"]);
        let mut app = App::with_backend(&Config::default(), backend())
            .with_operations(Operations::from_list(&[Operation::Score]));

        let stage = app
            .run_analysis(
                paths,
                vec![("solicitation.pdf".to_string(), "rfp".to_string())],
                true,
            )
            .await
            .unwrap();

        assert_eq!(stage, Stage::Scored);
        assert_eq!(app.session().records().unwrap()[0].doc_type, "RFP");

        let root = app.session().batch().unwrap().root().to_path_buf();
        app.shutdown();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_run_analysis_stops_without_rfp() {
        let dir = TempDir::new().unwrap();
        let paths = write_pdfs(&dir, &["notes.pdf"]);
        let mut app = App::with_backend(&Config::default(), backend());

        let stage = app.run_analysis(paths, Vec::new(), true).await.unwrap();
        assert_eq!(stage, Stage::Classified);
    }

    #[tokio::test]
    async fn test_interactive_session_from_script() {
        let dir = TempDir::new().unwrap();
        let paths = write_pdfs(&dir, &["solicitation.pdf"]);
        let script = format!(
            "upload {}\n\nbogus\nedit 1 RFP\nconfirm\nquit\nclear\n",
            paths[0].display()
        );
        let mut app = App::with_backend(&Config::default(), backend());

        app.run_interactive(script.as_bytes()).await.unwrap();

        // quit 之后的命令不会执行
        assert_eq!(app.session().stage(), Stage::Scored);
    }

    #[tokio::test]
    async fn test_ask_confirmation_answers() {
        assert!(ask_confirmation(&b"y\n"[..]).await.unwrap());
        assert!(ask_confirmation(&b" yes \n"[..]).await.unwrap());
        assert!(!ask_confirmation(&b"n\n"[..]).await.unwrap());
        assert!(!ask_confirmation(&b""[..]).await.unwrap());
    }
}
