//! 终端渲染
//!
//! 把 `SessionView` 渲染为纯文本；选中的操作只决定显示哪些结果区块。

use std::fmt::Write;

use crate::presentation::view::{
    Band, EvaluationView, Gauge, ReadinessView, SectionView, SessionView,
};
use crate::utils::logging::format_bytes;
use crate::workflow::{NoticeLevel, Operation, Operations};

/// 仪表条宽度（字符）
const GAUGE_WIDTH: usize = 40;

/// 渲染整个视图
pub fn render(view: &SessionView, operations: &Operations) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "pWin.ai PDF 分析 | 阶段: {}", view.stage);
    let selected: Vec<&str> = operations.selected().into_iter().map(Operation::label).collect();
    let _ = writeln!(out, "操作: {}", selected.join(" → "));
    let _ = writeln!(out, "{}", "=".repeat(60));

    render_files(&mut out, view);

    if operations.shows(Operation::Classify) && !view.classification.is_empty() {
        render_classification(&mut out, view);
    }
    if view.rfp_missing {
        banner(&mut out, "❌", "未找到 RFP 文档。请上传 RFP 文档，或将某个文档标记为 RFP。");
    }
    if view.needs_reconfirmation {
        banner(&mut out, "⚠️", "分类已修改，请重新确认 (confirm)。");
    } else if !view.classification.is_empty() && !view.confirmed && !view.rfp_missing {
        banner(&mut out, "💡", "请检查分类结果，确认无误后输入 confirm。");
    }

    if let Some(evaluation) = &view.evaluation {
        match evaluation {
            EvaluationView::Met { .. } if operations.shows(Operation::Evaluate) => {
                render_evaluation(&mut out, evaluation)
            }
            // 未满足时评分无法继续，只要流程走到了评估就显示原因
            EvaluationView::NotMet { .. } if operations.needs_evaluation() => {
                render_evaluation(&mut out, evaluation)
            }
            _ => {}
        }
    }

    if let Some(readiness) = &view.readiness {
        if operations.shows(Operation::Score) {
            render_readiness(&mut out, readiness);
        }
    }

    if !view.notices.is_empty() {
        let _ = writeln!(out);
        for notice in &view.notices {
            let _ = writeln!(out, "{} {}", notice_icon(notice.level), notice.message);
        }
    }

    let commands: Vec<&str> = view.enabled.iter().map(|k| k.command()).collect();
    let _ = writeln!(out, "\n可用操作: {}", commands.join(", "));
    out
}

/// 渲染一个文本仪表
///
/// 形如 `Readiness Score  ██████████░░░░  82.0 (+12.0) [绿]`
pub fn render_gauge(gauge: &Gauge) -> String {
    let clamped = gauge.value.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(GAUGE_WIDTH - filled));

    let delta = match gauge.delta {
        Some(d) => format!(" ({:+.1})", d),
        None => String::new(),
    };
    format!(
        "{:<16} {} {:>5.1}{} [{}]",
        gauge.title,
        bar,
        gauge.value,
        delta,
        band_label(gauge.band())
    )
}

fn band_label(band: Band) -> &'static str {
    match band {
        Band::Red => "红",
        Band::Yellow => "黄",
        Band::Green => "绿",
    }
}

fn notice_icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "ℹ️",
        NoticeLevel::Success => "✅",
        NoticeLevel::Warning => "⚠️",
        NoticeLevel::Error => "❌",
    }
}

fn banner(out: &mut String, icon: &str, message: &str) {
    let _ = writeln!(out, "\n{} {}", icon, message);
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title);
    let _ = writeln!(out, "{}", "─".repeat(60));
}

fn render_files(out: &mut String, view: &SessionView) {
    if view.files.is_empty() {
        let _ = writeln!(out, "\n尚未上传文件。输入 upload <file.pdf>... 开始分析。");
        return;
    }

    section(out, &format!("📚 已上传文件 ({})", view.files.len()));
    for file in &view.files {
        if file.size < file.original_size {
            let _ = writeln!(
                out,
                "  - {} ({}，原始 {})",
                file.file_name,
                format_bytes(file.size),
                format_bytes(file.original_size)
            );
        } else {
            let _ = writeln!(out, "  - {} ({})", file.file_name, format_bytes(file.size));
        }
    }
    for line in &view.intake_log {
        let _ = writeln!(out, "    · {}", line);
    }
}

fn render_classification(out: &mut String, view: &SessionView) {
    section(out, "Classification Analysis");

    let name_width = view
        .classification
        .iter()
        .map(|r| r.file_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("File Name".len());
    let _ = writeln!(out, "  {:>3}  {:<name_width$}  {}", "#", "File Name", "Classification");
    for row in &view.classification {
        let _ = writeln!(
            out,
            "  {:>3}  {:<name_width$}  {}",
            row.row, row.file_name, row.doc_type
        );
    }
    let _ = writeln!(out, "  可选标签: {}", view.catalog.join(" | "));
}

fn render_evaluation(out: &mut String, evaluation: &EvaluationView) {
    section(out, "RFP Evaluation");
    match evaluation {
        EvaluationView::Met {
            file_name,
            elements,
            coverage,
        } => {
            let _ = writeln!(out, "✅ Requirement Met!");
            let _ = writeln!(out, "\n  覆盖 SOW 要素的文件: {}", file_name);
            for (key, text) in elements {
                let _ = writeln!(out, "\n  [{}]\n  {}", key, text);
            }
            let _ = writeln!(out, "\n  Coverage:");
            for (name, covered) in coverage {
                let _ = writeln!(out, "    {} {}", if *covered { "✓" } else { "✗" }, name);
            }
        }
        EvaluationView::NotMet { diagnostic } => {
            let _ = writeln!(
                out,
                "❌ Requirement not met. 请上传覆盖 scope、objectives、tasks 和 deliverables 的文档。"
            );
            let _ = writeln!(out, "\n  诊断信息:");
            for line in diagnostic.lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }
    }
}

fn render_readiness(out: &mut String, readiness: &ReadinessView) {
    section(out, "Readiness Score");
    let _ = writeln!(out, "  {}", render_gauge(&readiness.gauge));

    if !readiness.reasons.is_empty() {
        let _ = writeln!(out, "\n  Reasons:");
        for (key, text) in &readiness.reasons {
            let _ = writeln!(out, "  [{}] {}", key, text);
        }
    }

    let _ = writeln!(out, "\n  Section Scores:");
    match &readiness.sections {
        SectionView::Gauges(gauges) => {
            for gauge in gauges {
                let _ = writeln!(out, "  {}", render_gauge(gauge));
            }
        }
        SectionView::Message(message) => {
            let _ = writeln!(out, "  ⚠️ {}", message);
        }
        SectionView::Unavailable => {
            let _ = writeln!(out, "  (无分项评分)");
        }
    }

    if !readiness.suggestions.is_empty() {
        let _ = writeln!(out, "\n  Suggestions:");
        for (key, text) in &readiness.suggestions {
            let _ = writeln!(out, "  [{}] {}", key, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::project;
    use crate::presentation::view::ClassificationRow;
    use crate::workflow::SessionState;

    #[test]
    fn test_gauge_bar_fill_and_delta() {
        let gauge = Gauge {
            title: "Readiness Score".to_string(),
            value: 82.0,
            delta: Some(12.0),
        };
        let line = render_gauge(&gauge);
        assert_eq!(line.matches('█').count(), 33);
        assert_eq!(line.matches('░').count(), 7);
        assert!(line.contains("82.0 (+12.0) [绿]"));
    }

    #[test]
    fn test_gauge_clamps_out_of_range_values() {
        let line = render_gauge(&Gauge::from_score("Tasks", 1.3));
        assert_eq!(line.matches('█').count(), GAUGE_WIDTH);
        let line = render_gauge(&Gauge::from_score("Tasks", -0.2));
        assert_eq!(line.matches('░').count(), GAUGE_WIDTH);
        assert!(line.ends_with("[红]"));
    }

    #[test]
    fn test_empty_session_prompts_for_upload() {
        let text = render(&project(&SessionState::new()), &Operations::all());
        assert!(text.contains("尚未上传文件"));
        assert!(text.contains("可用操作: upload, clear"));
    }

    #[test]
    fn test_classification_hidden_when_not_selected() {
        let mut view = project(&SessionState::new());
        view.classification = vec![ClassificationRow {
            row: 1,
            file_name: "rfp.pdf".to_string(),
            doc_type: "RFP".to_string(),
        }];

        let shown = render(&view, &Operations::all());
        assert!(shown.contains("Classification Analysis"));
        assert!(shown.contains("rfp.pdf"));

        let hidden = render(&view, &Operations::from_list(&[Operation::Score]));
        assert!(!hidden.contains("Classification Analysis"));
    }

    #[test]
    fn test_header_lists_selected_operations() {
        let view = project(&SessionState::new());
        let text = render(&view, &Operations::all());
        assert!(text.contains("操作: Classify PDFs → Evaluate RFP → Readiness Score"));

        let ops = Operations::from_list(&[Operation::Score, Operation::Classify]);
        assert!(render(&view, &ops).contains("操作: Classify PDFs → Readiness Score\n"));
    }

    #[test]
    fn test_not_met_diagnostic_is_rendered() {
        let mut view = project(&SessionState::new());
        view.evaluation = Some(EvaluationView::NotMet {
            diagnostic: "{\n  \"requirement_met\": false\n}".to_string(),
        });

        let text = render(&view, &Operations::from_list(&[Operation::Score]));
        assert!(text.contains("Requirement not met"));
        assert!(text.contains("\"requirement_met\": false"));
    }

    #[test]
    fn test_section_message_is_rendered_as_warning() {
        let mut view = project(&SessionState::new());
        view.readiness = Some(ReadinessView {
            gauge: Gauge::from_score("Readiness Score", 0.4),
            reasons: vec![("scope".to_string(), "too vague".to_string())],
            sections: SectionView::Message("only partial sections".to_string()),
            suggestions: Vec::new(),
        });

        let text = render(&view, &Operations::all());
        assert!(text.contains("[scope] too vague"));
        assert!(text.contains("⚠️ only partial sections"));
        assert!(text.contains("[红]"));
    }
}
