//! 用户意图
//!
//! 会话状态只能通过意图修改；交互模式下每行输入解析为一个意图。

use std::path::PathBuf;
use std::str::FromStr;

/// 用户意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// 上传一批 PDF（替换当前批次）
    Upload(Vec<PathBuf>),
    /// 重新分类当前批次
    Classify,
    /// 按选中的操作尽可能向前推进
    Analyze,
    /// 修改分类表第 `row` 行（从 1 开始）的标签
    EditLabel { row: usize, label: String },
    Confirm,
    Evaluate,
    Score,
    Clear,
    Show,
    Help,
    Quit,
}

/// 与会话状态相关的操作种类，用于计算可用操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Upload,
    Classify,
    Analyze,
    EditLabel,
    Confirm,
    Evaluate,
    Score,
    Clear,
}

impl IntentKind {
    /// 交互模式下的命令名
    pub fn command(self) -> &'static str {
        match self {
            IntentKind::Upload => "upload",
            IntentKind::Classify => "classify",
            IntentKind::Analyze => "analyze",
            IntentKind::EditLabel => "edit",
            IntentKind::Confirm => "confirm",
            IntentKind::Evaluate => "evaluate",
            IntentKind::Score => "score",
            IntentKind::Clear => "clear",
        }
    }
}

/// 交互模式帮助信息
pub const HELP_TEXT: &str = "\
可用命令:
  upload <file.pdf>...      上传 PDF 并自动分类
  classify                  重新分类当前文件
  edit <行号> <标签>        修改分类标签，例如: edit 2 RFP Response
  confirm                   确认分类并继续评估、评分
  analyze                   按选中的操作继续推进
  evaluate                  RFP 需求评估
  score                     就绪度评分
  clear                     清空会话
  show                      显示当前状态
  help                      显示本帮助
  quit                      退出";

impl FromStr for Intent {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts
            .next()
            .ok_or_else(|| "请输入命令，输入 help 查看帮助".to_string())?
            .to_lowercase();
        let rest: Vec<&str> = parts.collect();

        let intent = match command.as_str() {
            "upload" | "u" => {
                if rest.is_empty() {
                    return Err("用法: upload <file.pdf>...".to_string());
                }
                Intent::Upload(rest.iter().map(|p| PathBuf::from(*p)).collect())
            }
            "classify" => Intent::Classify,
            "analyze" | "run" => Intent::Analyze,
            "edit" | "e" => {
                let (row, label) = rest
                    .split_first()
                    .ok_or_else(|| "用法: edit <行号> <标签>".to_string())?;
                let row: usize = row
                    .parse()
                    .map_err(|_| format!("无效的行号: {}", row))?;
                if row == 0 {
                    return Err("行号从 1 开始".to_string());
                }
                let label = label.join(" ");
                if label.is_empty() {
                    return Err("用法: edit <行号> <标签>".to_string());
                }
                Intent::EditLabel { row, label }
            }
            "confirm" | "y" => Intent::Confirm,
            "evaluate" | "eval" => Intent::Evaluate,
            "score" => Intent::Score,
            "clear" | "reset" => Intent::Clear,
            "show" | "status" | "ls" => Intent::Show,
            "help" | "h" | "?" => Intent::Help,
            "quit" | "exit" | "q" => Intent::Quit,
            other => return Err(format!("未知命令: {}，输入 help 查看帮助", other)),
        };
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit_keeps_multi_word_label() {
        let intent: Intent = "edit 2 RFP Response".parse().unwrap();
        assert_eq!(
            intent,
            Intent::EditLabel {
                row: 2,
                label: "RFP Response".to_string()
            }
        );
    }

    #[test]
    fn test_parse_upload_paths() {
        let intent: Intent = "upload a.pdf dir/b.pdf".parse().unwrap();
        assert_eq!(
            intent,
            Intent::Upload(vec![PathBuf::from("a.pdf"), PathBuf::from("dir/b.pdf")])
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<Intent>().is_err());
        assert!("upload".parse::<Intent>().is_err());
        assert!("edit 0 RFP".parse::<Intent>().is_err());
        assert!("edit x RFP".parse::<Intent>().is_err());
        assert!("edit 1".parse::<Intent>().is_err());
        assert!("frobnicate".parse::<Intent>().is_err());
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        assert_eq!("CONFIRM".parse::<Intent>().unwrap(), Intent::Confirm);
        assert_eq!("Quit".parse::<Intent>().unwrap(), Intent::Quit);
    }
}
