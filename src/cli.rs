//! 命令行参数

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::workflow::{Operation, Operations};

/// pWin.ai PDF 分析工具
#[derive(Parser, Debug)]
#[command(name = "pwin", about = "pWin.ai PDF 分析工具：分类、RFP 评估、就绪度评分", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML 配置文件
    #[arg(long, global = true, env = "PWIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// 后端地址（覆盖 BACKEND_URL）
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// 后端 API Key（覆盖 API_KEY）
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// 显示调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 一次性分析一批 PDF
    Analyze {
        /// 要上传的 PDF 文件
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 要展示的操作（classify, evaluate, score），缺省为全部
        #[arg(long, value_delimiter = ',')]
        ops: Vec<Operation>,

        /// 覆盖分类标签，格式 文件名=标签，可重复
        #[arg(long = "label", value_name = "NAME=TYPE", value_parser = parse_label_override)]
        labels: Vec<(String, String)>,

        /// 不询问，直接确认分类
        #[arg(short, long)]
        yes: bool,
    },

    /// 交互模式
    Session {
        /// 要展示的操作（classify, evaluate, score），缺省为全部
        #[arg(long, value_delimiter = ',')]
        ops: Vec<Operation>,
    },
}

impl Cli {
    /// 用命令行参数覆盖配置
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        config
    }
}

impl Command {
    pub fn operations(&self) -> Operations {
        let ops = match self {
            Command::Analyze { ops, .. } | Command::Session { ops } => ops,
        };
        if ops.is_empty() {
            Operations::all()
        } else {
            Operations::from_list(ops)
        }
    }
}

/// 解析 `文件名=标签`
fn parse_label_override(raw: &str) -> Result<(String, String), String> {
    let (name, label) = raw
        .split_once('=')
        .ok_or_else(|| format!("格式应为 NAME=TYPE: {}", raw))?;
    let (name, label) = (name.trim(), label.trim());
    if name.is_empty() || label.is_empty() {
        return Err(format!("文件名和标签都不能为空: {}", raw));
    }
    Ok((name.to_string(), label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_with_labels_and_ops() {
        let cli = Cli::try_parse_from([
            "pwin",
            "analyze",
            "rfp.pdf",
            "pws.pdf",
            "--ops",
            "classify,score",
            "--label",
            "rfp.pdf=RFP Response",
            "--yes",
        ])
        .unwrap();

        let ops = cli.command.operations();
        assert!(ops.classify && ops.score && !ops.evaluate);
        match cli.command {
            Command::Analyze {
                files, labels, yes, ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(
                    labels,
                    vec![("rfp.pdf".to_string(), "RFP Response".to_string())]
                );
                assert!(yes);
            }
            Command::Session { .. } => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "pwin",
            "session",
            "--backend-url",
            "http://backend:9000",
            "-v",
        ])
        .unwrap();

        let config = cli.apply_to(Config::default());
        assert_eq!(config.backend_url, "http://backend:9000");
        assert_eq!(config.api_key, "YOUR_API_KEY");
        assert!(config.verbose_logging);
        assert_eq!(cli.command.operations(), Operations::all());
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["pwin", "analyze"]).is_err());
        assert!(Cli::try_parse_from(["pwin", "analyze", "a.pdf", "--label", "a.pdf"]).is_err());
        assert!(Cli::try_parse_from(["pwin", "analyze", "a.pdf", "--ops", "summarize"]).is_err());
    }
}
