use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::error;

use pwin_analyzer::cli::{Cli, Command};
use pwin_analyzer::{logger, App, Config, Stage};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env（不存在时忽略）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 加载配置：默认值 < 配置文件 < 环境变量 < 命令行
    let config = cli.apply_to(Config::load(cli.config.as_deref())?);

    // 初始化日志
    logger::init(config.verbose_logging);

    let operations = cli.command.operations();
    let mut app = App::initialize(config).with_operations(operations);

    let result = match cli.command {
        Command::Analyze {
            files, labels, yes, ..
        } => app
            .run_analysis(files, labels, yes)
            .await
            .map(|stage| {
                if stage < Stage::Scored {
                    tracing::info!("分析停止在阶段: {}", stage);
                }
            }),
        Command::Session { .. } => {
            app.run_interactive(BufReader::new(tokio::io::stdin()))
                .await
        }
    };

    // 无论成功与否都释放临时文件
    app.shutdown();

    if let Err(e) = &result {
        error!("❌ {:#}", e);
    }
    result
}
