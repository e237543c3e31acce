use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use python_fetch::common::config::FetchConfig;
use python_fetch::common::console::Console;
use python_fetch::pipeline;

mod cli;

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let args = cli::Cli::parse();

    // 初始化日志，用户可见的输出走 stdout，日志走 stderr
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    let config = FetchConfig::from(&args);
    debug!("运行配置: {:?}", config);

    let console = Arc::new(Console::stdout());
    let result = pipeline::run(&config, Arc::clone(&console))
        .await
        .context("获取失败！");

    match result {
        Ok(report) => debug!("本次计划 {} 个，跳过 {} 个", report.planned, report.skipped),
        Err(e) => {
            error!("{:?}", e);
            console.error(format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
