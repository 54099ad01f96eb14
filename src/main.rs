use anyhow::{Context, Result};
use highlight_import::utils::logging;
use highlight_import::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let report = App::new(config)?.run().await?;
    tracing::debug!("{:?}", report);

    Ok(())
}
