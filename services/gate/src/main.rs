//! gate 二进制入口：仅负责启动应用。

use tg_gate::{app, cli, config::Config, logging};

#[tokio::main]
/// 启动网关服务。
async fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    match cli::dispatch(&args)? {
        cli::CliDispatch::Run => {}
        cli::CliDispatch::Exit => return Ok(()),
    }

    let config = Config::from_env()?;
    let _log_runtime = logging::init("gate")?;
    app::run(config).await
}
