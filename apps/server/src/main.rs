use anyhow::Context;
use campus::kernel::config::load_config;
use campus_logger::Logger;
use campus_server::Server;

#[campus_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let cfg = load_config(None::<&str>).context("Critical: Configuration is malformed")?;

    Server::builder().config(cfg).build().await?.run().await
}
