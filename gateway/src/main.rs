use clap::Parser;
use gateway::{AppState, Config, OpenAiCompleter, app, init_logging};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cfg = Config::parse();

    let completer =
        OpenAiCompleter::new(&cfg.openai_base_url, &cfg.openai_api_key, cfg.sampling());
    let state = AppState {
        completer: Arc::new(completer),
    };

    let addr: SocketAddr = cfg.addr.parse()?;
    info!(%addr, model = %cfg.model, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
