use webroot::config::ServerConfig;
use webroot::server::Listener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = match ServerConfig::load(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };

    let listener = match Listener::bind(cfg).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(fatal = e.is_fatal(), "{e}");
            std::process::exit(1);
        }
    };

    listener
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
