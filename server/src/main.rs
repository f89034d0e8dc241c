use clap::Parser;
use tokio::net::TcpListener;

use todo_server::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    todo_server::init_tracing();

    let store = config.open_store()?;
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, db = ?config.db, "todo-server listening");

    todo_server::serve(listener, store, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
        tracing::info!("shutting down");
    })
    .await?;
    Ok(())
}
