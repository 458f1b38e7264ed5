use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_server::{Config, SqliteTodoRepository, TodoService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_server=debug,tower_http=debug,info")),
        )
        .init();

    let config = Config::from_env();
    let repository = SqliteTodoRepository::connect(&config.database_url).await?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, "listening");

    todo_server::run_until(listener, TodoService::new(repository), shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
