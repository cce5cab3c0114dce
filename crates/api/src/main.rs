use std::process::ExitCode;

use venuity_api::config::AppConfig;
use venuity_api::lifecycle::Application;
use venuity_api::routes;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            // Tracing is not initialized until the environment is known.
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    venuity_observability::init(config.environment);

    let _db = match venuity_infra::db::connect(&config.database).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "database connection failed");
            return ExitCode::FAILURE;
        }
    };

    let app = match Application::build(&config, routes::router()).await {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(error = %err, port = config.port, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "server running in {} mode on port {}",
        app.environment(),
        app.port()
    );

    app.run_until_stopped().await.exit_code()
}
