use authplane::{app, auth::sweeper, config::AuthorityConfig, db, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = AuthorityConfig::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await;

    let state = AppState::with_pool(pool, &config);
    sweeper::spawn(state.store.clone(), config.sweep_interval());

    app::serve(app::build_app(state), config.listen).await
}
