use std::sync::Arc;

use authplane::{
    app,
    client::HttpAuthorityClient,
    config::ServiceConfig,
    db,
    guard::Interceptor,
    order::{self, repo::PgOrderStore},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = ServiceConfig::from_env(8082)?;
    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await;

    let authority = HttpAuthorityClient::new(&config.authority_url, config.authority_timeout())?;
    let router = order::router(
        Arc::new(PgOrderStore::new(pool)),
        Interceptor::new(Arc::new(authority)),
    );

    app::serve(app::with_tracing(router), config.listen).await
}
