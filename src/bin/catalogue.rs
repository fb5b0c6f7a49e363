use std::sync::Arc;

use authplane::{
    app,
    catalogue::{self, repo::PgItemStore},
    client::HttpAuthorityClient,
    config::ServiceConfig,
    db,
    guard::Interceptor,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = ServiceConfig::from_env(8081)?;
    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await;

    let authority = HttpAuthorityClient::new(&config.authority_url, config.authority_timeout())?;
    let router = catalogue::router(
        Arc::new(PgItemStore::new(pool)),
        Interceptor::new(Arc::new(authority)),
    );

    app::serve(app::with_tracing(router), config.listen).await
}
