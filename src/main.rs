use actix_web::{App, HttpServer, web};
use tracing::{error, info};

use linklet::config;
use linklet::runtime;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::init_config();

    let ctx = match runtime::prepare_startup().await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    // 启动即 drain 一次，再按固定间隔运行
    let daemon_handle = ctx.sync_daemon.spawn();

    if config.server.admin_token.is_empty() {
        info!("Management API is disabled (ADMIN_TOKEN not set)");
    }

    let resolver = ctx.resolver.clone();
    let link_service = ctx.link_service.clone();

    info!(
        "Listening on http://{}:{}",
        config.server.host, config.server.port
    );

    let server_result = match HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(resolver.clone()))
            .app_data(web::Data::new(link_service.clone()))
            .configure(linklet::api::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))
    {
        Ok(server) => server.run().await,
        Err(e) => {
            error!(
                "Failed to bind {}:{}: {}",
                config.server.host, config.server.port, e
            );
            Err(e)
        }
    };

    // 无论正常退出还是出错退出，都先停掉后台任务，再同步等待最后一次 drain
    runtime::perform_shutdown_tasks(&ctx, daemon_handle).await;

    server_result
}
