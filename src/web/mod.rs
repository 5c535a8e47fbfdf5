pub mod rest;

use actix_cors::Cors;
use actix_web::middleware;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;

use crate::engine::Snapshots;

/// Serves the engine's snapshots as read-only JSON. Presentation lives
/// elsewhere; this surface only hands out the latest complete view.
pub async fn start_web_server(snapshots: Snapshots, port: u16) -> std::io::Result<()> {
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(snapshots.clone()))
            .service(rest::get_summary)
            .service(rest::get_rich_list)
            .service(rest::get_transfers)
            .service(rest::get_account)
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
