use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, error};

use crate::services::Resolver;

pub async fn handle_redirect(
    path: web::Path<String>,
    resolver: web::Data<Arc<Resolver>>,
) -> impl Responder {
    let id = path.into_inner();

    match resolver.resolve(&id).await {
        Ok(Some(long_url)) => HttpResponse::TemporaryRedirect()
            .insert_header(("Location", long_url))
            .finish(),
        Ok(None) => {
            debug!("Redirect link not found: {}", id);
            not_found_response()
        }
        Err(e) => {
            error!("Resolve failed for {}: {}", id, e);
            HttpResponse::InternalServerError().body("Internal Server Error")
        }
    }
}

fn not_found_response() -> HttpResponse {
    HttpResponse::build(StatusCode::NOT_FOUND)
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .insert_header(("Cache-Control", "public, max-age=60")) // 缓存404
        .body("Not Found")
}
