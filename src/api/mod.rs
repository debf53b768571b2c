//! Thin HTTP surface over the resolution engine.

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::errors::LinkletError;

pub mod links;
pub mod redirect;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(
            web::scope("/api/links")
                .route("", web::post().to(links::create_link))
                .route("", web::get().to(links::list_links))
                .route("/{id}", web::get().to(links::get_link))
                .route("/{id}", web::delete().to(links::delete_link)),
        )
        .service(web::resource("/{id}").route(web::get().to(redirect::handle_redirect)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 校验管理 API 的 Bearer Token（常数时间比较）
pub(crate) fn authorized(req: &HttpRequest) -> bool {
    use subtle::ConstantTimeEq;

    let token = &crate::config::get_config().server.admin_token;
    if token.is_empty() {
        // 未配置 Token 则管理 API 整体关闭
        return false;
    }

    let Some(header) = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let Some(bearer) = header.strip_prefix("Bearer ") else {
        return false;
    };

    bearer.as_bytes().ct_eq(token.as_bytes()).into()
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "error": "Unauthorized",
    }))
}

/// 错误到 HTTP 状态码的映射
pub(crate) fn error_response(err: &LinkletError) -> HttpResponse {
    let body = json!({
        "code": err.code(),
        "error": err.error_type(),
        "message": err.message(),
    });

    match err {
        LinkletError::Validation(_) => HttpResponse::BadRequest().json(body),
        LinkletError::NotFound(_) => HttpResponse::NotFound().json(body),
        LinkletError::DuplicateId(_) => HttpResponse::Conflict().json(body),
        LinkletError::AllocationExhausted(_) => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}
