use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::api::{authorized, error_response, unauthorized};
use crate::services::{CreateLinkRequest, LinkService};

/// 未接入用户系统时的默认属主
const DEFAULT_OWNER: &str = "admin";

#[derive(Debug, Deserialize)]
pub struct CreateLinkPayload {
    pub id: Option<String>,
    pub long_url: String,
    pub title: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
}

impl OwnerQuery {
    fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or(DEFAULT_OWNER)
    }
}

pub async fn create_link(
    req: HttpRequest,
    payload: web::Json<CreateLinkPayload>,
    service: web::Data<Arc<LinkService>>,
) -> HttpResponse {
    if !authorized(&req) {
        return unauthorized();
    }

    let payload = payload.into_inner();
    let request = CreateLinkRequest {
        id: payload.id,
        long_url: payload.long_url,
        owner: payload.owner.unwrap_or_else(|| DEFAULT_OWNER.to_string()),
        title: payload.title,
    };

    match service.create(request).await {
        Ok(record) => HttpResponse::Created().json(json!({ "data": record })),
        Err(e) => error_response(&e),
    }
}

pub async fn delete_link(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<OwnerQuery>,
    service: web::Data<Arc<LinkService>>,
) -> HttpResponse {
    if !authorized(&req) {
        return unauthorized();
    }

    match service.delete(&path.into_inner(), query.owner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "deleted": true })),
        Err(e) => error_response(&e),
    }
}

pub async fn get_link(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<OwnerQuery>,
    service: web::Data<Arc<LinkService>>,
) -> HttpResponse {
    if !authorized(&req) {
        return unauthorized();
    }

    match service.get_info(&path.into_inner(), query.owner()).await {
        Ok(record) => HttpResponse::Ok().json(json!({ "data": record })),
        Err(e) => error_response(&e),
    }
}

pub async fn list_links(
    req: HttpRequest,
    query: web::Query<OwnerQuery>,
    service: web::Data<Arc<LinkService>>,
) -> HttpResponse {
    if !authorized(&req) {
        return unauthorized();
    }

    match service.list(query.owner()).await {
        Ok(records) => HttpResponse::Ok().json(json!({ "data": records })),
        Err(e) => error_response(&e),
    }
}
