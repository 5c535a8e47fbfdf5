use actix_web::{get, http::header::ContentType, web::Data, HttpResponse};
use serde::Serialize;

use crate::engine::Snapshots;

fn json_body<T: Serialize>(value: &T) -> HttpResponse {
    match serde_json::to_string(value) {
        Ok(body) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/summary")]
pub async fn get_summary(snapshots: Data<Snapshots>) -> HttpResponse {
    let snapshot = snapshots.global.borrow().clone();
    json_body(&snapshot)
}

#[get("/richlist")]
pub async fn get_rich_list(snapshots: Data<Snapshots>) -> HttpResponse {
    let snapshot = snapshots.rich_list.borrow().clone();
    json_body(&snapshot)
}

#[get("/transfers")]
pub async fn get_transfers(snapshots: Data<Snapshots>) -> HttpResponse {
    let snapshot = snapshots.transfers.borrow().clone();
    json_body(&snapshot)
}

#[get("/account")]
pub async fn get_account(snapshots: Data<Snapshots>) -> HttpResponse {
    let snapshot = snapshots.account.borrow().clone();
    match snapshot.data {
        Some(_) => json_body(&snapshot),
        None => HttpResponse::NotFound().finish(),
    }
}
