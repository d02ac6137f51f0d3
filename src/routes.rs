use actix_web::{HttpResponse, get, http::StatusCode, post, web};

use crate::converter::Direction;
use crate::form::{ConversionForm, ConversionResponse, ErrorResponse, HealthResponse, ServerInfo};
use crate::page::{self, Notice};
use crate::service::ConversionService;

pub struct AppState {
    pub service: ConversionService,
    pub server: ServerInfo,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(fahrenheit_to_celsius)
        .service(celsius_to_fahrenheit)
        .service(index)
        .service(submit)
        .service(health);
}

#[get("/fahrenheit/{value}/celsius")]
async fn fahrenheit_to_celsius(
    state: web::Data<AppState>,
    value: web::Path<String>,
) -> HttpResponse {
    convert_json(&state, Direction::FahrenheitToCelsius, &value).await
}

#[get("/celsius/{value}/fahrenheit")]
async fn celsius_to_fahrenheit(
    state: web::Data<AppState>,
    value: web::Path<String>,
) -> HttpResponse {
    convert_json(&state, Direction::CelsiusToFahrenheit, &value).await
}

async fn convert_json(state: &AppState, direction: Direction, raw: &str) -> HttpResponse {
    match state.service.convert(direction, raw).await {
        Ok(outcome) => HttpResponse::Ok().json(ConversionResponse::new(&outcome, &state.server)),
        Err(e) => {
            log::info!("Rejected conversion input: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

#[get("/")]
async fn index(state: web::Data<AppState>) -> HttpResponse {
    let history = state.service.history().await;
    html(
        StatusCode::OK,
        page::render(Notice::None, &history, &state.server),
    )
}

#[post("/")]
async fn submit(state: web::Data<AppState>, form: web::Form<ConversionForm>) -> HttpResponse {
    let Some(raw) = form.value() else {
        let history = state.service.history().await;
        return html(
            StatusCode::OK,
            page::render(Notice::None, &history, &state.server),
        );
    };

    let converted = match form.direction() {
        Ok(direction) => state.service.convert(direction, raw).await,
        Err(e) => Err(e),
    };

    match converted {
        Ok(outcome) => html(
            StatusCode::OK,
            page::render(
                Notice::Result(outcome.value),
                &outcome.history,
                &state.server,
            ),
        ),
        Err(e) => {
            log::info!("Rejected conversion input: {}", e);
            let history = state.service.history().await;
            html(
                StatusCode::BAD_REQUEST,
                page::render(Notice::Invalid(&e.to_string()), &history, &state.server),
            )
        }
    }
}

#[get("/health")]
async fn health(state: web::Data<AppState>) -> HttpResponse {
    let database = state.service.store_reachable().await;
    HttpResponse::Ok().json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        server: &state.server,
    })
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}
