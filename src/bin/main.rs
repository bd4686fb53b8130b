use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blogit::config::listen_addr;
use blogit::proxy::{forward, is_forwarded_method, ProxyConfig, ProxyRequest};

struct ProxyState {
    client: reqwest::Client,
    config: ProxyConfig,
}

mod adapter {
    use actix_web::HttpRequest;
    use blogit::proxy::ProxyRequest;

    pub fn actix_to_proxy_request(req: &HttpRequest, body: actix_web::web::Bytes) -> ProxyRequest {
        let headers = req
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();

        ProxyRequest {
            method: req.method().clone(),
            path: req.path().to_string(),
            query: req.query_string().to_string(),
            headers,
            body: body.to_vec(),
        }
    }
}

async fn handle_all(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<ProxyState>,
) -> HttpResponse {
    if !state.config.matches(req.path()) {
        return HttpResponse::NotFound().json(serde_json::json!({"error": "No route found"}));
    }
    if !is_forwarded_method(req.method()) {
        return HttpResponse::MethodNotAllowed()
            .json(serde_json::json!({"error": "Method not allowed"}));
    }

    let proxy_req: ProxyRequest = adapter::actix_to_proxy_request(&req, body);
    match forward(&state.client, &state.config, proxy_req).await {
        Ok(resp) => HttpResponse::build(
            StatusCode::from_u16(resp.status).unwrap_or(StatusCode::BAD_GATEWAY),
        )
        .body(resp.body),
        Err(err) => {
            warn!(path = %req.path(), error = %err, "upstream request failed");
            HttpResponse::BadGateway().json(serde_json::json!({"error": "Upstream unavailable"}))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,blogit=debug")),
        )
        .init();

    let config = ProxyConfig::from_env();
    let addr = listen_addr();
    info!(%addr, prefix = %config.prefix, backend = %config.backend, "starting BlogIt proxy");

    let state = web::Data::new(ProxyState {
        client: reqwest::Client::new(),
        config,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .default_service(web::route().to(handle_all))
    })
    .bind(addr)?
    .run()
    .await
}
