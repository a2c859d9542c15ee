//! Metrics server module
//!
//! Serves the gateway's Prometheus registry at `GET /metrics`.

use actix_web::middleware::{Compress, DefaultHeaders, NormalizePath};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use std::sync::Arc;
use tracing::{error, info};

use crate::utils::metrics::PrometheusMetricsSink;

pub type MetricsSinkData = web::Data<Arc<PrometheusMetricsSink>>;

async fn metrics_handler(sink: MetricsSinkData) -> impl Responder {
	sink.update_system_metrics();

	match sink.gather() {
		Ok(buffer) => HttpResponse::Ok()
			.content_type("text/plain; version=0.0.4; charset=utf-8")
			.body(buffer),
		Err(e) => {
			error!("Error gathering metrics: {}", e);
			HttpResponse::InternalServerError().finish()
		}
	}
}

/// Registers the metrics route on an actix `ServiceConfig`.
pub fn configure_metrics(cfg: &mut web::ServiceConfig) {
	cfg.route("/metrics", web::get().to(metrics_handler));
}

pub fn create_metrics_server(
	bind_address: String,
	sink: Arc<PrometheusMetricsSink>,
) -> std::io::Result<actix_web::dev::Server> {
	info!("Starting metrics server on {}", bind_address);

	Ok(HttpServer::new(move || {
		App::new()
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.wrap(DefaultHeaders::new())
			.app_data(web::Data::new(sink.clone()))
			.configure(configure_metrics)
	})
	.workers(2)
	.bind(bind_address)?
	.shutdown_timeout(5)
	.run())
}
