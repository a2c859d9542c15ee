//! Gateway HTTP API.
//!
//! - `POST /evm/{chain_id}`: JSON-RPC request against an EVM chain
//! - `POST /solana/{chain_env}`: JSON-RPC request against a Solana cluster
//! - `GET /health`: registered chains and their endpoints
//!
//! Failures are answered with an [`ErrReply`] whose `code` is also the HTTP
//! status.

use actix_web::{
	error::InternalError,
	http::StatusCode,
	middleware::{Compress, DefaultHeaders, NormalizePath},
	web, App, HttpRequest, HttpResponse, HttpServer,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::{
	models::{ErrReply, RpcRequest},
	services::{
		blockchain::{ClientPool, ClientPoolTrait},
		dispatch::{DispatchError, Dispatcher, PARAMS_ERR},
	},
	utils::logging::error::TraceableError,
};

fn params_reply(message: String) -> HttpResponse {
	HttpResponse::BadRequest().json(ErrReply {
		code: 400,
		reason: PARAMS_ERR.to_string(),
		message,
		metadata: None,
	})
}

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
	let response = params_reply(format!("invalid request body: {}", err));
	InternalError::from_response(err, response).into()
}

fn path_error(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
	let response = params_reply(format!("invalid chain selector: {}", err));
	InternalError::from_response(err, response).into()
}

fn error_response(method: &str, err: DispatchError) -> HttpResponse {
	let reply = err.to_err_reply();
	if reply.code >= 500 {
		error!(method, trace_id = %err.trace_id(), reason = %reply.reason, "{}", reply.message);
	} else {
		debug!(method, reason = %reply.reason, "{}", reply.message);
	}
	let status = StatusCode::from_u16(reply.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
	HttpResponse::build(status).json(reply)
}

async fn evm_handler<P: ClientPoolTrait + 'static>(
	dispatcher: web::Data<Dispatcher<P>>,
	chain_id: web::Path<u64>,
	body: web::Json<RpcRequest>,
) -> HttpResponse {
	let mut request = body.into_inner();
	request.chain_id = Some(chain_id.into_inner());
	match dispatcher.dispatch(&request).await {
		Ok(reply) => HttpResponse::Ok().json(reply),
		Err(err) => error_response(&request.method, err),
	}
}

async fn solana_handler<P: ClientPoolTrait + 'static>(
	dispatcher: web::Data<Dispatcher<P>>,
	chain_env: web::Path<String>,
	body: web::Json<RpcRequest>,
) -> HttpResponse {
	let mut request = body.into_inner();
	request.chain_id = None;
	request.chain_env = Some(chain_env.into_inner());
	match dispatcher.dispatch(&request).await {
		Ok(reply) => HttpResponse::Ok().json(reply),
		Err(err) => error_response(&request.method, err),
	}
}

async fn health_handler<P: ClientPoolTrait + 'static>(
	dispatcher: web::Data<Dispatcher<P>>,
) -> HttpResponse {
	let pool = dispatcher.pool();
	let mut chains = Vec::new();
	for key in pool.chain_keys().await {
		let endpoints = pool.endpoints(&key).await;
		chains.push(json!({
			"chain": key.to_string(),
			"endpoints": endpoints.len(),
			"providers": endpoints.iter().map(|e| e.provider.as_str()).collect::<Vec<_>>(),
		}));
	}
	HttpResponse::Ok().json(json!({ "status": "ok", "chains": chains }))
}

/// Registers the gateway routes on an actix `ServiceConfig`.
pub fn configure_gateway<P: ClientPoolTrait + 'static>(cfg: &mut web::ServiceConfig) {
	cfg.app_data(web::JsonConfig::default().error_handler(json_error))
		.app_data(web::PathConfig::default().error_handler(path_error))
		.route("/evm/{chain_id}", web::post().to(evm_handler::<P>))
		.route("/solana/{chain_env}", web::post().to(solana_handler::<P>))
		.route("/health", web::get().to(health_handler::<P>));
}

pub fn create_gateway_server(
	bind_address: String,
	dispatcher: Dispatcher<ClientPool>,
) -> std::io::Result<actix_web::dev::Server> {
	info!("Starting gateway server on {}", bind_address);

	let dispatcher = web::Data::from(Arc::new(dispatcher));
	Ok(HttpServer::new(move || {
		App::new()
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.wrap(DefaultHeaders::new())
			.app_data(dispatcher.clone())
			.configure(configure_gateway::<ClientPool>)
	})
	.bind(bind_address)?
	.shutdown_timeout(5)
	.run())
}
