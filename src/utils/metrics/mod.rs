//! Metrics for outbound provider calls and the host process.
//!
//! - [`MetricsSink`] is the seam the call envelope reports into.
//! - [`PrometheusMetricsSink`] owns its own registry (no process-global state),
//!   so several pools can coexist in one process and tests stay isolated.
//! - [`NoopMetricsSink`] discards everything.

pub mod server;

use prometheus::{
	Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;
use sysinfo::{Disks, System};

/// Label names attached to every call metric, in registration order.
pub const CALL_LABELS: [&str; 10] = [
	"client_id",
	"app_id",
	"zone",
	"cluster",
	"chain_id",
	"chain_name",
	"chain_env",
	"provider",
	"method",
	"status",
];

/// Terminal status of an instrumented call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallStatus {
	Success,
	Failure,
}

impl CallStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			CallStatus::Success => "success",
			CallStatus::Failure => "failure",
		}
	}
}

/// Endpoint-level labels; the method and status are supplied per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CallLabels {
	pub client_id: String,
	pub app_id: String,
	pub zone: String,
	pub cluster: String,
	pub chain_id: String,
	pub chain_name: String,
	pub chain_env: String,
	pub provider: String,
}

/// Receives one record per outbound call.
pub trait MetricsSink: Send + Sync {
	fn record_call(&self, labels: &CallLabels, method: &str, status: CallStatus, elapsed: Duration);
}

/// Sink that drops every record
#[derive(Debug, Default, Clone)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
	fn record_call(&self, _: &CallLabels, _: &str, _: CallStatus, _: Duration) {}
}

/// Prometheus-backed sink with call metrics and host gauges.
#[derive(Clone)]
pub struct PrometheusMetricsSink {
	registry: Registry,
	calls_total: IntCounterVec,
	call_duration: HistogramVec,
	cpu_usage: Gauge,
	memory_usage: Gauge,
	memory_usage_percent: Gauge,
	disk_usage: Gauge,
	disk_usage_percent: Gauge,
}

fn register_gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge, prometheus::Error> {
	let gauge = Gauge::new(name, help)?;
	registry.register(Box::new(gauge.clone()))?;
	Ok(gauge)
}

impl PrometheusMetricsSink {
	pub fn new() -> Result<Self, prometheus::Error> {
		let registry = Registry::new();

		let calls_total = IntCounterVec::new(
			Opts::new(
				"web3_gateway_calls_total",
				"Outbound provider calls by endpoint, method and status",
			),
			&CALL_LABELS,
		)?;
		registry.register(Box::new(calls_total.clone()))?;

		let call_duration = HistogramVec::new(
			HistogramOpts::new(
				"web3_gateway_call_duration_seconds",
				"Latency of outbound provider calls",
			)
			.buckets(vec![
				0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
			]),
			&CALL_LABELS,
		)?;
		registry.register(Box::new(call_duration.clone()))?;

		Ok(Self {
			cpu_usage: register_gauge(&registry, "cpu_usage_percentage", "Current CPU usage percentage")?,
			memory_usage: register_gauge(&registry, "memory_usage_bytes", "Memory usage in bytes")?,
			memory_usage_percent: register_gauge(
				&registry,
				"memory_usage_percentage",
				"Memory usage percentage",
			)?,
			disk_usage: register_gauge(&registry, "disk_usage_bytes", "Used disk space in bytes")?,
			disk_usage_percent: register_gauge(
				&registry,
				"disk_usage_percentage",
				"Disk usage percentage",
			)?,
			registry,
			calls_total,
			call_duration,
		})
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Refreshes the host gauges from a fresh `sysinfo` snapshot.
	pub fn update_system_metrics(&self) {
		let mut sys = System::new_all();
		sys.refresh_all();

		self.cpu_usage.set(sys.global_cpu_usage() as f64);

		let total_memory = sys.total_memory();
		let used_memory = sys.used_memory();
		self.memory_usage.set(used_memory as f64);
		self.memory_usage_percent.set(percentage(used_memory, total_memory));

		let disks = Disks::new_with_refreshed_list();
		let (total, available) = disks.list().iter().fold((0u64, 0u64), |(t, a), disk| {
			(t + disk.total_space(), a + disk.available_space())
		});
		let used = total.saturating_sub(available);
		self.disk_usage.set(used as f64);
		self.disk_usage_percent.set(percentage(used, total));
	}

	/// Encodes every registered metric in the Prometheus text format.
	pub fn gather(&self) -> Result<Vec<u8>, prometheus::Error> {
		let mut buffer = Vec::new();
		TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
		Ok(buffer)
	}
}

impl MetricsSink for PrometheusMetricsSink {
	fn record_call(&self, labels: &CallLabels, method: &str, status: CallStatus, elapsed: Duration) {
		let values = [
			labels.client_id.as_str(),
			labels.app_id.as_str(),
			labels.zone.as_str(),
			labels.cluster.as_str(),
			labels.chain_id.as_str(),
			labels.chain_name.as_str(),
			labels.chain_env.as_str(),
			labels.provider.as_str(),
			method,
			status.as_str(),
		];
		self.calls_total.with_label_values(&values).inc();
		self.call_duration
			.with_label_values(&values)
			.observe(elapsed.as_secs_f64());
	}
}

fn percentage(part: u64, whole: u64) -> f64 {
	if whole == 0 {
		0.0
	} else {
		(part as f64 / whole as f64) * 100.0
	}
}
