use prometheus::{Encoder, HistogramOpts, Opts, TextEncoder};
pub use prometheus::{Histogram, HistogramTimer, IntCounter, IntGauge};

pub fn new_counter(name: &str, description: &str, namespace: &str) -> IntCounter {
	let counter_opts = Opts::new(name, description).namespace(namespace);
	let counter = IntCounter::with_opts(counter_opts).expect("failed to create counter");
	prometheus::register(Box::new(counter.clone())).expect("failed to register counter");
	counter
}

pub fn new_gauge(name: &str, description: &str, namespace: &str) -> IntGauge {
	let gauge_opts = Opts::new(name, description).namespace(namespace);
	let gauge = IntGauge::with_opts(gauge_opts).expect("failed to create gauge");
	prometheus::register(Box::new(gauge.clone())).expect("failed to register gauge");
	gauge
}

pub fn new_histogram(name: &str, description: &str, namespace: &str) -> Histogram {
	let histogram_opts = HistogramOpts::new(name, description).namespace(namespace);
	let histogram = Histogram::with_opts(histogram_opts).expect("failed to create histogram");
	prometheus::register(Box::new(histogram.clone())).expect("failed to register histogram");
	histogram
}

pub struct GaugeGuard(&'static IntGauge);

impl GaugeGuard {
	pub fn from_gauge(gauge: &'static IntGauge) -> Self {
		gauge.inc();
		Self(gauge)
	}
}

impl Drop for GaugeGuard {
	fn drop(&mut self) {
		self.0.dec();
	}
}

pub fn metrics_text_payload() -> String {
	let metric_families = prometheus::gather();
	let mut buffer = Vec::new();
	let encoder = TextEncoder::new();
	let _ = encoder.encode(&metric_families, &mut buffer);
	String::from_utf8_lossy(&buffer).to_string()
}
