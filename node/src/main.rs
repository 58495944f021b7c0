use colored::{Color, Colorize};
use node::{
	cli::{build_cli, setup_logging_and_tracing, CliCommand},
	tokio_runtime,
};

const RED_COLOR: Color = Color::TrueColor { r: 230, g: 0, b: 34 };

fn main() -> Result<(), anyhow::Error> {
	let runtime = tokio_runtime();
	rustls::crypto::ring::default_provider()
		.install_default()
		.expect("Failed to install ring as the default crypto provider");
	match runtime {
		Ok(runtime) => {
			let _ = runtime.block_on(main_impl()).map_err(|e| anyhow::anyhow!("Main loop failed: {:?}", e));
			Ok(())
		},
		Err(e) => {
			log::error!("Failed to initialize tokio runtime: {:?}", e);
			Err(e)
		},
	}
}

async fn main_impl() -> Result<(), anyhow::Error> {
	setup_logging_and_tracing();
	#[cfg(feature = "openssl-support")]
	openssl_probe::init_ssl_cert_env_vars();

	log::info!("Starting media search node {}", env!("CARGO_PKG_VERSION"));
	let app = build_cli().version(env!("CARGO_PKG_VERSION"));
	let matches = app.get_matches();
	let command = match CliCommand::parse_cli_args(matches) {
		Ok(command) => command,
		Err(err) => {
			eprintln!("Failed to parse command arguments: {err:?}");
			std::process::exit(1);
		},
	};

	let return_code: i32 = if let Err(err) = command.execute().await {
		eprintln!("{} Command failed: {:?}\n", "\u{2718}".color(RED_COLOR), err);
		1
	} else {
		0
	};

	std::process::exit(return_code)
}
