use std::env;
use std::process;

use roda_dagar::{Config, KalenderSource};

mod cli;

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "roda_dagar=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    setup_logging();

    let args = cli::parse(env::args().skip(1).collect());
    let config = Config::default();

    let result = match KalenderSource::new(config.base_url.as_str()) {
        Ok(source) => roda_dagar::run(&source, &config, &args.years, args.include_weekends).await,
        Err(err) => Err(err.into()),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
