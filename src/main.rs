mod config;
mod dispatcher;
mod error;
mod health;
mod outcome;
mod report;
mod stats;
mod verdict;

#[cfg(test)]
mod testutil;

use config::Config;
use error::HarnessError;
use isahc::{config::Configurable, HttpClient};
use log::info;
use tokio::runtime::Builder;

fn main() {
    env_logger::init();
    let config = Config::parse();

    // An interrupted run must never exit 0; partial results are discarded
    // because the dispatcher only hands back outcomes once all probes joined.
    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted");
        std::process::exit(1);
    })
    .expect("Error setting Ctrl+C handler");

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    match runtime.block_on(run(config)) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

async fn run(config: Config) -> Result<i32, HarnessError> {
    let client = HttpClient::builder()
        .timeout(config::REQUEST_TIMEOUT)
        .build()?;

    health::check(&client, &config).await?;
    info!("target {} is ready", config.api);

    println!(
        "Sending {} request(s) to {} with {} concurrent",
        config.requests,
        config.decide_url(),
        config.concurrent
    );

    let (outcomes, total_time) = dispatcher::run(&client, &config).await?;
    let stats = stats::aggregate(&outcomes, total_time);
    let verdict = verdict::evaluate(&stats);

    print!("{}", report::render(&stats, &verdict, &outcomes));
    Ok(report::exit_code(&verdict))
}
