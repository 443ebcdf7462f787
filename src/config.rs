use crate::error::HarnessError;
use std::slice::Iter;
use std::time::Duration;
use url::Url;

/// Per-probe timeout for the decide endpoint.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for the single preflight health check.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

const DEFAULT_API: &str = "http://localhost:8000";
const DEFAULT_REQUESTS: usize = 1000;
const DEFAULT_CONCURRENT: usize = 10;
const DEFAULT_TABLE_KEY: &str = "load-test";

/// Parsed CLI configuration, passed explicitly into the pipeline entry point.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: String,       // target base URL, no trailing slash
    pub requests: usize,   // total probe count
    pub concurrent: usize, // maximum in-flight probes
    pub table_key: String, // opaque routing key forwarded in the probe payload
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: DEFAULT_API.to_string(),
            requests: DEFAULT_REQUESTS,
            concurrent: DEFAULT_CONCURRENT,
            table_key: DEFAULT_TABLE_KEY.to_string(),
        }
    }
}

impl Config {
    /*------------------==| Public Functions |==-------------------------*/

    /// Parse the process arguments, printing help/version or the parse error
    /// and exiting as appropriate.
    pub fn parse() -> Config {
        let args: Vec<String> = std::env::args().skip(1).collect();

        if args.iter().any(|arg| arg == "-h" || arg == "--help") {
            Self::print_help();
            std::process::exit(0);
        }
        if args.iter().any(|arg| arg == "-v" || arg == "--version") {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }

        match Self::from_args(&args) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}\nUse --help for more info", err);
                std::process::exit(1);
            }
        }
    }

    /// Parse a flag list into a validated configuration.
    pub fn from_args(args: &[String]) -> Result<Config, HarnessError> {
        let mut config = Config::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--api" => config.api = Self::next_value(&mut iter, arg)?,
                "--requests" => config.requests = Self::next_parsed(&mut iter, arg)?,
                "--concurrent" => config.concurrent = Self::next_parsed(&mut iter, arg)?,
                "--table-key" => config.table_key = Self::next_value(&mut iter, arg)?,
                other => {
                    return Err(HarnessError::Config(format!("unknown argument: {}", other)));
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn health_url(&self) -> String {
        format!("{}/api/v1/health", self.api)
    }

    pub fn decide_url(&self) -> String {
        format!("{}/api/v1/decide", self.api)
    }

    pub fn print_help() {
        let name = env!("CARGO_PKG_NAME");
        println!("Usage: {} [OPTIONS]", name);
        println!();
        println!("Drives a decision service with concurrent probes and judges");
        println!("the run against fixed latency and reliability targets.");
        println!();
        println!("Options:");
        println!("  --api        <URL>  Target base URL (Default: {})", DEFAULT_API);
        println!("  --requests   <N>    Total probe count (Default: {})", DEFAULT_REQUESTS);
        println!("  --concurrent <N>    Maximum in-flight probes (Default: {})", DEFAULT_CONCURRENT);
        println!("  --table-key  <KEY>  Routing key forwarded in the probe payload");
        println!("  -h, --help          Print help (this)");
        println!("  -v, --version       Print version");
        println!();
        println!("Exits 0 only when the run completes and meets every target.");
    }

    /*-------------------==| Private/Helpers |==----------------------- */

    fn validate(&mut self) -> Result<(), HarnessError> {
        if self.concurrent == 0 {
            return Err(HarnessError::Config(
                "--concurrent must be at least 1".to_string(),
            ));
        }
        let url = Url::parse(&self.api)
            .map_err(|err| HarnessError::Config(format!("invalid --api URL: {}", err)))?;
        // "localhost:8000" parses fine with scheme "localhost"; reject it
        // here instead of letting it surface as a preflight failure.
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(HarnessError::Config(format!(
                "--api URL must start with http:// or https://, got \"{}\"",
                self.api
            )));
        }
        while self.api.ends_with('/') {
            self.api.pop();
        }
        Ok(())
    }

    fn next_value(iter: &mut Iter<String>, flag: &str) -> Result<String, HarnessError> {
        iter.next()
            .cloned()
            .ok_or_else(|| HarnessError::Config(format!("missing value for {}", flag)))
    }

    fn next_parsed(iter: &mut Iter<String>, flag: &str) -> Result<usize, HarnessError> {
        Self::next_value(iter, flag)?
            .parse()
            .map_err(|_| HarnessError::Config(format!("invalid value for {}", flag)))
    }
}
