use clap::builder::{BoolishValueParser, FalseyValueParser};
use clap::Parser;
use ferrous_lookup_domain::CliOverrides;
use ferrous_lookup_infrastructure::system::ResolvConfReader;
use std::process::ExitCode;
use tracing::debug;

mod bootstrap;
mod di;
mod output;
mod request;

#[derive(Parser, Debug)]
#[command(name = "ferrous-lookup")]
#[command(version)]
#[command(about = "Ferrous Lookup - single DNS query over UDP, TCP, TLS, HTTPS, QUIC or HTTP/3")]
pub(crate) struct Cli {
    /// Domain name to look up. A literal IP address is looked up as PTR.
    pub domain: String,

    /// Server: IP[:port], udp://, tcp://, tls://, https://, h3://, quic://, sdns://
    pub server: Option<String>,

    /// Either a bootstrap IP for the server host, or a DNSCrypt provider
    /// name followed by the server public key
    #[arg(value_name = "BOOTSTRAP_IP | PROVIDER_NAME SERVER_PK", num_args = 0..=2)]
    pub extra: Vec<String>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<String>,

    /// Record type (A, AAAA, MX, TXT, ...)
    #[arg(short = 't', long = "type", env = "RRTYPE")]
    pub record_type: Option<String>,

    /// Query class
    #[arg(long, env = "CLASS")]
    pub class: Option<String>,

    /// Query timeout in seconds
    #[arg(long, env = "TIMEOUT")]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Set to 0 to skip TLS certificate verification
    #[arg(long, env = "VERIFY", hide = true, value_parser = BoolishValueParser::new())]
    pub verify: Option<bool>,

    /// Prefer HTTP/3 for DNS-over-HTTPS
    #[arg(long, env = "HTTP3", value_parser = FalseyValueParser::new())]
    pub http3: bool,

    /// Set the DNSSEC OK bit
    #[arg(long, env = "DNSSEC", value_parser = FalseyValueParser::new())]
    pub dnssec: bool,

    /// Client subnet to send, e.g. 203.0.113.0/24
    #[arg(long, env = "SUBNET")]
    pub subnet: Option<String>,

    /// Extra EDNS option as CODE[:HEX]
    #[arg(long = "edns-opt", env = "EDNSOPT")]
    pub edns_option: Option<String>,

    /// Pad the query to a multiple of 128 bytes
    #[arg(long, env = "PAD", value_parser = FalseyValueParser::new())]
    pub padding: bool,

    /// Print the result as JSON
    #[arg(long, env = "JSON", value_parser = FalseyValueParser::new())]
    pub json: bool,

    /// Debug logging
    #[arg(short = 'v', long, env = "VERBOSE", value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else {
            self.log_level.clone()
        };

        CliOverrides {
            server: self.server.clone(),
            record_type: self.record_type.clone(),
            class: self.class.clone(),
            timeout: self.timeout,
            insecure: self.insecure || self.verify == Some(false),
            http3: self.http3,
            dnssec: self.dnssec,
            padding: self.padding,
            subnet: self.subnet.clone(),
            edns_option: self.edns_option.clone(),
            json: self.json,
            log_level,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config.logging);

    let server = match config.lookup.server.clone() {
        Some(server) => server,
        None => ResolvConfReader::new().first_nameserver().await?,
    };
    let request = request::build(&cli.domain, &server, &cli.extra, &config.lookup)?;

    debug!(domain = %request.domain, server = %request.server, "Starting lookup");

    let services = di::LookupServices::new();
    let outcome = services.lookup.execute(&request).await?;

    if config.lookup.json {
        println!("{}", output::render_json(&outcome)?);
    } else {
        print!("{}", output::render_text(&outcome));
    }
    Ok(())
}
