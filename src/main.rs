use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::process;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use hostsweep::{
    config::ScanConfig,
    output::{self, OutputFormat},
    scanner::{ConcurrentHostScanner, ScanType},
    ScanError, ScanOutcome,
};

fn build_cli() -> Command {
    Command::new("hostsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Discover devices on a network and enumerate their services with nmap")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file (default: ~/.hostsweep.toml)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("NUM")
                .help("Concurrent detailed scans (1-100)")
                .value_parser(clap::value_parser!(usize))
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Per-host timeout in seconds (5-300)")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("top-ports")
                .long("top-ports")
                .value_name("NUM")
                .help("Number of most common ports to probe per host (1-1000)")
                .value_parser(clap::value_parser!(u16))
                .global(true),
        )
        .subcommand(
            Command::new("scan")
                .about("Scan a network range")
                .arg(
                    Arg::new("range")
                        .value_name("RANGE")
                        .help("CIDR range to scan (default: detected local /24)"),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("TYPE")
                        .help("quick (discovery only) or full (discovery plus service scan)")
                        .value_parser(clap::value_parser!(ScanType))
                        .default_value("quick"),
                ),
        )
        .subcommand(
            Command::new("host")
                .about("Detailed scan of a single address")
                .arg(Arg::new("address").value_name("ADDRESS").required(true)),
        )
        .subcommand(
            Command::new("alive")
                .about("Check whether a single address answers")
                .arg(Arg::new("address").value_name("ADDRESS").required(true)),
        )
        .subcommand(Command::new("detect").about("Print the detected local network range"))
}

fn load_config(matches: &ArgMatches) -> Result<ScanConfig, ScanError> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ScanConfig::from_toml_file(path)?,
        None => ScanConfig::load_default_config(),
    };

    if let Some(&threads) = matches.get_one::<usize>("threads") {
        config = config.with_worker_pool_size(threads);
    }
    if let Some(&seconds) = matches.get_one::<u64>("timeout") {
        config = config.with_host_timeout_seconds(seconds);
    }
    if let Some(&top_ports) = matches.get_one::<u16>("top-ports") {
        config = config.with_top_ports(top_ports);
    }

    config.validate()?;
    Ok(config)
}

fn spinner(message: String, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Ctrl-C stops the scan; hosts already detailed are still reported
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    cancel
}

fn report_error(err: &ScanError) {
    if err.is_tool_missing() {
        eprintln!("{} {}", "[!]".bright_red(), err);
        eprintln!(
            "    {}",
            "Set nmap_path in ~/.hostsweep.toml if nmap is installed somewhere unusual.".bright_yellow()
        );
    } else {
        eprintln!("{} {}", "[!] ERROR:".bright_red(), err);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    let default_filter = if matches.get_flag("verbose") { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let format = if matches.get_flag("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            process::exit(2);
        }
    };

    let scanner = ConcurrentHostScanner::with_nmap(config)?;
    let show_progress = format == OutputFormat::Text;

    match matches.subcommand() {
        Some(("scan", sub)) => {
            let scan_type = sub.get_one::<ScanType>("type").copied().unwrap_or_default();
            let range = sub.get_one::<String>("range").map(String::as_str);

            let target = range.unwrap_or("local network");
            let pb = spinner(format!("Running {} scan of {}", scan_type, target), show_progress);
            let result = scanner
                .scan_network_with_cancel(range, scan_type, cancel_on_ctrl_c())
                .await;
            pb.finish_and_clear();

            match format {
                OutputFormat::Json => println!("{}", output::to_json_pretty(&result)?),
                OutputFormat::Text => print!("{}", output::render_text(&result)),
            }

            if result.outcome() == ScanOutcome::Failed {
                process::exit(1);
            }
        }
        Some(("host", sub)) => {
            let address = sub.get_one::<String>("address").map(String::as_str).unwrap_or_default();
            let pb = spinner(format!("Scanning {}", address), show_progress);
            let result = scanner.scan_single_host(address).await;
            pb.finish_and_clear();

            match result {
                Ok(host) => match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&host)?),
                    OutputFormat::Text => print!("{}", output::render_host(&host)),
                },
                Err(e) => {
                    report_error(&e);
                    process::exit(1);
                }
            }
        }
        Some(("alive", sub)) => {
            let address = sub.get_one::<String>("address").map(String::as_str).unwrap_or_default();
            let alive = scanner.is_host_alive(address).await;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "ipAddress": address, "alive": alive }))
                }
                OutputFormat::Text if alive => println!("{} {} is up", "[✓]".bright_green(), address),
                OutputFormat::Text => println!("{} {} did not respond", "[!]".bright_red(), address),
            }

            if !alive {
                process::exit(1);
            }
        }
        Some(("detect", _)) => {
            let range = hostsweep::detect_local_range();
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "networkRange": range })),
                OutputFormat::Text => println!("{}", range),
            }
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}
