use clap::Parser;
use conncheck::*;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let checker = cli.build_checker().unwrap_or_else(|e| e.exit());
    log::info!("Running {:?} check against {}", cli.check, checker.target());

    let result = checker.check().await;

    if cli.json {
        report::print_json(&result);
    } else {
        report::print_human(&result, cli.verbose);
    }

    std::process::exit(result.exit_code());
}
