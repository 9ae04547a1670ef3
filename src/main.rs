use clap::Parser;
use flightlog::cli::commands::Cli;
use flightlog::cli::handlers;
use flightlog::logging;

fn main() {
    let cli = Cli::parse();

    // Config comes first: it names the default log level.
    let config = match handlers::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&config.log.level);

    if let Err(e) = handlers::dispatch(cli, config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
