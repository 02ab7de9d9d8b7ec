mod commands;
mod terminal;

use std::sync::Arc;

use commands::{CommandLine, Commands, probe, remediate, watch};
use switchwatch_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine, everything has a default.
    dotenv::dotenv().ok();
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose)?;
    print::banner();

    let cfg: Arc<Config> = Arc::new(commands.config());
    print::configuration(&cfg, &commands);
    print::missing_config_warning(&cfg.device.known_good_config);

    match commands.command.unwrap_or(Commands::Watch) {
        Commands::Watch => {
            print::header("watching switch");
            watch::watch(cfg, &commands).await
        }
        Commands::Probe => {
            print::header("probing switch");
            probe::probe(cfg, &commands).await?;
            print::end_of_program();
            Ok(())
        }
        Commands::Remediate => {
            print::header("forcing remediation");
            let result = remediate::remediate(cfg, &commands).await;
            print::end_of_program();
            result
        }
    }
}
