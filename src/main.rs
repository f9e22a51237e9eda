mod blockchain;
mod config;
mod report;

use dotenvy::dotenv;
use log::{error, info};
use std::io::{self, Write};

use blockchain::{Blockchain, ChainError};
use config::{Config, ConfigError};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("mining: {0}")]
    Chain(#[from] ChainError),
    #[error("report: {0}")]
    Io(#[from] io::Error),
}

fn run() -> Result<(), AppError> {
    let cfg = Config::from_env()?;
    let pow = cfg.proof_of_work().map_err(ConfigError::from)?;

    info!(
        "⛓️ Building chain: {} blocks at {} difficulty bits",
        cfg.payloads.len() + 1,
        pow.difficulty_bits()
    );

    let mut bc = Blockchain::new(pow)?;
    for payload in &cfg.payloads {
        bc.mine_block(payload.as_str())?;
    }
    bc.validate()?;
    info!("chain complete: {} blocks, all valid", bc.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_report(&bc, cfg.report_format, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() {
    let _ = dotenv();
    env_logger::init();

    if let Err(e) = run() {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
