// src/main.rs

use std::process::ExitCode;

use diagwatch::{cli, logging, run, types::ExitStatus};

#[tokio::main]
async fn main() -> ExitCode {
    match run_main().await {
        Ok(status) => ExitCode::from(status.code() as u8),
        Err(err) => {
            eprintln!("diagwatch error: {err:?}");
            ExitCode::from(ExitStatus::Failed.code() as u8)
        }
    }
}

async fn run_main() -> anyhow::Result<ExitStatus> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    Ok(run(args).await)
}
