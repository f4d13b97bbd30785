use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use log::{error, info};

use crate::{
    cli::{usage_error_message, Cli},
    session::SkillSession,
    tools::{logging, SkillConfig, SkillError, ToolResult},
};

pub mod api_models;
pub mod cli;
pub mod client;
pub mod session;
pub mod tools;

fn emit(result: &ToolResult, pretty: bool) -> ! {
    println!("{}", result.to_json(pretty));
    std::process::exit(result.exit_code())
}

#[tokio::main]
async fn main() {
    logging::init("info");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => emit(
                &ToolResult::failure(&SkillError::invalid_input(usage_error_message(&e))),
                false,
            ),
        },
    };

    let config = match SkillConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            emit(
                &ToolResult::failure(&SkillError::invalid_input(format!("{:#}", e))),
                cli.pretty,
            )
        }
    };

    let session = match SkillSession::new(config) {
        Ok(session) => session,
        Err(e) => emit(&ToolResult::failure(&e), cli.pretty),
    };

    let result = tokio::select! {
        result = session.run(&cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            ToolResult::failure(&SkillError::Interrupted)
        }
    };

    emit(&result, cli.pretty)
}
