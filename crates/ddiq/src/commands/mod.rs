//! Command dispatch: CLI args -> aggregator lookups -> output formatting.

pub mod config_cmd;
pub mod lookup;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

use self::lookup::Query;

/// Dispatch a command. Completions are generated before dispatch.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Network(args) => lookup::handle(Query::Network(args.cidr), global).await,
        Command::Ip(args) => lookup::handle(Query::Ip(args.address), global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => unreachable!("completions are handled in main"),
    }
}
