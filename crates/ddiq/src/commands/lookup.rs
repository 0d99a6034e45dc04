//! `network` and `ip` handlers: one aggregated lookup, then render.

use tracing::debug;

use ddiq_core::{
    Aggregator, ConfirmingGateway, CoreError, Gateway, IpReport, NetworkReport, WapiGateway,
};

use super::util::{self, PromptConfirm};
use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::render;

/// What to look up. Identifiers are validated before any connection is made.
#[derive(Debug)]
pub enum Query {
    Network(String),
    Ip(String),
}

impl Query {
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Network(cidr) => ddiq_core::parse_cidr(cidr).map(drop),
            Self::Ip(ip) => ddiq_core::parse_ip(ip).map(drop),
        }
    }

    fn progress_message(&self) -> String {
        match self {
            Self::Network(cidr) => format!("Looking up network {cidr}..."),
            Self::Ip(ip) => format!("Looking up address {ip}..."),
        }
    }
}

enum Report {
    Network(Box<NetworkReport>),
    Ip(Box<IpReport>),
}

async fn run_query<G: Gateway>(
    aggregator: &Aggregator<G>,
    query: &Query,
) -> Result<Report, CoreError> {
    match query {
        Query::Network(cidr) => aggregator
            .find_network(cidr)
            .await
            .map(|r| Report::Network(Box::new(r))),
        Query::Ip(ip) => aggregator
            .find_ip(ip)
            .await
            .map(|r| Report::Ip(Box::new(r))),
    }
}

pub async fn handle(query: Query, global: &GlobalOpts) -> Result<(), CliError> {
    query.validate()?;

    let gateway_config = config::resolve_gateway_config(global)?;
    let call_timeout = gateway_config.timeout;
    let gateway = WapiGateway::connect(&gateway_config)?;
    debug!(url = %gateway_config.base_url, confirm = global.confirm, "gateway ready");

    let spinner = util::spinner(global, query.progress_message());
    let result = if global.confirm {
        let gateway = ConfirmingGateway::new(gateway, PromptConfirm);
        run_query(
            &Aggregator::new(gateway).with_call_timeout(call_timeout),
            &query,
        )
        .await
    } else {
        run_query(
            &Aggregator::new(gateway).with_call_timeout(call_timeout),
            &query,
        )
        .await
    };
    spinner.finish_and_clear();

    let styles = output::styles(global.color);
    let rendered = match result? {
        Report::Network(report) => output::render_single(
            global.output,
            report.as_ref(),
            |r| render::render_network(r, &styles),
            |r| r.network.to_string(),
        )?,
        Report::Ip(report) => output::render_single(
            global.output,
            report.as_ref(),
            |r| render::render_ip(r, &styles),
            |r| r.ip.to_string(),
        )?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}
