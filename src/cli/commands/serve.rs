//! HTTP service command.

use std::net::SocketAddr;

use tokio::runtime::Runtime;

use crate::server::{self, AppState};

use super::{Cli, build_services};

/// Run the HTTP service until Ctrl-C
pub fn cmd_serve(rt: &Runtime, cli: &Cli, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    let services = build_services(cli)?;
    let addr = bind.unwrap_or(services.config.server.bind);
    let state = AppState::new(services.resolver, services.history);

    rt.block_on(server::serve(state, addr, server::ctrl_c()))?;
    Ok(())
}
