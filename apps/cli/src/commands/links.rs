//! Links command implementation.

use caresphere_core::GuardState;
use caresphere_core::router::nav_links;
use colored::Colorize;

use crate::config::Gateway;

/// Lists the sidebar for the signed-in role.
pub fn execute(gateway: &Gateway) {
    let GuardState::AuthenticatedAs(role) = gateway.router.state() else {
        println!("{}", "Not signed in".yellow());
        return;
    };

    println!("{}", format!("{} portal", role).bold().cyan());
    for link in nav_links(role) {
        println!("  {:<18} {}", link.label, link.path.dimmed());
    }
}
