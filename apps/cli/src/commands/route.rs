//! Route command implementation.

use caresphere_core::Decision;
use colored::Colorize;

use crate::config::Gateway;

/// Prints what the guard decides for `path` with the stored session.
pub fn execute(gateway: &Gateway, path: &str) {
    match gateway.router.navigate(path) {
        Decision::Render(route) => println!("{} {}", "render".green(), route.path()),
        Decision::Redirect(redirect) => match redirect.return_to {
            Some(return_to) => println!("{} {} (return to {})", "redirect".yellow(), redirect.to, return_to),
            None => println!("{} {}", "redirect".yellow(), redirect.to),
        },
    }
}
