//! Login, register and logout commands.

use std::io::{self, Write};

use caresphere_core::{RegisterForm, RoleRouter, Session};
use colored::Colorize;
use rpassword::read_password;

use crate::config::Gateway;

/// Prompts for the account password.
fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    Ok(read_password()?)
}

fn print_signed_in(session: &Session, destination: &str) {
    let name = session.display_name().or(session.subject_id()).unwrap_or("unknown");
    let role = session.role().map(|r| r.as_str()).unwrap_or("unknown");
    println!("{} {} ({})", "Signed in as".green(), name.bold(), role.cyan());
    println!("  Continue to {}", destination.cyan());
}

/// Signs in and reports where the portal would land.
pub async fn login(
    gateway: &Gateway,
    email: &str,
    password: Option<String>,
    return_to: Option<&str>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let session = gateway.client.login(email, &password).await?;
    let destination = match session.role() {
        Some(role) => RoleRouter::post_login_destination(role, return_to),
        None => "/".to_string(),
    };
    print_signed_in(&session, &destination);
    Ok(())
}

/// Registers a new account.
pub async fn register(gateway: &Gateway, form: &RegisterForm) -> anyhow::Result<()> {
    let session = gateway.client.register(form).await?;
    let destination = form.role.home_path();
    print_signed_in(&session, destination);
    Ok(())
}

/// Signs out. Always clears the local session.
pub async fn logout(gateway: &Gateway) -> anyhow::Result<()> {
    let was_signed_in = gateway.client.session().is_authenticated();
    gateway.client.logout().await?;
    if was_signed_in {
        println!("{}", "Signed out".green());
    } else {
        println!("{}", "Not signed in".yellow());
    }
    Ok(())
}
