//! Status command implementation.

use colored::Colorize;

use crate::config::Gateway;

/// Shows the stored session without its credentials.
pub fn execute(gateway: &Gateway, json_output: bool) -> anyhow::Result<()> {
    let summary = gateway.client.session().summary();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "CareSphere Session".bold().cyan());
    println!();
    if !summary.authenticated {
        println!("  Status: {}", "Not signed in".yellow());
        println!();
        println!("  Sign in with {}", "caresphere-cli login --email <EMAIL>".cyan());
        return Ok(());
    }

    println!("  Status: {}", "Signed in".green());
    if let Some(role) = summary.role {
        println!("  Role: {}", role.as_str().cyan());
        println!("  Home: {}", role.home_path());
    }
    if let Some(name) = &summary.display_name {
        println!("  Name: {}", name);
    }
    if let Some(email) = &summary.email {
        println!("  Email: {}", email);
    }
    if let Some(subject_id) = &summary.subject_id {
        println!("  Subject: {}", subject_id.dimmed());
    }
    Ok(())
}
