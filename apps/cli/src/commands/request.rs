//! Request command implementation.

use anyhow::{Context, anyhow, bail};
use caresphere_core::{ApiRequest, GatewayError, Method, RoleRouter, SessionEvent};
use colored::Colorize;

use crate::config::Gateway;

fn parse_method(method: &str) -> anyhow::Result<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| anyhow!("invalid HTTP method '{}'", method))
}

fn parse_query(pair: &str) -> anyhow::Result<(&str, &str)> {
    pair.split_once('=').ok_or_else(|| anyhow!("query parameter '{}' must be KEY=VALUE", pair))
}

/// Sends one request through the gateway and prints the body.
///
/// A session that could not be recovered prints the login redirect and
/// fails the command.
pub async fn execute(
    gateway: &Gateway,
    method: &str,
    path: &str,
    data: Option<&str>,
    query: &[String],
) -> anyhow::Result<()> {
    let mut request = ApiRequest::new(parse_method(method)?, path);
    for pair in query {
        let (key, value) = parse_query(pair)?;
        request = request.query(key, value);
    }
    if let Some(data) = data {
        let body: serde_json::Value = serde_json::from_str(data).context("--data must be valid JSON")?;
        request = request.json_value(body);
    }

    let mut events = gateway.client.subscribe();
    let response = match gateway.client.send(request).await {
        Ok(response) => response,
        Err(err @ GatewayError::SessionExpired { .. }) => {
            let redirect = events
                .try_recv()
                .ok()
                .filter(SessionEvent::ends_session)
                .and_then(|event| RoleRouter::redirect_for_event(&event));
            if let Some(redirect) = redirect {
                println!("{} {}", "Redirect to".yellow(), redirect.to.cyan());
            }
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    let body = response.text();
    if !body.is_empty() {
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{}", body),
        }
    }

    if !response.is_success() {
        bail!("Request failed with {}: {}", response.status(), response.detail());
    }
    Ok(())
}
