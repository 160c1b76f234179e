//! CLI configuration loading and gateway wiring.

use std::path::PathBuf;
use std::sync::Arc;

use caresphere_core::session::FileSlots;
use caresphere_core::{GatewayClient, GatewayConfig, RoleRouter, SessionStore};

/// The gateway pieces every command works with.
pub struct Gateway {
    pub client: GatewayClient,
    pub router: RoleRouter,
}

/// Load and merge configuration, then apply command-line flags.
///
/// Configuration precedence:
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Local config file (./.caresphererc)
/// 4. Global config file (~/.caresphere/config.toml)
/// 5. Defaults
pub fn load_config(api_url: Option<String>, session_file: Option<PathBuf>) -> anyhow::Result<GatewayConfig> {
    let mut config = GatewayConfig::discover_and_load()?;
    if let Some(api_url) = api_url {
        config.api_url = api_url;
    }
    if let Some(session_file) = session_file {
        config.session_file = Some(session_file);
    }
    config.validate()?;
    Ok(config)
}

/// Open the persisted session and build the client and router over it.
pub fn connect(config: &GatewayConfig) -> anyhow::Result<Gateway> {
    let path = match &config.session_file {
        Some(path) => path.clone(),
        None => FileSlots::default_path()?,
    };
    let store = Arc::new(SessionStore::new(Arc::new(FileSlots::with_path(path))));
    let client = GatewayClient::new(config, Arc::clone(&store))?;
    Ok(Gateway { client, router: RoleRouter::new(store) })
}
