use shared_types::ClientConfig;
use std::sync::OnceLock;

static CONFIG: OnceLock<ClientConfig> = OnceLock::new();

/// Path to the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "config.toml";

pub const BACKEND_URL: &str = "BACKEND_URL";
pub const FIREBASE_API_KEY: &str = "FIREBASE_API_KEY";
pub const FIREBASE_AUTH_DOMAIN: &str = "FIREBASE_AUTH_DOMAIN";
pub const FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const FIREBASE_STORAGE_BUCKET: &str = "FIREBASE_STORAGE_BUCKET";
pub const FIREBASE_MESSAGING_SENDER_ID: &str = "FIREBASE_MESSAGING_SENDER_ID";
pub const FIREBASE_APP_ID: &str = "FIREBASE_APP_ID";
pub const FIREBASE_AUTH_EMULATOR_HOST: &str = "FIREBASE_AUTH_EMULATOR_HOST";

/// Load the client config once and return it. Later calls return the same
/// value.
///
/// Native builds read `.env`, then `config.toml`, then environment
/// overrides. Web builds have no filesystem or process environment, so the
/// same variable names are read at compile time.
pub fn load_client_config() -> &'static ClientConfig {
    CONFIG.get_or_init(|| {
        let config = read_config();
        tracing::info!(
            backend_url = %config.backend_url,
            identity_configured = config.identity.is_configured(),
            "client config loaded"
        );
        config
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn read_config() -> ClientConfig {
    let _ = dotenvy::dotenv();
    let mut config = match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => parse_config(&contents),
        Err(e) => {
            tracing::info!("{CONFIG_PATH} not readable ({e}), using defaults");
            ClientConfig::default()
        }
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

#[cfg(target_arch = "wasm32")]
fn read_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    apply_overrides(&mut config, compile_time_var);
    config
}

#[cfg(target_arch = "wasm32")]
fn compile_time_var(key: &str) -> Option<String> {
    let value = match key {
        BACKEND_URL => option_env!("BACKEND_URL"),
        FIREBASE_API_KEY => option_env!("FIREBASE_API_KEY"),
        FIREBASE_AUTH_DOMAIN => option_env!("FIREBASE_AUTH_DOMAIN"),
        FIREBASE_PROJECT_ID => option_env!("FIREBASE_PROJECT_ID"),
        FIREBASE_STORAGE_BUCKET => option_env!("FIREBASE_STORAGE_BUCKET"),
        FIREBASE_MESSAGING_SENDER_ID => option_env!("FIREBASE_MESSAGING_SENDER_ID"),
        FIREBASE_APP_ID => option_env!("FIREBASE_APP_ID"),
        FIREBASE_AUTH_EMULATOR_HOST => option_env!("FIREBASE_AUTH_EMULATOR_HOST"),
        _ => None,
    };
    value.map(str::to_string)
}

/// Parse `config.toml` contents. Unparseable input falls back to defaults.
pub fn parse_config(contents: &str) -> ClientConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!("failed to parse {CONFIG_PATH}: {e}, using defaults");
        ClientConfig::default()
    })
}

/// Overlay variables from `lookup` onto `config`. Blank values are ignored.
pub fn apply_overrides(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(url) = get(BACKEND_URL) {
        config.backend_url = url;
    }
    let identity = &mut config.identity;
    for (key, slot) in [
        (FIREBASE_API_KEY, &mut identity.api_key),
        (FIREBASE_AUTH_DOMAIN, &mut identity.auth_domain),
        (FIREBASE_PROJECT_ID, &mut identity.project_id),
        (FIREBASE_STORAGE_BUCKET, &mut identity.storage_bucket),
        (FIREBASE_MESSAGING_SENDER_ID, &mut identity.messaging_sender_id),
        (FIREBASE_APP_ID, &mut identity.app_id),
        (FIREBASE_AUTH_EMULATOR_HOST, &mut identity.emulator_host),
    ] {
        if let Some(value) = get(key) {
            *slot = Some(value);
        }
    }
}
