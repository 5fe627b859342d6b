//! Authgate - issues one authenticated GET request.
//!
//! ```text
//! AUTHGATE_TOKEN=... authgate https://api.example.com/me
//! ```
//!
//! Settings are read from `AUTHGATE_SETTINGS` (default `authgate.json`)
//! plus the `AUTHGATE_*` overrides.

mod policy;

use std::process::ExitCode;
use std::sync::Arc;

use authgate_application::AuthInterceptor;
use authgate_application::ports::CredentialStorage;
use authgate_domain::{AuthMetadata, Credential, CredentialType, OwnerType, RequestSpec};
use authgate_infrastructure::{
    InMemoryCredentialStorage, InMemoryOwnerStorage, ReqwestHttpClient, SettingsRepository,
    SystemClock, init_tracing,
};
use tracing::{error, info};

use crate::policy::{CREDENTIAL_TYPE, OWNER_TYPE, StaticBearerPolicy};

const DEFAULT_OWNER: &str = "default";

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();

    let Some(url) = std::env::args().nth(1) else {
        eprintln!("usage: authgate <url>");
        return Ok(ExitCode::from(2));
    };

    let settings_path =
        std::env::var("AUTHGATE_SETTINGS").unwrap_or_else(|_| "authgate.json".to_string());
    let settings = SettingsRepository::new(settings_path).load().await?;

    let owners = Arc::new(InMemoryOwnerStorage::<String>::new());
    let credentials = Arc::new(InMemoryCredentialStorage::<String>::new());
    if let Ok(token) = std::env::var("AUTHGATE_TOKEN") {
        let owner = DEFAULT_OWNER.to_string();
        owners
            .add_owner(&OwnerType::new(OWNER_TYPE), owner.clone())
            .await;
        credentials
            .store_credentials(
                &owner,
                &CredentialType::new(CREDENTIAL_TYPE),
                &Credential::new(token),
            )
            .await?;
    }

    let interceptor = AuthInterceptor::builder()
        .owner_storage(owners)
        .credential_storage(credentials)
        .policy(Arc::new(StaticBearerPolicy))
        .http_client(Arc::new(ReqwestHttpClient::new(&settings)?))
        .clock(Arc::new(SystemClock::new()))
        .settings(settings)
        .build()?;

    info!("Starting Authgate v{}", env!("CARGO_PKG_VERSION"));

    let request = RequestSpec::get(url).with_auth(AuthMetadata::new(CREDENTIAL_TYPE));
    match interceptor.execute(&request).await {
        Ok(response) => {
            info!(status = response.status, duration = ?response.duration, "request finished");
            println!("{}", response.text());
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) if e.requires_login() => {
            error!(error = %e, "set AUTHGATE_TOKEN to a valid token");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
