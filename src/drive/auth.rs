//! Service-account token minting.
//!
//! The sync runs as a Google service account that has read access to the
//! content folder. One access token is minted at startup and used for the
//! whole run; `yup-oauth2` is async, so it is driven on a throwaway
//! current-thread runtime before the blocking pipeline starts.

use super::api::DriveError;
use std::path::Path;

/// Read-only Drive scope; the sync never writes.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Mint a bearer token from a service-account key JSON file.
pub fn service_account_token(credentials: &Path) -> Result<String, DriveError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let key = yup_oauth2::read_service_account_key(credentials)
            .await
            .map_err(|source| DriveError::Credentials {
                path: credentials.display().to_string(),
                source,
            })?;
        let authenticator = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await?;
        let token = authenticator
            .token(&[DRIVE_READONLY_SCOPE])
            .await
            .map_err(|e| DriveError::Auth(e.to_string()))?;
        token
            .token()
            .map(str::to_owned)
            .ok_or_else(|| DriveError::Auth("token endpoint returned no access token".into()))
    })
}
