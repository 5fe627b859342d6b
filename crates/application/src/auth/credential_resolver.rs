//! Credential resolution and refresh.

use std::sync::Arc;

use authgate_domain::{Credential, CredentialType, Owner};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{Instrument, Span, debug, info, warn};

use crate::error::{AuthError, AuthResult};
use crate::ports::{AuthenticationPolicy, Clock, CredentialStorage};

/// Fetches the stored credential for an owner, refreshing it when needed.
///
/// Callers run [`CredentialResolver::resolve`] inside the refresh
/// coordinator's critical section. The refresh itself runs on a spawned
/// task, so a caller dropped mid-refresh cannot leave storage without a
/// credential; the next resolve waits for that task first.
pub struct CredentialResolver<O: Owner> {
    storage: Arc<dyn CredentialStorage<O>>,
    policy: Arc<dyn AuthenticationPolicy<O>>,
    clock: Arc<dyn Clock>,
    expiry_leeway_secs: i64,
    refreshing: Arc<Mutex<()>>,
}

impl<O: Owner> CredentialResolver<O> {
    /// Creates a resolver.
    pub fn new(
        storage: Arc<dyn CredentialStorage<O>>,
        policy: Arc<dyn AuthenticationPolicy<O>>,
        clock: Arc<dyn Clock>,
        expiry_leeway_secs: i64,
    ) -> Self {
        Self {
            storage,
            policy,
            clock,
            expiry_leeway_secs,
            refreshing: Arc::new(Mutex::new(())),
        }
    }

    /// Returns true if the credential may be used without refreshing.
    ///
    /// Both the policy and the credential's own expiry must agree.
    pub fn is_usable(&self, credential: &Credential) -> bool {
        self.policy.is_credential_valid(credential)
            && !credential.is_expired_at(self.clock.now(), self.expiry_leeway_secs)
    }

    /// Resolves the credential for `owner`.
    ///
    /// `rejected` is the credential a server just refused. A refresh is
    /// forced only while storage still holds that same credential; if
    /// another request already replaced it, the replacement is used.
    ///
    /// # Errors
    ///
    /// - [`AuthError::CredentialMissing`] if nothing is stored or the refresh issued nothing.
    /// - [`AuthError::RefreshFailed`] if the refresh callback failed.
    /// - [`AuthError::Storage`] if credential storage fails.
    pub async fn resolve(
        &self,
        owner: &O,
        credential_type: &CredentialType,
        rejected: Option<&Credential>,
    ) -> AuthResult<Credential> {
        // Wait out a refresh whose caller went away.
        drop(self.refreshing.lock().await);

        let stored = self.storage.get_credentials(owner, credential_type).await?;

        let forced = rejected.is_some_and(|r| *r == stored);
        if !forced && self.is_usable(&stored) {
            debug!(%credential_type, token = %stored.preview(), "using stored credential");
            return Ok(stored);
        }

        debug!(%credential_type, forced, "refreshing credential");
        let slot = Arc::clone(&self.refreshing).lock_owned().await;
        let task = tokio::spawn(
            refresh_detached(
                Arc::clone(&self.storage),
                Arc::clone(&self.policy),
                owner.clone(),
                credential_type.clone(),
                stored,
                slot,
            )
            .instrument(Span::current()),
        );
        task.await
            .map_err(|e| AuthError::refresh_failed(format!("refresh task ended: {e}")))?
    }

    /// Removes every credential stored for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if credential storage fails.
    pub async fn forget(&self, owner: &O) -> AuthResult<()> {
        drop(self.refreshing.lock().await);
        self.storage.purge_credentials(owner).await?;
        debug!(?owner, "credentials purged");
        Ok(())
    }
}

// Remove, refresh, then store or restore. Holds `_slot` until storage is consistent again.
async fn refresh_detached<O: Owner>(
    storage: Arc<dyn CredentialStorage<O>>,
    policy: Arc<dyn AuthenticationPolicy<O>>,
    owner: O,
    credential_type: CredentialType,
    stale: Credential,
    _slot: OwnedMutexGuard<()>,
) -> AuthResult<Credential> {
    storage
        .remove_credentials(&owner, &credential_type, &stale)
        .await?;

    let refreshed = match policy
        .refresh_credentials(&owner, &credential_type, stale.clone())
        .await
    {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            warn!(%credential_type, "refresh issued no credential");
            return Err(AuthError::CredentialMissing { credential_type });
        }
        Err(source) => {
            warn!(%credential_type, error = %source, "credential refresh failed");
            restore(storage.as_ref(), &owner, &credential_type, &stale).await;
            return Err(AuthError::RefreshFailed(Arc::from(source)));
        }
    };

    storage
        .store_credentials(&owner, &credential_type, &refreshed)
        .await?;
    info!(%credential_type, token = %refreshed.preview(), "credential refreshed");
    Ok(refreshed)
}

// Puts the stale credential back so a later wave can attempt the refresh again.
async fn restore<O: Owner>(
    storage: &dyn CredentialStorage<O>,
    owner: &O,
    credential_type: &CredentialType,
    stale: &Credential,
) {
    if let Err(error) = storage
        .store_credentials(owner, credential_type, stale)
        .await
    {
        warn!(%credential_type, %error, "could not restore stale credential");
    }
}
