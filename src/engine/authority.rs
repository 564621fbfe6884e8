//! Scoped delegated authority.
//!
//! A [`DelegatedAuthority`] is acquired by authorizing a delegate on the
//! settlement collaborator and released by revoking it. The guard borrows
//! the host mutably and dereferences to it, so the single action that
//! consumes the grant runs through the guard. Release happens on every exit
//! path: explicitly through [`DelegatedAuthority::revoke`], or on drop if
//! the holder bailed out early.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::engine::SettlementApi;
use crate::error::CallError;
use crate::types::Address;

/// Live authority grant from `grantor` to `delegate`.
pub struct DelegatedAuthority<'h, H: SettlementApi> {
    host: &'h mut H,
    grantor: Address,
    delegate: Address,
    active: bool,
}

impl<'h, H: SettlementApi> DelegatedAuthority<'h, H> {
    /// Authorize `delegate` to act for `grantor` until `expiry`.
    pub fn grant(
        host: &'h mut H,
        grantor: Address,
        delegate: Address,
        expiry: u64,
    ) -> Result<Self, CallError> {
        host.authorize(grantor, delegate, expiry)?;
        debug!(%grantor, %delegate, expiry, "authority granted");
        Ok(Self {
            host,
            grantor,
            delegate,
            active: true,
        })
    }

    #[inline]
    pub fn delegate(&self) -> Address {
        self.delegate
    }

    /// Revoke the grant, reporting failure to the caller.
    pub fn revoke(mut self) -> Result<(), CallError> {
        self.active = false;
        self.host.revoke(self.grantor, self.delegate)?;
        debug!(grantor = %self.grantor, delegate = %self.delegate, "authority revoked");
        Ok(())
    }
}

impl<H: SettlementApi> Deref for DelegatedAuthority<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &*self.host
    }
}

impl<H: SettlementApi> DerefMut for DelegatedAuthority<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut *self.host
    }
}

impl<H: SettlementApi> Drop for DelegatedAuthority<'_, H> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.host.revoke(self.grantor, self.delegate) {
            warn!(
                grantor = %self.grantor,
                delegate = %self.delegate,
                error = %e,
                "failed to revoke authority on early exit"
            );
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
