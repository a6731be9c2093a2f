//! The wallet connectivity side of the engine: a single writer of the
//! current [`AccountContext`].

use alloy_primitives::Address;
use tokio::sync::watch;
use tracing::info;

use crate::models::{AccountContext, NetworkId};

/// Owns the account context channel that valuation watchers follow.
///
/// Updates that leave the context unchanged are not announced, so watchers
/// only re-evaluate on real changes.
pub struct WalletSession {
    context: watch::Sender<AccountContext>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSession {
    pub fn new() -> Self {
        let (context, _) = watch::channel(AccountContext::disconnected());
        Self { context }
    }

    fn update(&self, next: AccountContext) -> bool {
        self.context.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    /// Returns whether the context changed.
    pub fn connect(&self, address: Address, network: NetworkId) -> bool {
        let changed = self.update(AccountContext::connected(address, network));
        if changed {
            info!(address = %address, network = %network, "wallet connected");
        }
        changed
    }

    /// Move the connected account to `network`. Ignored while disconnected.
    pub fn switch_network(&self, network: NetworkId) -> bool {
        let current = self.current_account();
        let Some(address) = current.address.filter(|_| current.is_connected) else {
            return false;
        };
        let changed = self.update(AccountContext::connected(address, network));
        if changed {
            info!(network = %network, "network switched");
        }
        changed
    }

    pub fn disconnect(&self) -> bool {
        let changed = self.update(AccountContext::disconnected());
        if changed {
            info!("wallet disconnected");
        }
        changed
    }

    pub fn current_account(&self) -> AccountContext {
        *self.context.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AccountContext> {
        self.context.subscribe()
    }
}
