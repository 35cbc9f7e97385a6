//! Gateway notifier backed by a `tokio::sync::watch` channel.
//!
//! Every refresh bumps a sequence number. The gateway (or anything standing
//! in for it) subscribes and reloads its grant set whenever the value moves.

use async_trait::async_trait;
use grant_access_sdk::{CollaboratorError, GatewayNotifier};
use tokio::sync::watch;
use tracing::trace;

#[derive(Debug)]
pub struct ChannelGatewayNotifier {
    tx: watch::Sender<u64>,
}

impl Default for ChannelGatewayNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelGatewayNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Number of refreshes issued so far.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        *self.tx.borrow()
    }
}

#[async_trait]
impl GatewayNotifier for ChannelGatewayNotifier {
    async fn refresh(&self) -> Result<(), CollaboratorError> {
        // Succeeds without subscribers; the sequence still moves.
        self.tx.send_modify(|seq| *seq += 1);
        trace!(seq = self.sequence(), "gateway refresh signalled");
        Ok(())
    }
}
