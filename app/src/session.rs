//! Per-user session: connected address, capsule view and creation flow
//!
//! Each entry point maps its outcome to a [`Notification`]. Connect, store and
//! retrieve each allow one call in flight; a second call while one is pending
//! returns `None` and does nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use capsule_client::{CapsuleClient, FlowEvent, FlowState};
use capsule_core::time::{format_unlock_date, parse_local_datetime, to_unix_seconds};
use capsule_core::{Address, CapsuleError, Clock, UnixSeconds, ValidationError};
use time_capsule::{derive_view_state, CapsuleView, ViewStatus};
use tokio::sync::{watch, Mutex, RwLock};

use crate::countdown::Countdown;
use crate::notify::Notification;

/// Clears an in-flight flag when dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct CapsuleSession {
    client: CapsuleClient,
    clock: Arc<dyn Clock>,
    address: RwLock<Option<Address>>,
    view: RwLock<CapsuleView>,
    flow: watch::Sender<FlowState>,
    countdown: Mutex<Option<Countdown>>,
    connecting: AtomicBool,
    submitting: AtomicBool,
    fetching: AtomicBool,
}

impl CapsuleSession {
    pub fn new(client: CapsuleClient, clock: Arc<dyn Clock>) -> Self {
        let (flow, _) = watch::channel(FlowState::Idle);
        Self {
            client,
            clock,
            address: RwLock::new(None),
            view: RwLock::new(CapsuleView::NoCapsule),
            flow,
            countdown: Mutex::new(None),
            connecting: AtomicBool::new(false),
            submitting: AtomicBool::new(false),
            fetching: AtomicBool::new(false),
        }
    }

    pub fn client(&self) -> &CapsuleClient {
        &self.client
    }

    pub async fn address(&self) -> Option<Address> {
        self.address.read().await.clone()
    }

    /// Current view, with the countdown applied while locked
    pub async fn view(&self) -> CapsuleView {
        if let Some(countdown) = self.countdown.lock().await.as_ref() {
            return countdown.current();
        }
        self.view.read().await.clone()
    }

    /// Live countdown updates, while a locked capsule is shown
    pub async fn countdown_updates(&self) -> Option<watch::Receiver<CapsuleView>> {
        self.countdown.lock().await.as_ref().map(Countdown::subscribe)
    }

    pub fn flow(&self) -> FlowState {
        self.flow.borrow().clone()
    }

    pub fn subscribe_flow(&self) -> watch::Receiver<FlowState> {
        self.flow.subscribe()
    }

    /// Connect the wallet and remember its first account
    pub async fn connect_wallet(&self) -> Option<Notification> {
        let _guard = InFlight::acquire(&self.connecting)?;

        let address = match self.client.connect().await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(error = %e, "Wallet connection failed");
                return Some(Notification::from(&e));
            }
        };

        let previous = self.address.write().await.replace(address.clone());
        if previous.as_ref() != Some(&address) {
            self.reset_view().await;
        }

        Some(Notification::success(
            "Wallet connected successfully",
            format!("Connected to {}", address.short()),
        ))
    }

    /// Store `message` unlocking at the local wall-clock time `unlock_at`
    pub async fn store_message(&self, message: &str, unlock_at: &str) -> Option<Notification> {
        let _guard = InFlight::acquire(&self.submitting)?;
        self.flow.send_replace(FlowState::Idle);

        let (owner, unlock_time) = match self.prepare_store(message, unlock_at).await {
            Ok(prepared) => prepared,
            Err(e) => return Some(Notification::from(&e)),
        };

        // the capsule is stored under the session's account; a wallet that has
        // switched accounts since connecting must be reconnected first
        self.advance(FlowEvent::Start);
        match self.client.connect().await {
            Ok(active) if active == owner => {}
            Ok(active) => {
                return Some(self.fail(CapsuleError::WalletRejected {
                    reason: format!(
                        "Wallet account changed to {}, reconnect to continue",
                        active.short()
                    ),
                }))
            }
            Err(e) => return Some(self.fail(e)),
        }
        self.advance(FlowEvent::WalletConnected(owner.clone()));

        self.advance(FlowEvent::Submit);
        match self.client.create_capsule(&owner, message, unlock_time).await {
            Ok(receipt) => {
                self.advance(FlowEvent::Confirmed(receipt.transaction_hash.clone()));
                Some(Notification::success(
                    "Message stored successfully!",
                    format!("Unlocks {}", format_unlock_date(receipt.unlock_time)),
                ))
            }
            Err(e) => Some(self.fail(e)),
        }
    }

    /// Fetch the connected owner's capsule and replace the view
    pub async fn retrieve(&self) -> Option<Notification> {
        let _guard = InFlight::acquire(&self.fetching)?;

        let Some(owner) = self.address().await else {
            return Some(Notification::from(&CapsuleError::Validation(
                ValidationError::NotConnected,
            )));
        };

        match self.client.fetch_capsule(owner.as_str()).await {
            Ok(Some(capsule)) => {
                let view = derive_view_state(Some(&capsule), self.clock.now());
                let description = match view.status() {
                    ViewStatus::Unlocked => "Your time capsule has been unlocked!",
                    _ => "Your time capsule is still locked",
                };
                self.replace_view(view).await;
                Some(Notification::success("Message retrieved", description))
            }
            Ok(None) => {
                self.reset_view().await;
                Some(Notification::no_capsule())
            }
            Err(e) => {
                tracing::warn!(%owner, error = %e, "Failed to retrieve capsule");
                self.reset_view().await;
                Some(Notification::from(&e))
            }
        }
    }

    async fn prepare_store(
        &self,
        message: &str,
        unlock_at: &str,
    ) -> Result<(Address, UnixSeconds), CapsuleError> {
        let owner = self
            .address()
            .await
            .ok_or(CapsuleError::Validation(ValidationError::NotConnected))?;
        if message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        let local = parse_local_datetime(unlock_at)?;
        Ok((owner, to_unix_seconds(local)?))
    }

    fn advance(&self, event: FlowEvent) {
        let current = self.flow.borrow().clone();
        match current.apply(event) {
            Ok(next) => {
                tracing::debug!(from = current.name(), to = next.name(), "Creation flow");
                self.flow.send_replace(next);
            }
            Err(e) => tracing::warn!(error = %e, "Ignored flow event"),
        }
    }

    fn fail(&self, err: CapsuleError) -> Notification {
        tracing::warn!(error = %err, "Failed to store message");
        self.advance(FlowEvent::Failed(err.to_string()));
        Notification::from(&err)
    }

    async fn replace_view(&self, view: CapsuleView) {
        let countdown = Countdown::start(view.clone(), self.clock.clone());
        *self.view.write().await = view;
        // replacing drops, and so aborts, any previous ticker
        *self.countdown.lock().await = countdown;
    }

    async fn reset_view(&self) {
        self.replace_view(CapsuleView::NoCapsule).await;
    }
}
