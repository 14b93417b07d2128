//! # shiptrack-client
//!
//! Client-side half of the live update path. An [`UpdateChannel`] keeps one
//! logical push connection per authenticated session, reconnecting with
//! capped exponential backoff; the [`Reconciler`] merges push-delivered and
//! poll-derived updates so the displayed list is never duplicated or stale
//! and each status change surfaces exactly one notification; the
//! [`ShipmentPoller`] refreshes on a fixed interval regardless of channel
//! health, recovering any push event lost in flight.

pub mod backoff;
pub mod channel;
pub mod message;
pub mod notify;
pub mod poller;
pub mod reconcile;
pub mod transport;

pub use backoff::ReconnectBackoff;
pub use channel::{ChannelState, UpdateChannel, UpdateEvent};
pub use notify::{Toast, ToastCenter, ToastKind, UserNotifier};
pub use poller::{ShipmentApi, ShipmentPoller, TrackResult};
pub use reconcile::Reconciler;
pub use transport::{ChannelConnection, ChannelTransport, WebSocketTransport};
