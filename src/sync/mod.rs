//! Client-side replica of the event state.
//!
//! A [`FactListener`] applies facts pushed over the relay while a [`Poller`]
//! periodically replaces the view with a fresh snapshot, so a client that
//! missed facts converges again within one poll interval.

mod error;
mod listener;
mod poller;
mod scoreboard;
mod source;
mod view;

pub use self::{
    error::{SyncError, SyncResult},
    listener::{Backoff, FactListener, relay_url},
    poller::Poller,
    scoreboard::ScoreboardRefresher,
    source::{HttpSnapshotSource, ScoreboardSource, SnapshotSource},
    view::{LocalView, ViewHandle},
};
