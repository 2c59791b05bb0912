//! # Notification Actors
//!
//! Admin broadcasts ([`AdminNotification`]) and the registered device push
//! tokens ([`FcmToken`]). Delivery itself happens in
//! [`Notifier`](crate::notifications::Notifier), driven by the
//! `DispatchAdminNotification` job.
//!
//! A push token is stored once: registering a token that exists moves it to
//! the new owner and device.

pub mod entity;
pub mod error;

pub use entity::NotificationAction;
pub use error::*;

use crate::clients::{FcmTokenClient, NotificationClient};
use crate::model::{AdminNotification, FcmToken};
use canopy_actors::ResourceActor;

pub fn new_notifications(
    buffer: usize,
) -> (ResourceActor<AdminNotification>, NotificationClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, NotificationClient::new(client))
}

pub fn new_fcm_tokens(buffer: usize) -> (ResourceActor<FcmToken>, FcmTokenClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, FcmTokenClient::new(client))
}
