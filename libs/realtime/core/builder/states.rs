//! Type-state markers for [`ChannelBuilder`](super::ChannelBuilder)
//!
//! `build()` only exists once both a URL and a router have been supplied.

use super::RoutingBuilder;
use crate::traits::MessageRouter;

pub trait UrlState {}

pub struct NoUrl;
impl UrlState for NoUrl {}

pub struct HasUrl;
impl UrlState for HasUrl {}

pub trait RouterState {}

pub struct NoRouter;
impl RouterState for NoRouter {}

/// Router plus its handler registrations
pub struct Routed<R: MessageRouter> {
    pub(crate) router: R,
    pub(crate) routing: RoutingBuilder<R>,
}

impl<R: MessageRouter> RouterState for Routed<R> {}
