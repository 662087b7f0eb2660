//! Path-addressed listeners for streaming XML.
//!
//! A [`PathDispatcher`](dispatcher::PathDispatcher) consumes the raw element
//! events produced by [`input::xml::parse`] and calls the
//! [`Listener`](listener::Listener)s registered for the absolute path of the
//! current element, e.g. `/root/a`. Listeners are told when an element at
//! their path is opened or closed and receive the element's text in one
//! piece. An [`ElementRouter`](router::ElementRouter) offers a simpler,
//! unbuffered variant of the same idea.

pub mod attributes;
pub mod config;
pub mod dispatcher;
pub mod input;
pub mod listener;
pub mod path;
pub mod registry;
pub mod router;
pub mod util;
