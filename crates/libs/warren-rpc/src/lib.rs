//! JSON-RPC request/reply conventions over a RabbitMQ broker.
//!
//! This crate layers a JSON-RPC 2.0 request/reply protocol on top of AMQP
//! queues: a server consumes [`RequestEnvelope`]s from its queue, dispatches
//! them through an explicit [`MethodRegistry`], and publishes the correlated
//! [`ReplyEnvelope`] back through the broker's default exchange, routed by
//! the `reply_to`/`correlation_id` pair carried on the inbound message.
//!
//! # Components
//!
//! - [`RpcServer`] — owns a broker channel and queue and runs the consume /
//!   dispatch / reply pipeline.
//! - [`MethodRegistry`] + [`Handler`] — the auditable method table a server
//!   exposes; handlers receive the request `params` and return a result or a
//!   structured [`RpcError`].
//! - [`current_request`] — the optional task-scoped binding of the envelope
//!   currently being dispatched.
//! - [`RemoteCall`] / [`ClientActions`] — client-side conventions mapping the
//!   resource verbs `index`/`show`/`create`/`update` onto a generic remote
//!   call primitive.
//! - [`transform`] — recursive key renaming and null scrubbing over
//!   `serde_json::Value`, used to adapt JSONAPI-shaped results to the wire
//!   error object.
//!
//! # Error tiers
//!
//! Three outcomes are possible for a delivered message, by design:
//!
//! 1. an unstructured fault (malformed payload, handler internal error,
//!    publish failure) is logged and the message dropped — the caller sees
//!    silence and must time out;
//! 2. a handler returning [`HandlerError::Rpc`] produces a structured error
//!    reply;
//! 3. an unknown method always produces a method-not-found error reply.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod message;
pub mod server;
pub mod transform;

pub use client::{ClientActions, RemoteCall};
pub use config::{queue_name, ServerConfig};
pub use context::current_request;
pub use error::{code, HandlerError, RpcError, ServerError};
pub use handler::{Handler, MethodRegistry};
pub use message::{DeliveryProperties, ReplyEnvelope, RequestEnvelope, PROTOCOL_VERSION};
pub use server::RpcServer;
