//! The server-side request pipeline: consume, parse, dispatch, reply.
//!
//! [`RpcServer`] owns one broker channel and one queue. Each delivered
//! message runs through the broker-free `Dispatcher`: parse the
//! [`RequestEnvelope`], optionally bind it as the current request, resolve
//! the method in the registry, invoke the handler, and build the correlated
//! [`ReplyEnvelope`]. The server then publishes the reply through the
//! default exchange, routed by the inbound message's `reply_to` and stamped
//! with its `correlation_id`.
//!
//! Any fault along the way — malformed payload, handler internal error,
//! missing reply-to, publish failure — is logged under the message's tag
//! scope and the message is dropped without a reply; the loop keeps
//! consuming. There is no retry and no requeue at this layer.

use std::sync::Arc;

use anyhow::Context as _;
use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Consumer};
use serde_json::Value;
use tokio::task::JoinHandle;
use warren_log::TaggedLog;

use crate::config::{queue_name, ServerConfig};
use crate::context;
use crate::error::{HandlerError, RpcError, ServerError};
use crate::handler::{Handler, MethodRegistry};
use crate::message::{DeliveryProperties, ReplyEnvelope, RequestEnvelope};
use crate::transform::scrub_nils;

/// A JSON-RPC server bound to one broker queue.
pub struct RpcServer {
    channel: Channel,
    queue_name: String,
    logger: TaggedLog,
    dispatcher: Dispatcher,
}

impl RpcServer {
    /// Opens a fresh channel on `config.connection` (channels are never
    /// shared across server instances), declares the queue — `queue_base`,
    /// suffixed in test mode — and readies the default exchange as the
    /// reply target.
    pub async fn new(
        config: &ServerConfig,
        queue_base: &str,
        registry: MethodRegistry,
    ) -> Result<Self, ServerError> {
        let channel = config.connection.create_channel().await?;
        let queue_name = queue_name(queue_base, config.test_mode);
        channel
            .queue_declare(
                &queue_name,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await?;

        Ok(Self {
            channel,
            queue_name,
            logger: config.logger.clone(),
            dispatcher: Dispatcher::new(registry, config.request_context),
        })
    }

    /// The declared queue this server consumes from.
    pub fn queue(&self) -> &str {
        &self.queue_name
    }

    /// Begins consuming. With `blocking` the loop occupies the calling task
    /// until the subscription ends and `None` is returned; otherwise the
    /// loop is spawned and its `JoinHandle` returned — aborting it is the
    /// only way to stop consumption. The flag has no effect on per-message
    /// semantics.
    pub async fn start(self, blocking: bool) -> Result<Option<JoinHandle<()>>, ServerError> {
        // no_ack: the broker considers a message delivered once sent, so an
        // unstructured fault drops it instead of triggering redelivery.
        let options = BasicConsumeOptions {
            no_ack: true,
            ..BasicConsumeOptions::default()
        };
        let consumer = self
            .channel
            .basic_consume(&self.queue_name, "", options, FieldTable::default())
            .await?;

        if blocking {
            self.consume_loop(consumer).await;
            Ok(None)
        } else {
            Ok(Some(tokio::spawn(self.consume_loop(consumer))))
        }
    }

    async fn consume_loop(self, mut consumer: Consumer) {
        while let Some(delivery) = consumer.next().await {
            match delivery {
                Ok(delivery) => self.consume(delivery).await,
                Err(error) => self.logger.error(format!("consumer stream error: {error}")),
            }
        }
    }

    /// Handles one delivery. Never returns an error: every outcome is either
    /// a published reply or a logged drop.
    async fn consume(&self, delivery: Delivery) {
        let properties = DeliveryProperties::from(&delivery.properties);
        let correlation_id = properties.correlation_id.clone().unwrap_or_default();
        let log = self.logger.tagged([
            "server".to_string(),
            format!("queue={}", self.queue_name),
            format!("correlation_id={correlation_id}"),
        ]);
        log.debug(format!(
            "receiving request: {}",
            String::from_utf8_lossy(&delivery.data)
        ));

        match self.dispatcher.handle(&delivery.data, &log).await {
            Ok(reply) => {
                if let Err(fault) = self.reply(&reply, &properties).await {
                    log.error(format!("failed to publish reply: {fault:#}"));
                }
            }
            Err(fault) => log.error(format!("dropping request: {fault:#}")),
        }
    }

    /// The single publish path for every reply variant.
    async fn reply(
        &self,
        reply: &ReplyEnvelope,
        properties: &DeliveryProperties,
    ) -> anyhow::Result<()> {
        let routing_key = properties
            .reply_to
            .as_deref()
            .context("delivery carries no reply-to queue")?;
        let payload = serde_json::to_vec(reply)?;

        let mut outbound = BasicProperties::default();
        if let Some(correlation_id) = &properties.correlation_id {
            outbound = outbound.with_correlation_id(correlation_id.clone().into());
        }

        // Default exchange: the routing key is the reply queue's name.
        let _confirm = self
            .channel
            .basic_publish(
                "",
                routing_key,
                BasicPublishOptions::default(),
                &payload,
                outbound,
            )
            .await?;
        Ok(())
    }
}

/// The broker-free half of the pipeline: payload in, reply envelope out.
///
/// `Ok` carries the reply to publish (success, structured error, or
/// method-not-found); `Err` is a tier-1 fault the caller logs and drops.
pub(crate) struct Dispatcher {
    registry: MethodRegistry,
    request_context: bool,
}

impl Dispatcher {
    pub(crate) fn new(registry: MethodRegistry, request_context: bool) -> Self {
        Self {
            registry,
            request_context,
        }
    }

    pub(crate) async fn handle(
        &self,
        payload: &[u8],
        log: &TaggedLog,
    ) -> anyhow::Result<ReplyEnvelope> {
        let envelope: RequestEnvelope =
            serde_json::from_slice(payload).context("malformed request envelope")?;
        self.process_request(envelope, log).await
    }

    /// Binds the request context (when enabled) around the dispatch; the
    /// task-local scope releases the binding on every exit path.
    async fn process_request(
        &self,
        envelope: RequestEnvelope,
        log: &TaggedLog,
    ) -> anyhow::Result<ReplyEnvelope> {
        if self.request_context {
            let bound = envelope.clone();
            context::scope(bound, self.dispatch(envelope, log)).await
        } else {
            self.dispatch(envelope, log).await
        }
    }

    async fn dispatch(
        &self,
        envelope: RequestEnvelope,
        log: &TaggedLog,
    ) -> anyhow::Result<ReplyEnvelope> {
        match self.registry.get(&envelope.method).cloned() {
            Some(handler) => self.call_found_method(handler, envelope, log).await,
            None => Ok(self.reply_method_not_found(envelope, log)),
        }
    }

    async fn call_found_method(
        &self,
        handler: Arc<dyn Handler>,
        envelope: RequestEnvelope,
        log: &TaggedLog,
    ) -> anyhow::Result<ReplyEnvelope> {
        match handler.call(envelope.params.clone()).await {
            Ok(result) => Ok(reply_result(result, envelope, log)),
            Err(HandlerError::Rpc(error)) => {
                log.error(format!("method `{}` returned: {error}", envelope.method));
                Ok(ReplyEnvelope::error(envelope.id, error))
            }
            Err(HandlerError::Internal(fault)) => {
                Err(fault.context(format!("handler `{}` faulted", envelope.method)))
            }
        }
    }

    fn reply_method_not_found(&self, envelope: RequestEnvelope, log: &TaggedLog) -> ReplyEnvelope {
        let error = RpcError::method_not_found(&envelope.method);
        log.error(format!("{error}"));
        ReplyEnvelope::error(envelope.id, error)
    }
}

fn reply_result(result: Value, envelope: RequestEnvelope, log: &TaggedLog) -> ReplyEnvelope {
    match jsonapi_error_data(&result) {
        Some(data) => {
            let error = RpcError::jsonapi(data);
            log.debug(format!("publishing jsonapi error: {error}"));
            ReplyEnvelope::error(envelope.id, error)
        }
        None => {
            log.debug(format!("publishing result: {result}"));
            ReplyEnvelope::result(envelope.id, result)
        }
    }
}

/// A result object carrying a non-empty `errors` array follows the JSONAPI
/// convention and is adapted into the wire error shape: each error object
/// has its null-valued keys stripped (one level deep, per error object).
fn jsonapi_error_data(result: &Value) -> Option<Value> {
    let fields = result.as_object()?;
    let errors = fields.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }

    let scrubbed: Vec<Value> = errors
        .iter()
        .map(|entry| match entry {
            Value::Object(error_fields) => Value::Object(scrub_nils(error_fields)),
            other => other.clone(),
        })
        .collect();

    let mut data = fields.clone();
    data.insert("errors".to_string(), Value::Array(scrubbed));
    Some(Value::Object(data))
}
