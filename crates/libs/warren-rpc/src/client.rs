//! Client-side action conventions.
//!
//! [`RemoteCall`] is the generic primitive — send a request under a method
//! name and await its correlated reply. How it travels (publish to the
//! server's queue, await the reply queue, time out on silence) is the
//! implementor's concern; this crate only fixes the convention.
//!
//! [`ClientActions`] layers the four conventional resource verbs on top.
//! A client type opts in with an empty `impl ClientActions for MyClient {}`;
//! a client wanting a different verb vocabulary simply does not, which
//! removes exactly these four methods and nothing else — decided per type,
//! before any instance exists.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;

/// The generic remote-invocation primitive.
#[async_trait]
pub trait RemoteCall {
    /// Sends `params` to the remote method named `method` and awaits the
    /// correlated reply, yielding its `result` or its structured error.
    async fn remote_call(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// Resource-verb aliases over [`RemoteCall`], in the manner of controller
/// actions. Override any of them in your type to customize.
#[async_trait]
pub trait ClientActions: RemoteCall + Sync {
    async fn index(&self, params: Value) -> Result<Value, RpcError> {
        self.remote_call("index", params).await
    }

    async fn show(&self, params: Value) -> Result<Value, RpcError> {
        self.remote_call("show", params).await
    }

    async fn create(&self, params: Value) -> Result<Value, RpcError> {
        self.remote_call("create", params).await
    }

    async fn update(&self, params: Value) -> Result<Value, RpcError> {
        self.remote_call("update", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl RemoteCall for RecordingClient {
        async fn remote_call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push((method.to_string(), params));
            Ok(json!({ "from": method }))
        }
    }

    impl ClientActions for RecordingClient {}

    #[tokio::test]
    async fn each_verb_forwards_its_name_and_params() {
        let client = RecordingClient::default();

        client.index(json!({ "page": 1 })).await.expect("index");
        client.show(json!({ "id": 7 })).await.expect("show");
        client.create(json!({ "a": 1 })).await.expect("create");
        client.update(json!({ "id": 7, "a": 2 })).await.expect("update");

        let calls = client.calls.lock().expect("calls mutex poisoned");
        assert_eq!(
            *calls,
            vec![
                ("index".to_string(), json!({ "page": 1 })),
                ("show".to_string(), json!({ "id": 7 })),
                ("create".to_string(), json!({ "a": 1 })),
                ("update".to_string(), json!({ "id": 7, "a": 2 })),
            ]
        );
    }

    #[tokio::test]
    async fn verbs_surface_the_remote_result() {
        let client = RecordingClient::default();
        let result = client.create(json!({})).await.expect("create");
        assert_eq!(result, json!({ "from": "create" }));
    }
}
