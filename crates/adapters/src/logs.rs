// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step log retrieval.

use crate::workflow::BackendError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, LogParams};
use kube::Client;

/// Container that runs a step's own command
pub const STEP_CONTAINER: &str = "main";

/// Adapter for reading the log stream of one workflow step
#[async_trait]
pub trait PodLogs: Send + Sync + 'static {
    /// Full log of the step's pod, timestamps included.
    async fn logs(&self, pod_name: &str) -> Result<Vec<u8>, BackendError>;
}

/// Pod logs through the Kubernetes API
#[derive(Clone)]
pub struct KubePodLogs {
    pods: Api<Pod>,
}

impl KubePodLogs {
    pub async fn connect(namespace: &str) -> Result<Self, BackendError> {
        let client = Client::try_default()
            .await
            .map_err(|e| BackendError::Request(format!("failed to create kube client: {}", e)))?;
        Ok(Self::with_client(client, namespace))
    }

    pub fn with_client(client: Client, namespace: &str) -> Self {
        Self { pods: Api::namespaced(client, namespace) }
    }
}

#[async_trait]
impl PodLogs for KubePodLogs {
    async fn logs(&self, pod_name: &str) -> Result<Vec<u8>, BackendError> {
        let params = LogParams {
            container: Some(STEP_CONTAINER.to_string()),
            timestamps: true,
            follow: false,
            ..LogParams::default()
        };
        let body = self.pods.logs(pod_name, &params).await.map_err(|e| match e {
            kube::Error::Api(response) if response.code == 404 => {
                BackendError::NotFound(pod_name.to_string())
            }
            other => BackendError::Request(other.to_string()),
        })?;
        Ok(body.into_bytes())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::PodLogs;
    use crate::workflow::BackendError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct FakePodLogsState {
        logs: HashMap<String, Result<String, String>>,
        delays: HashMap<String, Duration>,
        fetched: Vec<String>,
    }

    /// Fake pod log source. Unknown pods report not-found.
    #[derive(Clone, Default)]
    pub struct FakePodLogs {
        inner: Arc<Mutex<FakePodLogsState>>,
    }

    impl FakePodLogs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_log(&self, pod_name: &str, body: &str) {
            self.inner.lock().logs.insert(pod_name.to_string(), Ok(body.to_string()));
        }

        pub fn set_failure(&self, pod_name: &str, message: &str) {
            self.inner.lock().logs.insert(pod_name.to_string(), Err(message.to_string()));
        }

        /// Hold the fetch for `pod_name` back by `delay` (tokio time).
        pub fn set_delay(&self, pod_name: &str, delay: Duration) {
            self.inner.lock().delays.insert(pod_name.to_string(), delay);
        }

        /// Pods fetched, in completion order
        pub fn fetched(&self) -> Vec<String> {
            self.inner.lock().fetched.clone()
        }
    }

    #[async_trait]
    impl PodLogs for FakePodLogs {
        async fn logs(&self, pod_name: &str) -> Result<Vec<u8>, BackendError> {
            let delay = self.inner.lock().delays.get(pod_name).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut state = self.inner.lock();
            state.fetched.push(pod_name.to_string());
            match state.logs.get(pod_name) {
                Some(Ok(body)) => Ok(body.clone().into_bytes()),
                Some(Err(message)) => Err(BackendError::Request(message.clone())),
                None => Err(BackendError::NotFound(pod_name.to_string())),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePodLogs;
