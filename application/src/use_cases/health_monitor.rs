//! Backend readiness polling.
//!
//! A liveness probe runs on a fixed interval and publishes a boolean "ready"
//! gate. The workflow refuses to start a new analysis while the gate is down.

use crate::ports::analysis_gateway::AnalysisGateway;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Read side of the readiness gate.
///
/// Cloneable; every clone observes the latest probe result.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    rx: watch::Receiver<bool>,
}

impl ReadinessGate {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// A gate that is always open (no monitor running).
    pub fn always_ready() -> Self {
        let (_tx, rx) = watch::channel(true);
        Self { rx }
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the next probe result is published.
    pub async fn changed(&mut self) -> bool {
        if self.rx.changed().await.is_err() {
            return self.is_ready();
        }
        *self.rx.borrow_and_update()
    }
}

/// Polls the gateway's health endpoint.
pub struct HealthMonitor {
    gateway: Arc<dyn AnalysisGateway>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, interval: Duration) -> Self {
        Self { gateway, interval }
    }

    /// Run a single probe.
    pub async fn check_once(&self) -> bool {
        match self.gateway.health().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Backend health check failed: {}", e);
                false
            }
        }
    }

    /// Probe now, then keep probing on the configured interval.
    ///
    /// The gate starts closed until the first probe answers. Polling stops
    /// when the returned handle is dropped.
    pub fn spawn(self) -> HealthHandle {
        let (tx, rx) = watch::channel(false);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let ready = self.check_once().await;
                        debug!(ready, "backend health probe");
                        tx.send_replace(ready);
                    }
                }
            }
        });

        HealthHandle {
            gate: ReadinessGate { rx },
            cancel,
            task: Some(task),
        }
    }
}

/// Owner of a running health monitor; stops polling on drop.
pub struct HealthHandle {
    gate: ReadinessGate,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HealthHandle {
    pub fn gate(&self) -> ReadinessGate {
        self.gate.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for HealthHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::analysis_gateway::{
        ChatAnalyzeRequest, ChatFollowupRequest, ChatReply, DeepAnalysisRequest, GatewayError,
        IdentifyRequest,
    };
    use async_trait::async_trait;
    use shoplens_domain::{AnalysisReport, Detections, Identification, ImageAsset};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct HealthOnlyGateway {
        answers: Mutex<VecDeque<bool>>,
        probes: AtomicUsize,
    }

    impl HealthOnlyGateway {
        fn new(answers: Vec<bool>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                probes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AnalysisGateway for HealthOnlyGateway {
        async fn detect(&self, _: &str, _: &ImageAsset) -> Result<Detections, GatewayError> {
            unimplemented!()
        }
        async fn identify(
            &self,
            _: &str,
            _: IdentifyRequest<'_>,
        ) -> Result<Identification, GatewayError> {
            unimplemented!()
        }
        async fn deep_analyze(
            &self,
            _: &str,
            _: DeepAnalysisRequest<'_>,
        ) -> Result<AnalysisReport, GatewayError> {
            unimplemented!()
        }
        async fn chat_analyze(
            &self,
            _: &str,
            _: ChatAnalyzeRequest<'_>,
        ) -> Result<ChatReply, GatewayError> {
            unimplemented!()
        }
        async fn chat_followup(
            &self,
            _: &str,
            _: ChatFollowupRequest<'_>,
        ) -> Result<ChatReply, GatewayError> {
            unimplemented!()
        }
        async fn health(&self) -> Result<(), GatewayError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            let ok = self.answers.lock().unwrap().pop_front().unwrap_or(true);
            if ok {
                Ok(())
            } else {
                Err(GatewayError::ConnectionError("refused".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_check_once() {
        let gateway = Arc::new(HealthOnlyGateway::new(vec![false, true]));
        let monitor = HealthMonitor::new(gateway, Duration::from_secs(5));
        assert!(!monitor.check_once().await);
        assert!(monitor.check_once().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_follows_probes() {
        let gateway = Arc::new(HealthOnlyGateway::new(vec![false, true]));
        let handle = HealthMonitor::new(gateway.clone(), Duration::from_secs(5)).spawn();
        let mut gate = handle.gate();

        assert!(!gate.changed().await);
        assert!(gate.changed().await);
        assert!(handle.is_ready());
        assert_eq!(gateway.probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let gateway = Arc::new(HealthOnlyGateway::new(vec![true]));
        let handle = HealthMonitor::new(gateway.clone(), Duration::from_secs(5)).spawn();
        let mut gate = handle.gate();
        assert!(gate.changed().await);
        drop(handle);

        let probes = gateway.probes.load(Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(gateway.probes.load(Ordering::SeqCst), probes);
    }

    #[test]
    fn test_always_ready_gate() {
        assert!(ReadinessGate::always_ready().is_ready());
    }
}
