#![allow(unused_imports, dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use processor_job::worker::{
    HostLifetime, MessageHandler, PollingWorker, WorkerConfig, WorkerResult,
};
use queue::{QueueClient, QueueError, QueueMessage, QueueResult};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Setup test logging
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Builds `count` messages with IDs `{prefix}-0` .. `{prefix}-{count - 1}`
pub fn messages(prefix: &str, count: usize) -> Vec<QueueMessage> {
    (0..count)
        .map(|i| QueueMessage {
            message_id: format!("{prefix}-{i}"),
            receipt_handle: format!("receipt-{prefix}-{i}"),
            body: format!("body of {prefix}-{i}"),
            receive_count: 1,
        })
        .collect()
}

/// One scripted answer to a receive call
pub enum ReceiveStep {
    Batch(Vec<QueueMessage>),
    Fail,
}

/// A receive call as observed by the queue
#[derive(Debug, Clone, Copy)]
pub struct ReceiveCall {
    pub at: Instant,
    pub max_messages: u32,
    pub visibility_timeout: Duration,
}

/// Queue that answers receive calls from a script and records every call
///
/// Once the script is exhausted every receive returns an empty batch, or fails when the
/// queue was built with `failing_forever`.
pub struct ScriptedQueue {
    script: Mutex<VecDeque<ReceiveStep>>,
    fail_when_exhausted: bool,
    stale_receipts: HashSet<String>,
    receive_calls: Mutex<Vec<ReceiveCall>>,
    deleted: Mutex<Vec<String>>,
    delete_attempts: AtomicUsize,
}

impl ScriptedQueue {
    pub fn new(script: Vec<ReceiveStep>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fail_when_exhausted: false,
            stale_receipts: HashSet::new(),
            receive_calls: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            delete_attempts: AtomicUsize::new(0),
        }
    }

    pub fn failing_forever() -> Self {
        Self {
            fail_when_exhausted: true,
            ..Self::new(Vec::new())
        }
    }

    /// Deletes for these message IDs fail with `ReceiptInvalid`
    pub fn with_stale_receipts(mut self, message_ids: &[&str]) -> Self {
        self.stale_receipts = message_ids.iter().map(ToString::to_string).collect();
        self
    }

    pub fn receive_calls(&self) -> Vec<ReceiveCall> {
        self.receive_calls.lock().unwrap().clone()
    }

    pub fn receive_count(&self) -> usize {
        self.receive_calls.lock().unwrap().len()
    }

    /// Offsets of every receive call from `start`
    pub fn receive_offsets(&self, start: Instant) -> Vec<Duration> {
        self.receive_calls()
            .iter()
            .map(|call| call.at.duration_since(start))
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn delete_attempts(&self) -> usize {
        self.delete_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl QueueClient for ScriptedQueue {
    async fn receive_messages(
        &self,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        self.receive_calls.lock().unwrap().push(ReceiveCall {
            at: Instant::now(),
            max_messages,
            visibility_timeout,
        });

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(ReceiveStep::Batch(messages)) => Ok(messages),
            Some(ReceiveStep::Fail) => Err(QueueError::Unavailable("scripted failure".into())),
            None if self.fail_when_exhausted => {
                Err(QueueError::Unavailable("scripted failure".into()))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn delete_message(&self, message_id: &str, _receipt_handle: &str) -> QueueResult<()> {
        self.delete_attempts.fetch_add(1, Ordering::SeqCst);
        if self.stale_receipts.contains(message_id) {
            return Err(QueueError::ReceiptInvalid {
                message_id: message_id.to_string(),
            });
        }
        self.deleted.lock().unwrap().push(message_id.to_string());
        Ok(())
    }

    async fn send_message(&self, _body: &str) -> QueueResult<String> {
        unimplemented!("the worker never sends")
    }
}

/// Queue whose receive calls never complete
#[derive(Default)]
pub struct HangingQueue {
    receive_calls: AtomicUsize,
}

impl HangingQueue {
    pub fn receive_count(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl QueueClient for HangingQueue {
    async fn receive_messages(
        &self,
        _max_messages: u32,
        _visibility_timeout: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }

    async fn delete_message(&self, _message_id: &str, _receipt_handle: &str) -> QueueResult<()> {
        unimplemented!("nothing is ever received")
    }

    async fn send_message(&self, _body: &str) -> QueueResult<String> {
        unimplemented!("the worker never sends")
    }
}

/// Handler that fails for a fixed set of message IDs and records every call
#[derive(Default)]
pub struct ScriptedHandler {
    failing_ids: HashSet<String>,
    handled: Mutex<Vec<String>>,
}

impl ScriptedHandler {
    pub fn failing(message_ids: &[&str]) -> Self {
        Self {
            failing_ids: message_ids.iter().map(ToString::to_string).collect(),
            handled: Mutex::new(Vec::new()),
        }
    }

    pub fn handled(&self) -> Vec<String> {
        self.handled.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MessageHandler for ScriptedHandler {
    async fn handle(&self, message: &QueueMessage) -> WorkerResult<()> {
        self.handled
            .lock()
            .unwrap()
            .push(message.message_id.clone());
        if self.failing_ids.contains(&message.message_id) {
            anyhow::bail!("scripted failure for {}", message.message_id);
        }
        Ok(())
    }
}

/// Handler that fails the first attempt of every message and succeeds afterwards
#[derive(Default)]
pub struct FlakyHandler {
    attempts: Mutex<HashMap<String, u32>>,
}

impl FlakyHandler {
    pub fn attempts(&self, message_id: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(message_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl MessageHandler for FlakyHandler {
    async fn handle(&self, message: &QueueMessage) -> WorkerResult<()> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let attempt = attempts.entry(message.message_id.clone()).or_insert(0);
            *attempt += 1;
            *attempt
        };
        if attempt == 1 {
            anyhow::bail!("first attempt always fails");
        }
        Ok(())
    }
}

/// Handler that never completes
pub struct PendingHandler;

#[async_trait::async_trait]
impl MessageHandler for PendingHandler {
    async fn handle(&self, _message: &QueueMessage) -> WorkerResult<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Host lifetime that counts stop requests
#[derive(Default)]
pub struct RecordingLifetime {
    stop_requests: AtomicUsize,
}

impl RecordingLifetime {
    pub fn stop_requests(&self) -> usize {
        self.stop_requests.load(Ordering::SeqCst)
    }
}

impl HostLifetime for RecordingLifetime {
    fn request_stop(&self) {
        self.stop_requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Worker under test with its collaborators
pub struct TestContext<Q, H> {
    pub queue: Arc<Q>,
    pub handler: Arc<H>,
    pub lifetime: Arc<RecordingLifetime>,
    pub shutdown_token: CancellationToken,
    pub config: WorkerConfig,
}

impl<Q, H> TestContext<Q, H>
where
    Q: QueueClient + 'static,
    H: MessageHandler + 'static,
{
    pub fn new(queue: Q, handler: H) -> Self {
        setup_test_env();

        Self {
            queue: Arc::new(queue),
            handler: Arc::new(handler),
            lifetime: Arc::new(RecordingLifetime::default()),
            shutdown_token: CancellationToken::new(),
            config: WorkerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn worker(&self) -> PollingWorker {
        PollingWorker::new(
            self.queue.clone(),
            self.handler.clone(),
            self.lifetime.clone(),
            self.config.clone(),
            self.shutdown_token.clone(),
        )
    }

    /// Cancels the shutdown token once `after` has elapsed
    pub fn cancel_after(&self, after: Duration) {
        let token = self.shutdown_token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            token.cancel();
        });
    }
}
