use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use testflow::constants::defaults;
use testflow::{
    ActionResult, CorrelationConfig, CorrelationManager, DefaultMessageCorrelator, FailureKind,
    MessageCorrelator, Parallel, PollingCorrelationManager, SleepAction, TestAction, TestContext,
};
use tokio::time::{sleep, Instant};

#[tokio::test(start_paused = true)]
async fn test_find_on_missing_key_times_out() {
    let manager =
        PollingCorrelationManager::<String>::new(Duration::from_millis(40), "Reply not there yet")
            .unwrap();

    let started = Instant::now();
    let failure = manager
        .find("never-stored", Duration::from_millis(200))
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::CorrelationNotFound);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_store_during_find_wakes_lookup_early() {
    let manager = Arc::new(
        PollingCorrelationManager::<String>::new(Duration::from_millis(10), "waiting").unwrap(),
    );
    let writer = Arc::clone(&manager);
    let store_at = Arc::new(parking_lot::Mutex::new(None));
    let store_at_writer = Arc::clone(&store_at);

    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        *store_at_writer.lock() = Some(Instant::now());
        writer.store("conversation-7", "reply://queue-7".to_string());
    });

    let started = Instant::now();
    let value = manager
        .find("conversation-7", Duration::from_millis(500))
        .await
        .unwrap();
    let found_at = Instant::now();

    assert_eq!(value, "reply://queue-7");
    let stored_at = (*store_at.lock()).expect("writer ran");
    assert!(found_at >= stored_at);
    assert!(found_at - stored_at <= Duration::from_millis(10));
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn test_duplicate_writes_are_last_write_wins_and_reported() {
    let manager =
        PollingCorrelationManager::<u32>::new(Duration::from_millis(10), "waiting").unwrap();
    let reported = Arc::new(AtomicUsize::new(0));
    let hook_counter = Arc::clone(&reported);
    manager
        .object_store()
        .on_duplicate(move |_key| {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        });

    assert_eq!(manager.store("k", 1), None);
    assert_eq!(manager.store("k", 2), Some(1));

    assert_eq!(manager.find("k", Duration::from_millis(50)).await.unwrap(), 2);
    // lookups do not consume the entry
    assert_eq!(manager.find("k", Duration::from_millis(50)).await.unwrap(), 2);
    assert_eq!(manager.object_store().duplicate_writes(), 1);
    assert_eq!(reported.load(Ordering::SeqCst), 1);
}

/// Producer side: derives the correlation key from outgoing headers and
/// stores the reply destination under it
struct SendRequest {
    manager: Arc<PollingCorrelationManager<String>>,
    headers: HashMap<String, String>,
}

#[async_trait]
impl TestAction for SendRequest {
    fn name(&self) -> &str {
        "send-request"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let correlator = DefaultMessageCorrelator;
        let key = correlator.correlation_key(&self.headers)?;
        let key_name = correlator.correlation_key_name("orders");
        self.manager.save_correlation_key(&key_name, &key, context);
        self.manager.store(&key, "reply://orders".to_string());
        Ok(())
    }
}

/// Consumer side: waits for the reply destination of the saved key
struct ReceiveReply {
    manager: Arc<PollingCorrelationManager<String>>,
}

#[async_trait]
impl TestAction for ReceiveReply {
    fn name(&self) -> &str {
        "receive-reply"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let correlator = DefaultMessageCorrelator;
        let key_name = correlator.correlation_key_name("orders");
        // the key variable itself may not exist yet, so poll on the context first
        let deadline = Instant::now() + self.manager.default_timeout();
        while !context.has_variable(&key_name) && Instant::now() < deadline {
            sleep(self.manager.polling_interval()).await;
        }
        let key = self.manager.get_correlation_key(&key_name, context)?;
        let destination = self.manager.find_with_default_timeout(&key).await?;
        context.set_variable("reply_destination", destination);
        Ok(())
    }
}

#[tokio::test]
async fn test_request_reply_flow_across_parallel_branches() {
    let config = CorrelationConfig {
        polling_interval_ms: 10,
        default_timeout_ms: 1000,
        ..CorrelationConfig::default()
    };
    let manager = Arc::new(PollingCorrelationManager::from_config(&config).unwrap());
    let headers = HashMap::from([(defaults::MESSAGE_ID_HEADER.to_string(), "msg-1".to_string())]);

    let parallel = Parallel::new()
        .with_action(ReceiveReply {
            manager: Arc::clone(&manager),
        })
        .with_action(
            testflow::Sequence::new()
                .with_action(SleepAction::new(Duration::from_millis(30)))
                .with_action(SendRequest {
                    manager: Arc::clone(&manager),
                    headers,
                }),
        );

    let context = TestContext::new();
    parallel.execute(&context).await.unwrap();

    assert_eq!(context.get_variable("reply_destination").unwrap(), "reply://orders");
    assert_eq!(
        context
            .get_variable("testflow_message_correlator_orders")
            .unwrap(),
        "msg-1"
    );
}
