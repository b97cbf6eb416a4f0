use std::sync::{Arc, Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use optic_com::WsClient;
use optic_ingest::{IngestConfig, IngestService};
use optic_store::{MemStore, ObjectStore, StoreError};
use tokio::time::{Duration, sleep, timeout};

fn local_config() -> IngestConfig {
    IngestConfig::default().with_bind_addr("127.0.0.1:0".parse().unwrap())
}

async fn wait_for(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let check = async {
        while !condition() {
            sleep(Duration::from_millis(20)).await;
        }
    };
    timeout(deadline, check).await.is_ok()
}

#[tokio::test]
async fn binary_frames_are_stored_under_namespace() {
    let store = Arc::new(MemStore::new());
    let service = IngestService::start(
        local_config().with_namespace("caps"),
        store.clone(),
    )
    .await
    .expect("start");
    let stats = service.stats();

    let mut client = WsClient::connect(service.local_addr()).await.expect("connect");
    for i in 0u8..3 {
        client.send_frame(vec![i; 64]).await.expect("send");
        // Keep each frame in its own millisecond so the keys are distinct.
        sleep(Duration::from_millis(5)).await;
    }

    assert!(wait_for(Duration::from_secs(5), || stats.frames_stored() == 3).await);
    assert_eq!(store.len().expect("len"), 3);
    for key in store.keys() {
        assert!(key.starts_with("caps/"));
        assert!(key.ends_with(".jpg"));
        let bytes = store.get(&key).expect("get").expect("present");
        assert_eq!(bytes.len(), 64);
    }
}

/// Store that fails exactly one put, by global put index.
struct FlakyStore {
    inner: MemStore,
    puts: AtomicU64,
    fail_at: u64,
}

impl FlakyStore {
    fn new(fail_at: u64) -> Self {
        Self {
            inner: MemStore::new(),
            puts: AtomicU64::new(0),
            fail_at,
        }
    }
}

impl ObjectStore for FlakyStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let n = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_at {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        self.inner.put(key, bytes, content_type)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key)
    }

    fn len(&self) -> Result<usize, StoreError> {
        self.inner.len()
    }
}

#[tokio::test]
async fn store_failure_loses_one_frame_not_the_connection() {
    let store = Arc::new(FlakyStore::new(2));
    let service = IngestService::start(local_config(), store.clone())
        .await
        .expect("start");
    let stats = service.stats();

    let mut client = WsClient::connect(service.local_addr()).await.expect("connect");
    for i in 0u8..4 {
        client.send_frame(vec![i; 32]).await.expect("send");
        sleep(Duration::from_millis(5)).await;
    }

    // Frame 2 hits the injected failure; frames 1, 3 and 4 land.
    assert!(wait_for(Duration::from_secs(5), || stats.frames_stored() == 3).await);
    assert_eq!(stats.store_failures(), 1);
    assert_eq!(store.len().expect("len"), 3);
}

#[tokio::test]
async fn connections_are_served_independently() {
    let store = Arc::new(FlakyStore::new(1));
    let service = IngestService::start(local_config(), store.clone())
        .await
        .expect("start");
    let stats = service.stats();

    let mut failing = WsClient::connect(service.local_addr()).await.expect("connect a");
    failing.send_frame(vec![0xAA; 32]).await.expect("send a");
    assert!(wait_for(Duration::from_secs(5), || stats.store_failures() == 1).await);

    // The other connection is unaffected by the first one's failure.
    let mut healthy = WsClient::connect(service.local_addr()).await.expect("connect b");
    healthy.send_frame(vec![0xBB; 32]).await.expect("send b");
    assert!(wait_for(Duration::from_secs(5), || stats.frames_stored() == 1).await);

    // And the failing connection itself keeps working afterwards.
    failing.send_frame(vec![0xCC; 32]).await.expect("send a again");
    assert!(wait_for(Duration::from_secs(5), || stats.frames_stored() == 2).await);
    assert_eq!(stats.connections(), 2);
}

/// Store whose first put parks until `release` is called.
struct GatedStore {
    inner: MemStore,
    entered: AtomicBool,
    open: Mutex<bool>,
    released: Condvar,
}

impl GatedStore {
    fn new() -> Self {
        Self {
            inner: MemStore::new(),
            entered: AtomicBool::new(false),
            open: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    fn first_put_started(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }

    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.released.notify_all();
    }
}

impl ObjectStore for GatedStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        if !self.entered.swap(true, Ordering::SeqCst) {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.released.wait(open).unwrap();
            }
        }
        self.inner.put(key, bytes, content_type)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key)
    }

    fn len(&self) -> Result<usize, StoreError> {
        self.inner.len()
    }
}

#[tokio::test]
async fn stalled_sink_write_does_not_block_other_connections() {
    let store = Arc::new(GatedStore::new());
    let service = IngestService::start(local_config(), store.clone())
        .await
        .expect("start");
    let stats = service.stats();

    // The first connection's write parks inside the store.
    let mut stalled = WsClient::connect(service.local_addr()).await.expect("connect a");
    stalled.send_frame(vec![0xAA; 32]).await.expect("send a");
    assert!(wait_for(Duration::from_secs(5), || store.first_put_started()).await);

    // While it is parked, a second connection's frame still lands. This
    // runs on a single-threaded runtime, so the parked write would wedge
    // the whole service if it held a runtime thread.
    let mut healthy = WsClient::connect(service.local_addr()).await.expect("connect b");
    healthy.send_frame(vec![0xBB; 32]).await.expect("send b");
    assert!(wait_for(Duration::from_secs(5), || stats.frames_stored() == 1).await);

    store.release();
    assert!(wait_for(Duration::from_secs(5), || stats.frames_stored() == 2).await);
}

#[tokio::test]
async fn text_messages_are_ignored() {
    let store = Arc::new(MemStore::new());
    let service = IngestService::start(local_config(), store.clone())
        .await
        .expect("start");
    let stats = service.stats();

    let mut client = WsClient::connect(service.local_addr()).await.expect("connect");
    client.send_text("not a frame").await.expect("send text");
    client.send_frame(vec![1; 16]).await.expect("send frame");

    assert!(wait_for(Duration::from_secs(5), || stats.frames_stored() == 1).await);
    assert_eq!(store.len().expect("len"), 1);
}
