use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use dust_dds::dds_async::data_reader::DataReaderAsync;
use dust_dds::dds_async::domain_participant_factory::DomainParticipantFactoryAsync;
use dust_dds::infrastructure::qos::QosKind;
use dust_dds::infrastructure::sample_info::{ANY_INSTANCE_STATE, ANY_SAMPLE_STATE, ANY_VIEW_STATE};
use dust_dds::infrastructure::status::NO_STATUS;
use dust_dds::infrastructure::type_support::DdsType;
use dust_dds::listener::NO_LISTENER;
use dust_dds::std_runtime::StdRuntime;

const LOG_TOPIC: &str = "log";
const ALERT_TOPIC: &str = "alert";
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const RETRY_INITIAL: Duration = Duration::from_secs(1);
const RETRY_MAX: Duration = Duration::from_secs(30);
const TAKE_BATCH: i32 = 16;

/// Payload for both topics; the backend keys everything on a single
/// free-form message field.
#[derive(DdsType, Debug, Clone)]
pub struct EventMessage {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum MessagingEvent {
    Status(ConnectionStatus),
    /// Backend log line, appended to the console verbatim.
    Log(String),
    /// Backend-originated alert notice.
    Alert(String),
}

/// Spawn the pub/sub session on its own thread. `outbound` carries
/// locally-fired alert notices to publish on the alert topic.
pub fn spawn(
    domain_id: u32,
    outbound: Receiver<String>,
) -> (Receiver<MessagingEvent>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<MessagingEvent>();
    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();

    thread::spawn(move || run(domain_id, &tx, &outbound, &stop_clone));

    (rx, stop)
}

fn run(
    domain_id: u32,
    tx: &Sender<MessagingEvent>,
    outbound: &Receiver<String>,
    stop: &Arc<AtomicBool>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("messaging runtime failed to start: {e}");
            let _ = tx.send(MessagingEvent::Status(ConnectionStatus::Failed));
            return;
        }
    };

    let mut backoff = RETRY_INITIAL;
    while !stop.load(Ordering::Relaxed) {
        match runtime.block_on(run_session(domain_id, tx, outbound, stop)) {
            Ok(()) => break,
            Err(e) => {
                log::warn!("messaging session ended, retrying in {backoff:?}: {e}");
                let _ = tx.send(MessagingEvent::Status(ConnectionStatus::Failed));
                thread::sleep(backoff);
                backoff = (backoff * 2).min(RETRY_MAX);
            }
        }
    }
}

async fn run_session(
    domain_id: u32,
    tx: &Sender<MessagingEvent>,
    outbound: &Receiver<String>,
    stop: &Arc<AtomicBool>,
) -> Result<(), String> {
    let _ = tx.send(MessagingEvent::Status(ConnectionStatus::Connecting));

    let factory = DomainParticipantFactoryAsync::get_instance();
    let participant = factory
        .create_participant(domain_id as i32, QosKind::Default, NO_LISTENER, NO_STATUS)
        .await
        .map_err(|e| format!("create_participant: {e:?}"))?;

    let log_topic = participant
        .create_topic::<EventMessage>(LOG_TOPIC, LOG_TOPIC, QosKind::Default, NO_LISTENER, NO_STATUS)
        .await
        .map_err(|e| format!("create_topic({LOG_TOPIC}): {e:?}"))?;
    let alert_topic = participant
        .create_topic::<EventMessage>(
            ALERT_TOPIC,
            ALERT_TOPIC,
            QosKind::Default,
            NO_LISTENER,
            NO_STATUS,
        )
        .await
        .map_err(|e| format!("create_topic({ALERT_TOPIC}): {e:?}"))?;

    let subscriber = participant
        .create_subscriber(QosKind::Default, NO_LISTENER, NO_STATUS)
        .await
        .map_err(|e| format!("create_subscriber: {e:?}"))?;
    let publisher = participant
        .create_publisher(QosKind::Default, NO_LISTENER, NO_STATUS)
        .await
        .map_err(|e| format!("create_publisher: {e:?}"))?;

    let log_reader = subscriber
        .create_datareader::<EventMessage>(&log_topic, QosKind::Default, NO_LISTENER, NO_STATUS)
        .await
        .map_err(|e| format!("create_datareader({LOG_TOPIC}): {e:?}"))?;
    let alert_reader = subscriber
        .create_datareader::<EventMessage>(&alert_topic, QosKind::Default, NO_LISTENER, NO_STATUS)
        .await
        .map_err(|e| format!("create_datareader({ALERT_TOPIC}): {e:?}"))?;
    let alert_writer = publisher
        .create_datawriter::<EventMessage>(&alert_topic, QosKind::Default, NO_LISTENER, NO_STATUS)
        .await
        .map_err(|e| format!("create_datawriter({ALERT_TOPIC}): {e:?}"))?;

    let _ = tx.send(MessagingEvent::Status(ConnectionStatus::Connected));
    log::info!("joined messaging domain {domain_id}");

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }

        forward(&log_reader, tx, MessagingEvent::Log).await;
        forward(&alert_reader, tx, MessagingEvent::Alert).await;

        while let Ok(notice) = outbound.try_recv() {
            alert_writer
                .write(&EventMessage { message: notice }, None)
                .await
                .map_err(|e| {
                    let _ = tx.send(MessagingEvent::Status(ConnectionStatus::Disconnected));
                    format!("alert publish: {e:?}")
                })?;
        }

        interval.tick().await;
    }
}

async fn forward(
    reader: &DataReaderAsync<StdRuntime, EventMessage>,
    tx: &Sender<MessagingEvent>,
    wrap: fn(String) -> MessagingEvent,
) {
    let samples = reader
        .take(TAKE_BATCH, ANY_SAMPLE_STATE, ANY_VIEW_STATE, ANY_INSTANCE_STATE)
        .await;
    if let Ok(samples) = samples {
        for sample in &samples {
            if let Ok(event) = sample.data() {
                let _ = tx.send(wrap(event.message));
            }
        }
    }
}
