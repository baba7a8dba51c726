//! Демонстрация моста Zenbridge
//!
//! Связывает издателя и подписку, сервис и клиента через сессию внутри
//! процесса. Поток-производитель публикует сообщения и отправляет запросы,
//! главный поток ждёт на одном `WaitSet` и обрабатывает всё, что пришло.

use std::{path::PathBuf, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use tracing::{debug, info, warn};
use zenbridge::{
    init_logging, Client, ConditionSource, GuardCondition, LoopbackSession, Publisher, QosProfile,
    Query, Service, Settings, Subscription, WaitError, WaitSet,
};

const TOPIC: &str = "chatter";
const SERVICE: &str = "add_two_ints";

/// Аргументы командной строки демонстрации.
#[derive(Parser, Debug)]
#[command(name = "zenbridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Zenbridge demo: pub/sub and request/reply over a loopback session", long_about = None)]
struct Cli {
    /// Файл настроек (TOML/YAML/JSON)
    #[arg(short, long, env = "ZENBRIDGE_CONFIG", help = "Путь к файлу настроек")]
    config: Option<PathBuf>,
    /// Глубина истории всех конечных точек
    #[arg(short, long, help = "Глубина очередей (0 = значение по умолчанию)")]
    depth: Option<usize>,
    /// Сколько сообщений опубликовать
    #[arg(short, long, default_value = "10")]
    messages: u32,
    /// Сколько запросов отправить сервису
    #[arg(short, long, default_value = "3")]
    requests: u32,
    /// Таймаут ожидания в миллисекундах (без флага ждать бесконечно)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

/// Итоги обработки в главном потоке.
#[derive(Debug, Default)]
struct Totals {
    messages: usize,
    requests: usize,
    responses: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(cli.config.as_deref()).context("failed to load settings")?;
    let logging = init_logging(settings.logging.clone()).context("failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("ZENBRIDGE_GIT_COMMIT"),
        built = env!("ZENBRIDGE_BUILD_TIME"),
        "zenbridge demo starting"
    );

    let requested = cli
        .depth
        .map(QosProfile::keep_last)
        .unwrap_or_default();
    let qos = settings
        .adapt_qos(&requested)
        .context("unsupported QoS profile")?;
    let timeout = cli
        .timeout_ms
        .map(Duration::from_millis)
        .or_else(|| settings.wait_timeout());
    info!(%qos.history, depth = qos.depth, ?timeout, "endpoints configured");

    let session = Arc::new(LoopbackSession::new());

    let publisher = Publisher::new(TOPIC);
    let subscription = Arc::new(Subscription::new(TOPIC, qos.depth)?);
    session.bind_subscription(&subscription);

    let service = Arc::new(Service::<Query>::new(SERVICE, qos.depth)?);
    session.bind_service(&service);
    let client = Arc::new(Client::<u32>::new(SERVICE, qos.depth)?);

    let done = Arc::new(GuardCondition::new());

    let producer = {
        let session = Arc::clone(&session);
        let client = Arc::clone(&client);
        let done = Arc::clone(&done);
        let (messages, requests) = (cli.messages, cli.requests);
        thread::spawn(move || {
            for i in 0..messages {
                let payload = Bytes::from(format!("hello world: {i}"));
                session.publish(&publisher, payload);
            }
            for i in 0..requests {
                let payload = Bytes::from(format!("{} {}", i, i + 1));
                if let Err(err) = session.send_request(&client, payload, i) {
                    warn!(request = i, error = %err, "request not sent");
                }
            }
            done.trigger();
        })
    };

    let mut wait_set = WaitSet::new();
    let mut totals = Totals::default();
    let mut producer_done = false;

    loop {
        let sources: [&dyn ConditionSource; 4] = [&*subscription, &*service, &*client, &*done];
        match wait_set.wait_any(&sources, timeout) {
            Ok(ready) => {
                debug!(?ready, "sources ready");
                producer_done |= ready.contains(&3);
            }
            Err(WaitError::Timeout) => debug!("wait timed out"),
        }

        drain(&subscription, &service, &client, &mut totals);

        // Доставка синхронная: после сигнала производителя новых данных нет.
        if producer_done && subscription.is_empty() && service.queued() == 0 {
            break;
        }
    }

    info!(
        messages = totals.messages,
        requests = totals.requests,
        responses = totals.responses,
        "demo finished"
    );
    info!(stats = ?subscription.stats(), "subscription");
    info!(stats = ?service.stats(), "service");
    info!(stats = ?client.stats(), "client");

    let lost = client.shutdown();
    if lost > 0 {
        warn!(lost, "requests left without a response");
    }
    service.shutdown();

    if producer.join().is_err() {
        warn!("producer thread panicked");
    }
    logging.shutdown();
    Ok(())
}

/// Забирает всё накопленное: сообщения, запросы (с ответом), ответы.
fn drain(
    subscription: &Subscription,
    service: &Service<Query>,
    client: &Client<u32>,
    totals: &mut Totals,
) {
    while let Some((payload, info)) = subscription.take_with_info() {
        info!(
            seq = info.publication_sequence_number,
            publisher = %info.publisher_gid,
            "received: {}",
            String::from_utf8_lossy(&payload)
        );
        totals.messages += 1;
    }

    while let Some((id, request)) = service.take_request() {
        let reply = match sum(&request.payload) {
            Some(total) => total.to_string(),
            None => "error: expected integers".to_string(),
        };
        if let Err(err) = service.respond(&id, Bytes::from(reply)) {
            warn!(request = %id, error = %err, "response not sent");
            continue;
        }
        totals.requests += 1;
    }

    while let Some(response) = client.take_response() {
        info!(
            seq = response.envelope.sequence_number,
            "response: {}",
            String::from_utf8_lossy(&response.payload)
        );
        totals.responses += 1;
    }
}

fn sum(payload: &[u8]) -> Option<i64> {
    std::str::from_utf8(payload)
        .ok()?
        .split_whitespace()
        .map(|n| n.parse::<i64>().ok())
        .sum()
}
