//! Request/reply conversation between a client node and the Kepler server
//! over an in-memory bus, driven by `KeplerServer::run`.
mod helpers;

use embassy_sync::{blocking_mutex::raw::NoopRawMutex, signal::Signal};
use helpers::{reply_raw, request_frame, MockCanBus, MockTimer, ScriptedBus};
use korri_kepler::{
    error::ServerError,
    infra::codec::{slot, traits::FromPayload},
    protocol::{
        messages::KeplerResult,
        server::{KeplerServer, ServerConfig, ServerStats},
        transport::{
            can_frame::CanFrame,
            can_id::{CanId, J1939Id},
            traits::can_bus::CanBus,
        },
    },
};
use tokio::time::{sleep, timeout, Duration};

#[tokio::test]
/// M = 0°, e = 0 must come back as E = 0° (raw 210 000 000).
async fn test_zero_anomaly_round_trip() {
    let (server_bus, mut client) = MockCanBus::create_pair();
    let mut server = KeplerServer::new(server_bus, MockTimer::default(), ServerConfig::default());
    let shutdown = Signal::<NoopRawMutex, ()>::new();

    let (result, reply) = tokio::join!(server.run(&shutdown), async {
        client.send(&request_frame(210_000_000, 0)).await.unwrap();
        let reply = client.recv().await.unwrap().unwrap();
        shutdown.signal(());
        reply
    });

    assert_eq!(reply_raw(&reply), 210_000_000);
    assert_eq!(&reply.data[4..], &[0xFF; 4]);
    assert_eq!(reply.len, 8);
    assert_eq!(reply.id, CanId(0x18FF1500));
    assert_eq!(reply.id.to_raw_extended(), 0x98FF1500);
    assert_eq!(
        reply.id.decode(),
        J1939Id {
            priority: 6,
            pgn: 0xFF15,
            destination: 255,
            source_address: 0,
        }
    );

    let stats = result.unwrap();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.replied, 1);
}

#[tokio::test]
/// e = 0.1, M = 1 rad: reply matches the reference solution.
async fn test_reference_solution_on_the_wire() {
    let (server_bus, mut client) = MockCanBus::create_pair();
    let mut server = KeplerServer::new(server_bus, MockTimer::default(), ServerConfig::default());
    let shutdown = Signal::<NoopRawMutex, ()>::new();

    let raw_mean_anomaly = slot::angle_deg_to_raw(slot::rad_to_deg(1.0));
    let raw_eccentricity = 64; // 64 × 0.0015625 = 0.1

    let (result, reply) = tokio::join!(server.run(&shutdown), async {
        client
            .send(&request_frame(raw_mean_anomaly, raw_eccentricity))
            .await
            .unwrap();
        let reply = client.recv().await.unwrap().unwrap();
        shutdown.signal(());
        reply
    });
    result.unwrap();

    let decoded = KeplerResult::from_payload(reply.payload()).unwrap();
    assert!((decoded.eccentric_anomaly_rad() - 1.088_597_752_397_893_6).abs() < 1e-5);
}

#[tokio::test]
/// Non-request and undersized frames are consumed silently; only the valid
/// request gets an answer.
async fn test_only_valid_requests_are_answered() {
    let (server_bus, mut client) = MockCanBus::create_pair();
    let mut server = KeplerServer::new(server_bus, MockTimer::default(), ServerConfig::default());
    let shutdown = Signal::<NoopRawMutex, ()>::new();

    let foreign = CanFrame::new(CanId::builder(0xFF15, 0x33).build(), &[0x80, 0x58, 0x84, 0x0C]);
    let short = CanFrame::new(CanId::builder(0xFF14, 120).build(), &[0x80, 0x58]);

    let (result, reply) = tokio::join!(server.run(&shutdown), async {
        client.send(&foreign).await.unwrap();
        client.send(&short).await.unwrap();
        client.send(&request_frame(300_000_000, 0)).await.unwrap();
        let reply = client.recv().await.unwrap().unwrap();
        shutdown.signal(());
        reply
    });

    // M = 90°, e = 0 → E = 90°.
    assert_eq!(reply_raw(&reply), 300_000_000);
    assert_eq!(
        result.unwrap(),
        ServerStats {
            received: 3,
            ignored: 1,
            rejected: 1,
            replied: 1,
            suppressed: 0,
        }
    );
    assert!(timeout(Duration::from_millis(20), client.recv()).await.is_err());
}

#[tokio::test]
/// A quiet bus does not hold the loop once shutdown is requested.
async fn test_shutdown_while_waiting_for_frames() {
    let (server_bus, _client) = MockCanBus::create_pair();
    let mut server = KeplerServer::new(server_bus, MockTimer::default(), ServerConfig::default());
    let shutdown = Signal::<NoopRawMutex, ()>::new();

    let (result, _) = tokio::join!(server.run(&shutdown), async {
        sleep(Duration::from_millis(10)).await;
        shutdown.signal(());
    });

    assert_eq!(result.unwrap(), ServerStats::default());
}

#[tokio::test]
async fn test_shutdown_requested_before_start() {
    let bus = ScriptedBus::new([Ok(Some(request_frame(210_000_000, 0)))]);
    let mut server = KeplerServer::new(bus, MockTimer::default(), ServerConfig::default());
    let shutdown = Signal::<NoopRawMutex, ()>::new();
    shutdown.signal(());

    let stats = server.run(&shutdown).await.unwrap();
    assert_eq!(stats, ServerStats::default());

    let (bus, _) = server.into_inner();
    assert_eq!(bus.reads.len(), 1);
    assert!(bus.sent.is_empty());
}

#[tokio::test]
async fn test_lost_bus_ends_the_loop() {
    let (server_bus, client) = MockCanBus::create_pair();
    drop(client);
    let mut server = KeplerServer::new(server_bus, MockTimer::default(), ServerConfig::default());
    let shutdown = Signal::<NoopRawMutex, ()>::new();

    let result = server.run(&shutdown).await;
    assert!(matches!(result, Err(ServerError::Receive(()))));
}
