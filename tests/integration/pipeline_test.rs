//! End-to-end: manager-interface events in, `call_bridged` out of the hub.

mod helpers;

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use popup_ami::AmiPipeline;
use popup_core::config::ami::AmiConfig;
use popup_realtime::Hub;

const BANNER: &[u8] = b"Asterisk Call Manager/5.0.1\r\n";
const LOGIN_OK: &[u8] = b"Response: Success\r\nMessage: Authentication accepted\r\n\r\n";

/// External leg bridges first, then the answered internal extension.
const CALL_EVENTS: &[u8] = b"Event: FullyBooted\r\nStatus: Fully Booted\r\n\r\n\
Event: Newchannel\r\nUniqueid: 1700000000.1\r\nLinkedid: L1\r\nChannel: SIP/101-000001\r\nCallerIDNum: 101\r\nCallerIDName: Reception\r\n\r\n\
Event: Newstate\r\nUniqueid: 1700000000.1\r\nChannelStateDesc: Up\r\n\r\n\
Event: Newchannel\r\nUniqueid: 1700000000.2\r\nLinkedid: L1\r\nChannel: PJSIP/trunk-000002\r\nCallerIDNum: +15551234567\r\nCallerIDName: Acme Caller\r\n\r\n\
Event: BridgeEnter\r\nUniqueid: 1700000000.2\r\n\r\n\
Event: BridgeEnter\r\nUniqueid: 1700000000.1\r\n\r\n\
Event: BridgeEnter\r\nUniqueid: 1700000000.1\r\n\r\n";

async fn read_action(stream: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 256];
    while !request.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.expect("read action");
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&request).into_owned()
}

#[tokio::test]
async fn test_bridged_call_reaches_subscriber_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let host = listener.local_addr().expect("addr").to_string();

    let config = helpers::test_config();
    let (hub, _hub_task) = Hub::spawn(&config.realtime);
    let (_sub, mut queue) = hub.register(None).await.expect("register");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pipeline = AmiPipeline::new(
        AmiConfig {
            host,
            username: "popup".to_string(),
            secret: "pw".to_string(),
            external_trunks: vec!["trunk".to_string()],
            ..AmiConfig::default()
        },
        hub.clone(),
    );
    let pipeline_task = tokio::spawn(pipeline.run(shutdown_rx));

    let (mut server, _) = listener.accept().await.expect("accept");
    server.write_all(BANNER).await.expect("banner");
    let login = read_action(&mut server).await;
    assert_eq!(login, "Action: Login\r\nUsername: popup\r\nSecret: pw\r\n\r\n");
    server.write_all(LOGIN_OK).await.expect("login ok");
    server.write_all(CALL_EVENTS).await.expect("events");

    let payload = tokio::time::timeout(Duration::from_secs(2), queue.recv())
        .await
        .expect("notification in time")
        .expect("payload");
    assert_eq!(
        payload,
        r#"{"event":"call_bridged","internal_channel":"SIP/101-000001","external_caller_id":"+15551234567","external_caller_name":"Acme Caller","uniqueid":"L1"}"#
    );

    // Give the trailing duplicate bridge signal time to be applied.
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).expect("signal");
    assert_eq!(read_action(&mut server).await, "Action: Logoff\r\n\r\n");
    pipeline_task
        .await
        .expect("pipeline task")
        .expect("clean stop");

    // The repeated bridge signal produced nothing further.
    assert!(queue.try_recv().is_err());
    assert_eq!(hub.metrics().broadcasts, 1);
}
