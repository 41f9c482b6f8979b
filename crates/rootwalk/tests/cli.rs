//! Runs the binary against a loopback nameserver.

use rootwalk_proto::{Message, ResourceRecord, ResponseCode};
use std::net::Ipv4Addr;
use std::path::Path;
use std::process::{Command, Output};
use tokio::net::UdpSocket;

/// Answers every name with one A record, except `missing.test`.
async fn spawn_server() -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 512];
        loop {
            let (len, peer) = socket.recv_from(&mut buf).await.unwrap();
            let query = Message::parse(&buf[..len]).unwrap();
            let qname = query.question().unwrap().qname.clone();
            let mut response = Message::response_to(&query);
            if qname.to_string() == "missing.test." {
                response.set_rcode(ResponseCode::NXDomain);
            } else {
                response.add_answer(ResourceRecord::a(qname, 60, Ipv4Addr::new(192, 0, 2, 1)));
            }
            socket.send_to(&response.to_wire(), peer).await.unwrap();
        }
    });

    port
}

fn write_hints(dir: &Path) -> String {
    let path = dir.join("root.hints");
    std::fs::write(&path, "loopback.invalid.  3600000  A  127.0.0.1\n").unwrap();
    path.display().to_string()
}

async fn rootwalk(dir: &Path, args: Vec<String>) -> Output {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_rootwalk"))
            .args(args)
            .current_dir(dir)
            .env_remove("ROOTWALK_CONFIG")
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn args(name: &str, hints: &str, port: u16, extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        name.to_string(),
        "--hints".to_string(),
        hints.to_string(),
        "--port".to_string(),
        port.to_string(),
        "--timeout-ms".to_string(),
        "2000".to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}

#[tokio::test]
async fn test_json_answer_exit_zero() {
    let port = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let hints = write_hints(dir.path());

    let output = rootwalk(dir.path(), args("www.example.test", &hints, port, &["--json", "--trace"])).await;

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["answer"]["addresses"][0], "192.0.2.1");
    assert_eq!(value["hops"], 1);
    assert_eq!(value["trace"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["trace"][0]["attempts"], 1);
    assert_eq!(value["stats"]["resolutions_total"], 1);
    assert_eq!(value["stats"]["resolutions_succeeded"], 1);
    assert_eq!(value["stats"]["hops_total"], 1);
}

#[tokio::test]
async fn test_text_answer() {
    let port = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let hints = write_hints(dir.path());

    let output = rootwalk(dir.path(), args("www.example.test", &hints, port, &[])).await;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("www.example.test."));
    assert!(stdout.contains("192.0.2.1"));
}

#[tokio::test]
async fn test_resolution_failure_exit_one() {
    let port = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let hints = write_hints(dir.path());

    let output = rootwalk(dir.path(), args("missing.test", &hints, port, &["--json"])).await;

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"]["kind"], "name_not_found");
    assert_eq!(value["stats"]["resolutions_failed"], 1);
}

#[tokio::test]
async fn test_bad_input_exit_two() {
    let dir = tempfile::tempdir().unwrap();
    let hints = write_hints(dir.path());

    let zero_hops = rootwalk(dir.path(), args("example.com", &hints, 53, &["--max-hops", "0"])).await;
    assert_eq!(zero_hops.status.code(), Some(2));

    let bad_name = rootwalk(dir.path(), args("bad..name", &hints, 53, &[])).await;
    assert_eq!(bad_name.status.code(), Some(2));

    let missing_hints = rootwalk(dir.path(), args("example.com", "/nonexistent/root.hints", 53, &[])).await;
    assert_eq!(missing_hints.status.code(), Some(2));

    let no_name = rootwalk(dir.path(), Vec::new()).await;
    assert_eq!(no_name.status.code(), Some(2));
}
