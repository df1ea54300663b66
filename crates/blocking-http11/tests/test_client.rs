//! localhost の実際の TCP ピアに対するクライアント

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use blocking_http11::{Client, Config, Error, ResponseExt, Target};

/// リクエストヘッダー (と `Content-Length` バイトのボディ) を 1 つ読む
fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        if let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&data[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length: "))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                return data;
            }
        }
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            return data;
        }
        data.extend_from_slice(&buf[..n]);
    }
}

/// `count` 回の接続に `reply` を返して閉じるピア
fn serve(reply: &'static [u8], count: usize) -> (SocketAddr, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for _ in 0..count {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            stream.write_all(reply).unwrap();
        }
        requests
    });
    (addr, handle)
}

#[test]
fn test_get_with_body() {
    let (addr, peer) = serve(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello", 1);
    let mut client = Client::with_addr("127.0.0.1", addr.port()).unwrap();

    let response = client.get("/").send().unwrap();
    assert_eq!(response.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(response.get_header("Content-Type"), Some("text/plain"));
    assert_eq!(response.text().unwrap(), "hello");

    let requests = peer.join().unwrap();
    let expected = format!(
        "GET / HTTP/1.1\r\nHost: 127.0.0.1:{}\r\nAccept: */*\r\nConnection: close\r\n\r\n",
        addr.port()
    );
    assert_eq!(String::from_utf8_lossy(&requests[0]), expected);
}

#[test]
fn test_post_sends_headers_and_body() {
    let (addr, peer) = serve(b"HTTP/1.1 201 Created\r\n\r\n", 1);
    let mut client = Client::with_addr("127.0.0.1", addr.port()).unwrap();

    let response = client
        .post("/items")
        .headers([("X-A", "1"), ("X-B", "2")])
        .body("hello")
        .send()
        .unwrap();
    assert_eq!(response.status_code, 201);
    assert!(response.body.is_empty());

    let requests = peer.join().unwrap();
    let request = String::from_utf8_lossy(&requests[0]).into_owned();
    assert!(request.starts_with("POST /items HTTP/1.1\r\nX-A: 1\r\nX-B: 2\r\nContent-Length: 5\r\n"));
    assert!(request.ends_with("Connection: close\r\n\r\nhello"));
}

#[test]
fn test_repeated_requests_are_identical() {
    let (addr, peer) = serve(b"HTTP/1.1 200 OK\r\nX-Dup: a\r\nX-Dup: b\r\n\r\nsame", 2);
    let mut client = Client::with_addr("127.0.0.1", addr.port()).unwrap();

    let first = client.get("/").send().unwrap();
    let second = client.get("/").send().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get_headers("X-Dup"), vec!["a", "b"]);

    let requests = peer.join().unwrap();
    assert_eq!(requests[0], requests[1]);
}

#[test]
fn test_body_larger_than_10mb() {
    const SIZE: usize = 11 * 1024 * 1024;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        stream.write_all(b"HTTP/1.1 200 OK\r\n\r\n").unwrap();
        stream.write_all(&vec![b'x'; SIZE]).unwrap();
    });

    let mut client = Client::with_addr("127.0.0.1", port).unwrap();
    let response = client.get("/large").send().unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body.len(), SIZE);
    assert!(response.body.iter().all(|&b| b == b'x'));
    peer.join().unwrap();
}

#[test]
fn test_obs_text_reason_phrase() {
    let (addr, peer) = serve(b"HTTP/1.1 200 \xc9t\xe9\r\n\r\nok", 1);
    let mut client = Client::with_addr("127.0.0.1", addr.port()).unwrap();

    let response = client.get("/").send().unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.reason_phrase, "\u{FFFD}t\u{FFFD}");
    assert_eq!(response.body, b"ok");
    peer.join().unwrap();
}

#[test]
fn test_garbage_response() {
    let (addr, peer) = serve(b"GARBAGE\r\n\r\n", 1);
    let mut client = Client::with_addr("127.0.0.1", addr.port()).unwrap();

    let failure = client.get("/").send().unwrap_err();
    assert_eq!(failure.error, Error::InvalidResponse);
    assert_eq!(failure.to_string(), "invalid http response");
    peer.join().unwrap();
}

#[test]
fn test_host_form_localhost() {
    let (addr, peer) = serve(b"HTTP/1.0 200 OK\r\n\r\nvia name", 1);
    let mut client = Client::new(&format!("localhost:{}", addr.port())).unwrap();

    match client.get("/").send() {
        Ok(response) => {
            assert_eq!(response.body, b"via name");
            let requests = peer.join().unwrap();
            let host = format!("Host: localhost:{}\r\n", addr.port());
            assert!(String::from_utf8_lossy(&requests[0]).contains(&host));
        }
        // IPv6 で listen していない環境では localhost が先に ::1 になることがある
        Err(failure) => assert!(matches!(failure.error, Error::Connect(_))),
    }
}

#[test]
fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut client = Client::with_addr("127.0.0.1", port).unwrap();
    let failure = client.get("/").send().unwrap_err();
    assert!(matches!(failure.error, Error::Connect(_)));
    assert_eq!(failure.response.status_code, 0);
}

#[test]
fn test_unroutable_address_fails_within_connect_timeout() {
    let target = Target::addr("10.255.255.1", 80).unwrap();
    let config = Config::default().connect_timeout(Duration::from_millis(300));
    let mut client = Client::with_config(target, config).unwrap();

    let started = Instant::now();
    let failure = client.get("/").send().unwrap_err();
    // 経路がない環境ではタイムアウトせずにすぐ接続に失敗する
    assert!(matches!(
        failure.error,
        Error::ConnectTimeout | Error::Connect(_)
    ));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_request_timeout_when_peer_never_closes() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        stream.write_all(b"HTTP/1.1 200 OK\r\n\r\npartial").unwrap();
        // クライアントのタイムアウトを過ぎるまで接続を開いたままにする
        thread::sleep(Duration::from_millis(600));
    });

    let target = Target::addr("127.0.0.1", port).unwrap();
    let config = Config::default().request_timeout(Duration::from_millis(200));
    let mut client = Client::with_config(target, config).unwrap();

    let started = Instant::now();
    let failure = client.get("/").send().unwrap_err();
    assert_eq!(failure.error, Error::RequestTimeout);
    assert!(started.elapsed() < Duration::from_millis(550));
    assert_eq!(failure.response.status_code, 200);
    assert_eq!(failure.response.body, b"partial");
    peer.join().unwrap();
}

#[test]
fn test_client_drop_joins_worker() {
    let client = Client::with_addr("127.0.0.1", 9).unwrap();
    drop(client);
}
