use crate::request::Request;

/// 呼び出し側のヘッダーだけでリクエストをエンコード
///
/// ボディが空でなく、呼び出し側が Content-Length を指定していなければ追加する。
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_request_head(&mut buf, request);
    encode_content_length(&mut buf, request);
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(&request.body);
    buf
}

/// 新しい接続での 1 回のやり取り用にリクエストをエンコード
///
/// 呼び出し側のヘッダーの後に以下を続ける:
///
/// ```text
/// Content-Length: <n>   (ボディが空でない場合のみ)
/// Host: <host>          (呼び出し側が Host を指定済みなら省略)
/// Accept: */*
/// Connection: close
/// ```
///
/// `Connection: close` により相手はボディ送信後に接続を閉じ、
/// そのクローズでレスポンスボディの終わりを検出する。
pub fn encode_exchange_request(request: &Request, host: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_request_head(&mut buf, request);
    encode_content_length(&mut buf, request);

    if !request.has_header("Host") {
        push_header(&mut buf, "Host", host);
    }
    push_header(&mut buf, "Accept", "*/*");
    push_header(&mut buf, "Connection", "close");

    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(&request.body);
    buf
}

impl Request {
    /// バイト列にエンコード
    pub fn encode(&self) -> Vec<u8> {
        encode_request(self)
    }
}

// リクエスト行: METHOD SP URI SP VERSION CRLF、続いて呼び出し側のヘッダー
fn encode_request_head(buf: &mut Vec<u8>, request: &Request) {
    buf.extend_from_slice(request.method.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(request.uri.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(request.version.as_bytes());
    buf.extend_from_slice(b"\r\n");

    for (name, value) in &request.headers {
        push_header(buf, name, value);
    }
}

fn encode_content_length(buf: &mut Vec<u8>, request: &Request) {
    if !request.body.is_empty() && !request.has_header("Content-Length") {
        push_header(buf, "Content-Length", &request.body.len().to_string());
    }
}

fn push_header(buf: &mut Vec<u8>, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}
