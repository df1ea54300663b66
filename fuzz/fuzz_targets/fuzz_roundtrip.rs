#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use oneshot_http11::{Request, ResponseDecoder, encode_exchange_request, parse_header_line};

#[derive(Arbitrary, Debug)]
struct FuzzRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

#[derive(Arbitrary, Debug)]
struct FuzzResponse {
    status_code: u16,
    reason_phrase: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    split: usize,
}

fn is_valid_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.~!$&'()*+,;=".contains(c))
}

fn is_valid_header_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_valid_header_value(s: &str) -> bool {
    !s.starts_with(' ') && s.chars().all(|c| c != '\r' && c != '\n')
}

fuzz_target!(|data: (FuzzRequest, FuzzResponse)| {
    let (fuzz_req, fuzz_resp) = data;

    // リクエスト: 呼び出し側のヘッダーが先頭に順番どおり並ぶ
    if is_valid_token(&fuzz_req.method)
        && is_valid_token(&fuzz_req.path)
        && fuzz_req.headers.iter().all(|(n, _)| !n.eq_ignore_ascii_case("content-length"))
    {
        let valid_headers: Vec<_> = fuzz_req
            .headers
            .iter()
            .filter(|(n, v)| is_valid_header_name(n) && is_valid_header_value(v))
            .cloned()
            .collect();

        let mut request = Request::new(&fuzz_req.method, &fuzz_req.path);
        for (name, value) in &valid_headers {
            request.add_header(name, value);
        }
        request.body = fuzz_req.body.clone();

        let encoded = encode_exchange_request(&request, "fuzz.example");
        let end = encoded
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("terminator");
        let head = String::from_utf8(encoded[..end].to_vec()).expect("ascii head");
        let parsed: Vec<_> = head.split("\r\n").skip(1).filter_map(parse_header_line).collect();
        assert_eq!(&parsed[..valid_headers.len()], &valid_headers[..]);
        assert_eq!(&encoded[end + 4..], &request.body[..]);
    }

    // レスポンス: どこで分割して読んでも同じフィールドにデコードされる
    if !fuzz_resp.reason_phrase.starts_with(char::is_whitespace)
        && !fuzz_resp.reason_phrase.contains('\r')
        && !fuzz_resp.reason_phrase.contains('\n')
    {
        let valid_headers: Vec<_> = fuzz_resp
            .headers
            .iter()
            .filter(|(n, v)| is_valid_header_name(n) && is_valid_header_value(v))
            .take(100)
            .cloned()
            .collect();

        let mut wire = format!(
            "HTTP/1.1 {} {}\r\n",
            fuzz_resp.status_code, fuzz_resp.reason_phrase
        )
        .into_bytes();
        for (name, value) in &valid_headers {
            wire.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        wire.extend_from_slice(b"\r\n");
        wire.extend_from_slice(&fuzz_resp.body);

        let at = fuzz_resp.split % (wire.len() + 1);
        let mut decoder = ResponseDecoder::new();
        if decoder.feed(&wire[..at]).is_err() || decoder.decode_headers().is_err() {
            return;
        }
        if decoder.feed(&wire[at..]).is_err() {
            return;
        }
        if let Ok(true) = decoder.decode_headers() {
            decoder.mark_eof();
            let response = decoder.decode().expect("decode").expect("complete");
            assert_eq!(response.status_code, fuzz_resp.status_code);
            assert_eq!(response.reason_phrase, fuzz_resp.reason_phrase);
            assert_eq!(response.headers, valid_headers);
            assert_eq!(response.body, fuzz_resp.body);
        }
    }
});
