//! プロパティテスト共通の Strategy

use proptest::prelude::*;

// ========================================
// トークン
// ========================================

pub fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('.'),
    ]
}

pub fn token_string(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

// ========================================
// メッセージ
// ========================================

pub fn http_method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        Just("HEAD".to_string()),
        // どのトークンもそのまま送信される
        "[A-Z]{1,10}".prop_map(|s| s),
    ]
}

pub fn http_path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "/[a-zA-Z0-9/_.-]{1,64}".prop_map(|s| s),
    ]
}

pub fn http_version() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("HTTP/1.1".to_string()),
        Just("HTTP/1.0".to_string()),
        Just("HTTP/2".to_string()),
    ]
}

/// `Host` でも `Content-Length` でもないヘッダー名
pub fn header_name() -> impl Strategy<Value = String> {
    token_string(32).prop_map(|s| format!("X-{}", s))
}

/// CR/LF を含まず、先頭文字が保たれるヘッダー値
pub fn header_value() -> impl Strategy<Value = String> {
    "[!-~][ -~]{0,63}"
}

pub fn headers() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((header_name(), header_value()), 0..10)
}

pub fn status_code() -> impl Strategy<Value = u16> {
    prop_oneof![
        100u16..=101,
        200u16..=206,
        300u16..=308,
        400u16..=451,
        500u16..=511,
    ]
}

pub fn reason_phrase() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("OK".to_string()),
        Just("Not Found".to_string()),
        Just("Internal Server Error".to_string()),
        "[A-Za-z][A-Za-z ]{0,31}".prop_map(|s| s),
    ]
}

pub fn body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..256)
}

// ========================================
// ホスト
// ========================================

fn hostname_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
    ]
}

fn hostname_label() -> impl Strategy<Value = String> {
    proptest::collection::vec(hostname_char(), 1..16).prop_map(|chars| chars.into_iter().collect())
}

pub fn hostname() -> impl Strategy<Value = String> {
    proptest::collection::vec(hostname_label(), 1..4).prop_map(|labels| labels.join("."))
}

pub fn ipv4_addr() -> impl Strategy<Value = String> {
    (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
        .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d))
}

pub fn valid_port() -> impl Strategy<Value = u16> {
    1u16..=65535
}
