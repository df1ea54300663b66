//! Response 拡張トレイト
//!
//! [`oneshot_http11::Response`] の便利メソッド

use oneshot_http11::Response;
use std::string::FromUtf8Error;

/// Response 拡張トレイト
pub trait ResponseExt {
    /// ボディを UTF-8 文字列として取得
    fn text(&self) -> Result<String, FromUtf8Error>;

    /// ボディのバイト列
    fn bytes(&self) -> &[u8];

    /// 受信したままの `version code message`
    fn status_line(&self) -> String;

    /// ボディを JSON として `T` にパース
    fn json<T>(&self) -> Result<T, JsonError>
    where
        for<'text, 'raw> T:
            TryFrom<nojson::RawJsonValue<'text, 'raw>, Error = nojson::JsonParseError>;
}

impl ResponseExt for Response {
    fn text(&self) -> Result<String, FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    fn bytes(&self) -> &[u8] {
        &self.body
    }

    fn status_line(&self) -> String {
        format!(
            "{} {} {}",
            self.version, self.status_code, self.reason_phrase
        )
    }

    fn json<T>(&self) -> Result<T, JsonError>
    where
        for<'text, 'raw> T:
            TryFrom<nojson::RawJsonValue<'text, 'raw>, Error = nojson::JsonParseError>,
    {
        let text = std::str::from_utf8(&self.body).map_err(JsonError::Utf8)?;
        let raw = nojson::RawJson::parse(text).map_err(JsonError::Parse)?;
        let value: T = raw.value().try_into().map_err(JsonError::Parse)?;
        Ok(value)
    }
}

/// JSON ボディのエラー
#[derive(Debug)]
pub enum JsonError {
    /// ボディが UTF-8 でない
    Utf8(std::str::Utf8Error),
    /// ボディが期待した JSON でない
    Parse(nojson::JsonParseError),
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonError::Utf8(e) => write!(f, "UTF-8 decode error: {}", e),
            JsonError::Parse(e) => write!(f, "JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JsonError::Utf8(e) => Some(e),
            JsonError::Parse(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_status_line() {
        let response = Response::new(200, "OK").body(b"hello".to_vec());
        assert_eq!(response.text().unwrap(), "hello");
        assert_eq!(response.bytes(), b"hello");
        assert_eq!(response.status_line(), "HTTP/1.1 200 OK");
    }

    #[test]
    fn test_json() {
        let response = Response::new(200, "OK").body(b"42".to_vec());
        let value: u32 = response.json().unwrap();
        assert_eq!(value, 42);

        let response = Response::new(200, "OK").body(b"{".to_vec());
        assert!(matches!(response.json::<u32>(), Err(JsonError::Parse(_))));

        let response = Response::new(200, "OK").body(vec![0xff]);
        assert!(matches!(response.json::<u32>(), Err(JsonError::Utf8(_))));
    }
}
