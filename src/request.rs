/// HTTP リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// メソッド (GET, POST など)、そのまま送信する
    pub method: String,
    /// リクエストターゲット (パス)
    pub uri: String,
    /// HTTP バージョン (デフォルト: HTTP/1.1)
    pub version: String,
    /// 呼び出し側が指定したヘッダー (送信順)
    pub headers: Vec<(String, String)>,
    /// ボディ
    pub body: Vec<u8>,
}

impl Request {
    /// 新しい HTTP/1.1 リクエストを作成
    pub fn new(method: &str, uri: &str) -> Self {
        Self {
            method: method.to_string(),
            uri: uri.to_string(),
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// ヘッダーを追加 (ビルダー)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// ボディを設定 (ビルダー)
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// ヘッダーを追加
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// ヘッダーが存在するか確認 (大文字小文字を区別しない)
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = Request::new("POST", "/submit")
            .header("X-A", "1")
            .body("payload");
        assert_eq!(request.method, "POST");
        assert_eq!(request.uri, "/submit");
        assert_eq!(request.version, "HTTP/1.1");
        assert_eq!(request.headers, vec![("X-A".to_string(), "1".to_string())]);
        assert_eq!(request.body, b"payload");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = Request::new("GET", "/").header("host", "example.com");
        assert!(request.has_header("Host"));
        assert_eq!(request.get_header("HOST"), Some("example.com"));
        assert!(!request.has_header("Accept"));
    }
}
