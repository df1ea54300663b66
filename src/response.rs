/// HTTP レスポンス
///
/// [`ResponseDecoder`](crate::ResponseDecoder) が少しずつ埋める。
/// 途中で止まったデコーダーから取り出したレスポンスはそこまでにパースした内容を持つ。
/// `status_code == 0` はステータス行を受信していないことを表す。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// HTTP バージョン (HTTP/1.1 など)
    pub version: String,
    /// ステータスコード (200, 404 など)、未設定なら 0
    pub status_code: u16,
    /// ステータスメッセージ (OK, Not Found など)
    ///
    /// obs-text は U+FFFD に置き換わる
    pub reason_phrase: String,
    /// 受信順のヘッダー (重複を含む)
    ///
    /// ヘッダー行は lossy に文字列化するため、値の obs-text (0x80-0xFF) は
    /// U+FFFD に置き換わる
    pub headers: Vec<(String, String)>,
    /// ボディ (ヘッダーブロックの後、相手が閉じるまでに受信したすべて)
    pub body: Vec<u8>,
}

impl Response {
    /// 新しい HTTP/1.1 レスポンスを作成
    pub fn new(status_code: u16, reason_phrase: &str) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status_code,
            reason_phrase: reason_phrase.to_string(),
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
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// 指定した名前の最初のヘッダーを取得 (大文字小文字を区別しない)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 指定した名前のヘッダーをすべて受信順に取得
    pub fn get_headers(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// ヘッダーが存在するか確認
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Content-Length ヘッダーの値
    ///
    /// 参考情報のみ。ボディは常に相手が閉じるまで読む。
    pub fn content_length(&self) -> Option<usize> {
        self.get_header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
    }

    /// 1xx
    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.status_code)
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// 3xx
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    /// 4xx
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }
}
