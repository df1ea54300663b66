/// デコーダーの制限設定
///
/// ボディは接続が閉じるまで読むため、デフォルトではボディサイズを制限しない。
/// 上限が必要な場合は `max_body_size` を明示的に設定する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderLimits {
    /// 最大ステータス行・ヘッダー行長 (デフォルト: 8KB)
    pub max_header_line_size: usize,
    /// 最大ヘッダー数 (デフォルト: 100)
    pub max_headers_count: usize,
    /// 最大ボディサイズ (デフォルト: 制限なし)
    pub max_body_size: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_header_line_size: 8 * 1024, // 8KB
            max_headers_count: 100,
            max_body_size: usize::MAX,
        }
    }
}

impl DecoderLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            max_header_line_size: usize::MAX,
            max_headers_count: usize::MAX,
            max_body_size: usize::MAX,
        }
    }
}
