//! デコードフェーズ

/// デコードフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodePhase {
    /// ステータス行待ち
    StatusLine,
    /// 空行までのヘッダー行待ち
    Headers,
    /// 接続が閉じるまでボディを読む
    BodyUntilClose,
    /// ヘッダーブロックの後に相手が接続を閉じた
    Complete,
    /// ステータス行を拒否した。以降はパースしない
    Rejected,
}
