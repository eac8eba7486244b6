//! パース状態の定義

/// リクエストパーサーの状態
///
/// `Init → ParsingHeaders → ParsingBody → Done` の順にだけ遷移する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// リクエストライン待ち
    Init,
    /// ヘッダー待ち
    ParsingHeaders,
    /// ボディ蓄積中 (終端は呼び出し側が決める)
    ParsingBody,
    /// 完了
    Done,
}

impl ParserState {
    /// ヘッダーセクションが終わっているか
    pub fn is_head_complete(self) -> bool {
        matches!(self, ParserState::ParsingBody | ParserState::Done)
    }
}
