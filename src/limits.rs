/// パーサーの制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserLimits {
    /// スタートラインおよびヘッダー行の最大長 (デフォルト: 8KB)
    ///
    /// CRLF を含まない長さ。CRLF が届く前でもこの長さを超えた時点でエラーにする。
    pub max_line_size: usize,
    /// 最大ヘッダー数 (デフォルト: 100)
    ///
    /// 同名ヘッダーの畳み込み前の行数で数える。
    pub max_headers_count: usize,
    /// 最大ボディサイズ (デフォルト: 10MB)
    pub max_body_size: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_line_size: 8 * 1024,         // 8KB
            max_headers_count: 100,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ParserLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            max_line_size: usize::MAX,
            max_headers_count: usize::MAX,
            max_body_size: usize::MAX,
        }
    }
}
