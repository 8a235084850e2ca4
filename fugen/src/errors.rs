//! エラー型の定義
//!
//! このモジュールは、Fugenライブラリで使用されるすべてのエラー型を定義します。
//! 辞書の読み込みと規則文法のコンパイルは構築時にのみ失敗し、
//! 語単位の分割処理はエラーを返しません（フェイルソフト方針）。

use std::error::Error;
use std::fmt::{self, Debug};

/// Fugen専用のResult型
///
/// エラー型としてデフォルトで[`FugenError`]を使用します。
pub type Result<T, E = FugenError> = std::result::Result<T, E>;

/// Fugenのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
#[derive(Debug, thiserror::Error)]
pub enum FugenError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// 辞書リソースや規則表リソースが欠損・破損している場合に発生します。
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 規則文法エラー
    ///
    /// 未定義変数や循環定義など、境界規則文法が不正な場合に発生します。
    /// [`GrammarError`]のエラーバリアント。
    #[error(transparent)]
    Grammar(GrammarError),

    /// 整数パースエラー
    ///
    /// [`ParseIntError`](std::num::ParseIntError)のエラーバリアント。
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    ///
    /// [`std::str::Utf8Error`]のエラーバリアント。
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// ディレクトリが指定されたエラー
    ///
    /// ファイルが期待される場所にディレクトリが指定された場合に発生します。
    #[error("The path '{0}' is a directory, but a file was expected.")]
    PathIsDirectory(std::path::PathBuf),

    /// I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    ///
    /// [`rkyv::rancor::Error`]のエラーバリアント。
    #[error(transparent)]
    Rkyv(#[from] rkyv::rancor::Error),
}

impl FugenError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 規則文法エラーを生成します
    ///
    /// # 引数
    ///
    /// * `line` - 問題のある文の行番号（1始まり）
    /// * `msg` - エラーメッセージ
    pub(crate) fn grammar<S>(line: usize, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Grammar(GrammarError {
            line,
            msg: msg.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 境界規則文法が不正な場合に使用されるエラー
///
/// 問題のある文の行番号を保持します。
#[derive(Debug)]
pub struct GrammarError {
    /// 問題のある文の行番号（1始まり）
    pub(crate) line: usize,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl GrammarError {
    /// 問題のある文の行番号を返します。
    pub fn line(&self) -> usize {
        self.line
    }

    /// エラーメッセージを返します。
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GrammarError: line {}: {}", self.line, self.msg)
    }
}

impl Error for GrammarError {}
