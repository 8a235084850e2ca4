//! 複合語分割のための辞書モジュール。
//!
//! このモジュールは、分割処理に必要な辞書データの読み込み、構築、
//! シリアライズを行います。辞書は既知の語形（および形態素の語幹）を
//! 受理する有限状態オートマトンであり、受理状態は重みを持ちます。
//!
//! # 辞書の読み込み方法
//!
//! - [`Dictionary::from_path`]: ファイルパスから辞書を読み込む（推奨）
//! - [`Dictionary::read`]: リーダーから辞書を読み込む
//!
//! # 辞書のビルド
//!
//! [`DictionaryBuilder`]を使用して、CSV形式の語彙リストから辞書を
//! 構築できます。

pub mod builder;
pub(crate) mod fst;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use rkyv::{access, deserialize, Archive, Deserialize, Serialize};

use crate::dictionary::fst::{Fst, FstPrefixIter, ROOT_STATE};
use crate::errors::{FugenError, Result};

pub use crate::dictionary::builder::DictionaryBuilder;

/// Fugen辞書を識別するマジックバイト。
///
/// この定数の"0.1"というバージョンは、モデルフォーマットのバージョンを
/// 示しており、クレートのセマンティックバージョンからは切り離されています。
pub const MODEL_MAGIC: &[u8] = b"FugenDecompound 0.1\n";

const MODEL_MAGIC_LEN: usize = MODEL_MAGIC.len();
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize = (RKYV_ALIGNMENT - (MODEL_MAGIC_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;
const DATA_START: usize = MODEL_MAGIC_LEN + PADDING_LEN;

/// [`Dictionary`]の内部データ。
///
/// 語形集合を受理するオートマトンと語数のメタデータを保持します。
#[derive(Archive, Serialize, Deserialize)]
pub struct DictionaryInner {
    fst: Fst,
    num_words: u32,
}

impl DictionaryInner {
    pub(crate) fn new(fst: Fst, num_words: u32) -> Self {
        Self { fst, num_words }
    }

    /// 登録されている語数を返します。
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.num_words as usize
    }

    /// 辞書をリーダブルなバイナリ形式で書き出します。
    ///
    /// 出力はマジックバイト、アライメント用のパディング、rkyvアーカイブの
    /// 順で構成されます。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先のライター
    ///
    /// # エラー
    ///
    /// 書き込みまたはシリアライズに失敗した場合、[`FugenError`]を返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let bytes = rkyv::to_bytes::<Error>(self)?;
        wtr.write_all(MODEL_MAGIC)?;
        wtr.write_all(&[0u8; RKYV_ALIGNMENT][..PADDING_LEN])?;
        wtr.write_all(&bytes)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_fst(self) -> Fst {
        self.fst
    }
}

/// 辞書照合の結果
///
/// [`Dictionary::lookup`]が返す受理情報です。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Acceptance {
    /// 入力全体が辞書語として受理されたかどうか
    pub accepted: bool,
    /// 受理された場合の辞書重み
    pub weight: i32,
    /// 入力がより長い辞書語の接頭辞として延長可能かどうか
    pub is_prefix: bool,
}

/// 複合語分割のための読み取り専用辞書。
///
/// 構築後は不変であり、[`Arc`](std::sync::Arc)を介して複数のワーカー
/// スレッドからロックなしで共有できます。
pub struct Dictionary {
    inner: DictionaryInner,
}

impl Dictionary {
    /// `DictionaryInner`から新しい辞書を作成します。
    pub fn from_inner(inner: DictionaryInner) -> Self {
        Self { inner }
    }

    /// リーダーから辞書を読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 辞書データのリーダー
    ///
    /// # エラー
    ///
    /// マジックバイトが一致しない場合やアーカイブが破損している場合、
    /// [`FugenError`]を返します。
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut buf = vec![];
        rdr.read_to_end(&mut buf)?;
        if buf.len() < DATA_START || &buf[..MODEL_MAGIC_LEN] != MODEL_MAGIC {
            return Err(FugenError::invalid_format(
                "dictionary",
                "The magic number of the input model mismatches.",
            ));
        }
        let mut aligned = AlignedVec::<RKYV_ALIGNMENT>::with_capacity(buf.len() - DATA_START);
        aligned.extend_from_slice(&buf[DATA_START..]);
        let archived = access::<ArchivedDictionaryInner, Error>(&aligned)?;
        let inner = deserialize::<DictionaryInner, Error>(archived)?;
        Ok(Self { inner })
    }

    /// ファイルパスから辞書を読み込みます。
    ///
    /// # 引数
    ///
    /// * `path` - 辞書ファイルのパス
    ///
    /// # エラー
    ///
    /// ファイルが存在しない場合、ディレクトリが指定された場合、
    /// または内容が不正な場合、[`FugenError`]を返します。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(FugenError::PathIsDirectory(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::read(file)
    }

    /// 辞書をリーダブルなバイナリ形式で書き出します。
    ///
    /// [`DictionaryInner::write`]への委譲です。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        self.inner.write(wtr)
    }

    /// 登録されている語数を返します。
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.inner.num_words()
    }

    /// オートマトンの状態数を返します。
    #[inline(always)]
    pub fn num_states(&self) -> usize {
        self.inner.fst.num_states()
    }

    /// オートマトンの遷移数を返します。
    #[inline(always)]
    pub fn num_transitions(&self) -> usize {
        self.inner.fst.num_transitions()
    }

    /// 文字列を1文字ずつたどり、受理情報を返します。
    ///
    /// 入力文字は照合前に畳み込まれます。副作用はなく、並行して
    /// 呼び出せます。
    ///
    /// # 引数
    ///
    /// * `chars` - 照合する文字列
    ///
    /// # 戻り値
    ///
    /// 受理フラグ、重み、接頭辞として延長可能かを持つ[`Acceptance`]
    pub fn lookup(&self, chars: &[char]) -> Acceptance {
        let fst = &self.inner.fst;
        let mut state = ROOT_STATE;
        for &c in chars {
            match fst.step(state, c) {
                Some(next) => state = next,
                None => {
                    return Acceptance {
                        accepted: false,
                        weight: 0,
                        is_prefix: false,
                    };
                }
            }
        }
        Acceptance {
            accepted: fst.is_final(state),
            weight: if fst.is_final(state) {
                fst.weight(state)
            } else {
                0
            },
            is_prefix: fst.has_outgoing(state),
        }
    }

    /// 入力の接頭辞に一致する辞書語を列挙するイテレータを取得します。
    #[inline(always)]
    pub(crate) fn common_prefix_iterator<'a>(&'a self, suffix: &'a [char]) -> FstPrefixIter<'a> {
        self.inner.fst.common_prefix_iterator(suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dict() -> Dictionary {
        let lexicon_csv = "donau,4\ndampf,3\nschiff,5";
        let inner = DictionaryBuilder::from_reader(lexicon_csv.as_bytes()).unwrap();
        Dictionary::from_inner(inner)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dict = sample_dict();
        let mut buffer = Vec::new();
        dict.write(&mut buffer).unwrap();
        assert_eq!(&buffer[..MODEL_MAGIC.len()], MODEL_MAGIC);

        let dict2 = Dictionary::read(buffer.as_slice()).unwrap();
        assert_eq!(dict2.num_words(), 3);
        assert_eq!(dict2.num_states(), dict.num_states());
        assert_eq!(dict2.num_transitions(), dict.num_transitions());
    }

    #[test]
    fn test_read_bad_magic() {
        let mut buffer = Vec::new();
        sample_dict().write(&mut buffer).unwrap();
        buffer[0] ^= 0xFF;
        assert!(Dictionary::read(buffer.as_slice()).is_err());
    }

    #[test]
    fn test_read_truncated() {
        let buffer = b"Fug".to_vec();
        assert!(Dictionary::read(buffer.as_slice()).is_err());
    }

    #[test]
    fn test_lookup_accepted() {
        let dict = sample_dict();
        let chars: Vec<char> = "dampf".chars().collect();
        let acc = dict.lookup(&chars);
        assert!(acc.accepted);
        assert_eq!(acc.weight, 3);
        assert!(!acc.is_prefix);
    }

    #[test]
    fn test_lookup_prefix() {
        let dict = sample_dict();
        let chars: Vec<char> = "dam".chars().collect();
        let acc = dict.lookup(&chars);
        assert!(!acc.accepted);
        assert!(acc.is_prefix);
    }

    #[test]
    fn test_lookup_case_folded() {
        let dict = sample_dict();
        let chars: Vec<char> = "Donau".chars().collect();
        assert!(dict.lookup(&chars).accepted);
    }

    #[test]
    fn test_lookup_unknown() {
        let dict = sample_dict();
        let chars: Vec<char> = "xyzzy".chars().collect();
        let acc = dict.lookup(&chars);
        assert!(!acc.accepted);
        assert!(!acc.is_prefix);
        assert_eq!(acc.weight, 0);
    }
}
