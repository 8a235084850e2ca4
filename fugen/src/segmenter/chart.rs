//! 分割チャートの実装モジュール。
//!
//! このモジュールは、1語の最良分割を求める動的計画法のための
//! チャート構造を提供します。チャートは文字位置ごとに最良パスの
//! ノードを1つだけ保持し、位置を左から右へ確定させていきます。

/// 無効な位置を表す番兵値。
const INVALID_POS: u32 = u32::MAX;

/// 到達不能を表すセグメント数。
const UNREACHABLE: u32 = u32::MAX;

/// ノードへ到達したステップの種類。
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum StepKind {
    /// 語頭（どのステップでも到達していない）
    Root,
    /// 辞書セグメントの読み終わり
    Segment,
    /// つなぎ字（Fugenelement）の読み飛ばし
    Glue,
    /// 区切り文字（ハイフン等）の読み飛ばし
    Separator,
}

/// パスのコスト。
///
/// セグメント数が少ないほど良く、同数なら辞書重みの合計が
/// 大きいほど良い、という辞書式の順序で比較されます。
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct PathCost {
    pub num_segments: u32,
    pub total_weight: i64,
}

impl PathCost {
    #[inline(always)]
    const fn unreachable() -> Self {
        Self {
            num_segments: UNREACHABLE,
            total_weight: 0,
        }
    }

    /// このコストが `other` より厳密に良いかどうかを判定します。
    #[inline(always)]
    fn improves(&self, other: &Self) -> bool {
        self.num_segments < other.num_segments
            || (self.num_segments == other.num_segments && self.total_weight > other.total_weight)
    }
}

/// チャート内の1ノード。
#[derive(Debug, Clone, Copy)]
struct ChartNode {
    cost: PathCost,
    prev: u32,
    step: StepKind,
}

impl ChartNode {
    #[inline(always)]
    const fn unreachable() -> Self {
        Self {
            cost: PathCost::unreachable(),
            prev: INVALID_POS,
            step: StepKind::Root,
        }
    }
}

/// 採用された分割の1セグメント。
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Span {
    /// セグメントの開始文字位置
    pub start_char: usize,
    /// セグメントの終端文字位置
    pub end_char: usize,
}

/// 1語の最良分割を求める動的計画法のチャート。
///
/// ノード配列は呼び出しをまたいで再利用され、不要な再割り当てを
/// 回避します。
#[derive(Default)]
pub(crate) struct Chart {
    nodes: Vec<ChartNode>,
    len_char: usize,
}

impl Chart {
    /// チャートをリセットし、新しい語の処理を準備します。
    ///
    /// # 引数
    ///
    /// * `len_char` - 新しい語の文字数
    pub fn reset(&mut self, len_char: usize) {
        self.nodes.clear();
        self.nodes.resize(len_char + 1, ChartNode::unreachable());
        self.len_char = len_char;
        self.nodes[0] = ChartNode {
            cost: PathCost {
                num_segments: 0,
                total_weight: 0,
            },
            prev: INVALID_POS,
            step: StepKind::Root,
        };
    }

    /// 指定位置が語頭から到達可能かどうかを返します。
    #[inline(always)]
    pub fn is_reachable(&self, pos: usize) -> bool {
        self.nodes[pos].cost.num_segments != UNREACHABLE
    }

    /// 指定位置へ到達したステップの種類を返します。
    #[inline(always)]
    pub fn step_kind(&self, pos: usize) -> StepKind {
        self.nodes[pos].step
    }

    /// 辞書セグメントのエッジを挿入します。
    ///
    /// `start` が到達不能な場合や、セグメント数が `max_depth` を
    /// 超える場合は何もしません。
    ///
    /// # 引数
    ///
    /// * `start` - セグメントの開始位置
    /// * `end` - セグメントの終端位置
    /// * `weight` - セグメントの辞書重み
    /// * `max_depth` - セグメント数の上限
    pub fn insert_segment(&mut self, start: usize, end: usize, weight: i32, max_depth: usize) {
        debug_assert!(start < end);
        debug_assert!(end <= self.len_char);
        let from = &self.nodes[start];
        if from.cost.num_segments == UNREACHABLE {
            return;
        }
        let new_cost = PathCost {
            num_segments: from.cost.num_segments + 1,
            total_weight: from.cost.total_weight + i64::from(weight),
        };
        if new_cost.num_segments as usize > max_depth {
            return;
        }
        if new_cost.improves(&self.nodes[end].cost) {
            self.nodes[end] = ChartNode {
                cost: new_cost,
                prev: start as u32,
                step: StepKind::Segment,
            };
        }
    }

    /// つなぎ字または区切り文字の読み飛ばしエッジを挿入します。
    ///
    /// 読み飛ばしはコストに影響しません。配置規則（直前のステップの
    /// 種類、語頭・語末の禁止）の検査は呼び出し側が行います。
    ///
    /// # 引数
    ///
    /// * `start` - 読み飛ばしの開始位置
    /// * `end` - 読み飛ばしの終端位置
    /// * `kind` - `StepKind::Glue` または `StepKind::Separator`
    pub fn insert_skip(&mut self, start: usize, end: usize, kind: StepKind) {
        debug_assert!(start < end);
        debug_assert!(end < self.len_char);
        debug_assert!(matches!(kind, StepKind::Glue | StepKind::Separator));
        let from = &self.nodes[start];
        if from.cost.num_segments == UNREACHABLE {
            return;
        }
        let new_cost = from.cost;
        if new_cost.improves(&self.nodes[end].cost) {
            self.nodes[end] = ChartNode {
                cost: new_cost,
                prev: start as u32,
                step: kind,
            };
        }
    }

    /// 最良パスのセグメント列をベクトルに追加します。
    ///
    /// 語末から後方へたどり、読み飛ばしステップを除いたセグメントを
    /// 語頭側から順に並べます。
    ///
    /// # 戻り値
    ///
    /// 語末が辞書セグメントで到達されている場合は`true`、
    /// 到達不能な場合は`false`
    pub fn append_best_spans(&self, spans: &mut Vec<Span>) -> bool {
        if self.len_char == 0 || !self.is_reachable(self.len_char) {
            return false;
        }
        if self.nodes[self.len_char].step != StepKind::Segment {
            return false;
        }
        let mut end = self.len_char;
        while end != 0 {
            let node = &self.nodes[end];
            let start = node.prev as usize;
            if node.step == StepKind::Segment {
                spans.push(Span {
                    start_char: start,
                    end_char: end,
                });
            }
            end = start;
        }
        spans.reverse();
        true
    }
}
