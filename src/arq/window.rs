//! 发送窗口
//!
//! `base`（最早未确认序号）、`next_seq_num`（下一个要用的序号）与窗口大小。
//! 序号空间为 2·window：上一圈窗口的旧确认与当前窗口不会混淆。

use super::config::check_window;
use super::seq::SeqSpace;
use crate::error::ConfigError;
use crate::net::NodeCtx;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Window {
    base: u32,
    next_seq_num: u32,
    size: u32,
    space: SeqSpace,
}

impl Window {
    /// `size` 须在 `1..=u32::MAX / 2` 之内
    pub fn new(size: u32) -> Result<Self, ConfigError> {
        check_window(size)?;
        Ok(Self {
            base: 0,
            next_seq_num: 0,
            size,
            space: SeqSpace::new(size * 2),
        })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn next_seq_num(&self) -> u32 {
        self.next_seq_num
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn space(&self) -> SeqSpace {
        self.space
    }

    /// 已发送未确认的序号个数（循环距离）
    pub fn outstanding(&self) -> u32 {
        self.space.distance(self.base, self.next_seq_num)
    }

    pub fn is_empty(&self) -> bool {
        self.base == self.next_seq_num
    }

    /// `next_seq_num ∈ [base, base + size)`
    pub fn can_send(&self) -> bool {
        let upper = self.space.add(self.base, self.size);
        self.space.in_range(self.next_seq_num, self.base, upper)
    }

    /// `x ∈ [base, next_seq_num)`，即已发送未确认
    pub fn is_outstanding(&self, x: u32) -> bool {
        self.space.in_range(x, self.base, self.next_seq_num)
    }

    /// 已发送未确认的序号，升序
    pub fn outstanding_seqs(&self) -> impl Iterator<Item = u32> {
        self.space.walk(self.base, self.next_seq_num)
    }

    /// 占用 `next_seq_num` 并前移，返回被占用的序号
    pub fn take_next(&mut self) -> u32 {
        let seq = self.next_seq_num;
        self.next_seq_num = self.space.next(seq);
        seq
    }

    /// 移动 `base` 并通知 `on_window_moved`；没有移动时什么都不做
    pub fn set_base(&mut self, new_base: u32, ctx: &mut NodeCtx<'_>) {
        let spaces = self.space.distance(self.base, new_base);
        if spaces == 0 {
            return;
        }
        debug!(from = self.base, to = new_base, spaces, "窗口前移");
        self.base = new_base;
        ctx.notify(|o, at, me| o.on_window_moved(at, me, spaces));
    }
}
