//! 循环序号空间
//!
//! 所有序号都在 `[0, limit)` 内按模 `limit` 运算。

/// 模 `limit` 的序号空间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqSpace {
    limit: u32,
}

impl SeqSpace {
    /// # Panics
    ///
    /// `limit` 为 0 时 panic。
    pub fn new(limit: u32) -> Self {
        assert!(limit > 0, "sequence space limit must be positive");
        Self { limit }
    }

    pub fn limit(self) -> u32 {
        self.limit
    }

    pub fn next(self, n: u32) -> u32 {
        self.add(n, 1)
    }

    pub fn previous(self, n: u32) -> u32 {
        if n == 0 { self.limit - 1 } else { (n - 1) % self.limit }
    }

    pub fn add(self, n: u32, k: u32) -> u32 {
        ((n as u64 + k as u64) % self.limit as u64) as u32
    }

    /// 从 `from` 向前走到 `to` 需要的步数
    pub fn distance(self, from: u32, to: u32) -> u32 {
        let limit = self.limit as u64;
        ((to as u64 + limit - from as u64 % limit) % limit) as u32
    }

    /// 循环半开区间 `[lower, upper)`。
    ///
    /// `lower < upper` 为普通区间；`lower > upper` 表示跨过 0；相等时为空区间
    /// （窗口全空还是全满由调用方自己区分）。
    pub fn in_range(self, x: u32, lower: u32, upper: u32) -> bool {
        if lower < upper {
            lower <= x && x < upper
        } else if lower > upper {
            x >= lower || x < upper
        } else {
            false
        }
    }

    /// 依次产生 `from, from+1, …`，直到（不含）`to`
    pub fn walk(self, from: u32, to: u32) -> impl Iterator<Item = u32> {
        let steps = self.distance(from, to);
        (0..steps).map(move |k| self.add(from, k))
    }
}
