// crates/ec_foundation/src/numerics.rs

//! 数值辅助：补偿求和、体积分数钳位

/// Kahan 补偿求和
///
/// 用于体积等全局诊断量的累加。配合固定分块使用时，
/// 结果与并行线程数无关。
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// 创建新的求和器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}

/// 把分数钳位到 [0, 1]，非有限值映射为 0
#[inline]
pub fn clamp_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// 分数是否需要钳位（越界或非有限）
#[inline]
pub fn needs_clamp(value: f64) -> bool {
    !(0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kahan_sum() {
        let data = vec![0.1f64; 1000];
        let sum = KahanSum::sum_iter(data.iter().cloned());
        assert!((sum - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_fraction() {
        assert_eq!(clamp_fraction(-1e-9), 0.0);
        assert_eq!(clamp_fraction(1.0 + 1e-9), 1.0);
        assert_eq!(clamp_fraction(0.25), 0.25);
        assert_eq!(clamp_fraction(f64::NAN), 0.0);
        assert_eq!(clamp_fraction(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_needs_clamp() {
        assert!(!needs_clamp(0.0));
        assert!(!needs_clamp(1.0));
        assert!(needs_clamp(1.5));
        assert!(needs_clamp(f64::NAN));
    }
}
