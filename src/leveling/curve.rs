use serde::Deserialize;

/// 经验 → 等级曲线：`level = floor(C * exp^(1/P))`
///
/// 两个方向都取整，所以 `experience_for_level(n)` 本身通常仍在 n-1 级，
/// 真正到达 n 级的最小经验是 `experience_for_level(n) + 1`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelCurve {
    pub experience_constant: f64,
    pub experience_power: f64,
    /// 最高等级（内部 0 起）
    pub level_cap: u32,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            experience_constant: 0.07,
            experience_power: 2.0,
            level_cap: 59,
        }
    }
}

impl LevelCurve {
    pub fn level_for_experience(&self, experience: i64) -> u32 {
        let experience = experience.max(0) as f64;
        (self.experience_constant * experience.powf(1.0 / self.experience_power)).floor() as u32
    }

    pub fn experience_for_level(&self, level: u32) -> i64 {
        (level as f64 / self.experience_constant)
            .powf(self.experience_power)
            .floor() as i64
    }

    /// 经验上限，超出部分会被截断
    pub fn experience_max(&self) -> i64 {
        self.experience_for_level(self.level_cap) + 1
    }
}
