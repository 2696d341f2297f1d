//! The ordinal brightness ladder

use std::fmt;
use std::str::FromStr;

use crate::constants::levels;

/// Ordinal brightness, always within `levels::MIN..=levels::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BrightnessLevel(u8);

/// Which mechanism a level is realised with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// Hardware at minimum, picture dimmed in software
    DarkGamma,
    /// Native backlight, no correction
    Hardware,
    /// Hardware at maximum, picture boosted in software
    BrightGamma,
}

impl BrightnessLevel {
    pub const MIN: Self = Self(levels::MIN);
    pub const MAX: Self = Self(levels::MAX);
    pub const HARDWARE_MAX: Self = Self(levels::HARDWARE_MAX);
    pub const DEFAULT: Self = Self(levels::DEFAULT);

    /// Build a level, clamping anything outside the ladder
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(levels::MIN), i64::from(levels::MAX)) as u8)
    }

    /// Build a level, rejecting anything outside the ladder
    pub fn new(value: u8) -> Option<Self> {
        (value <= levels::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn range(self) -> Range {
        if self.0 < levels::HARDWARE_START {
            Range::DarkGamma
        } else if self.0 < levels::BRIGHT_START {
            Range::Hardware
        } else {
            Range::BrightGamma
        }
    }

    /// Position within the level's own range (0 for the first level of each range)
    pub fn offset_in_range(self) -> u8 {
        match self.range() {
            Range::DarkGamma => self.0,
            Range::Hardware => self.0 - levels::HARDWARE_START,
            Range::BrightGamma => self.0 - levels::BRIGHT_START,
        }
    }

    /// One step brighter; stays put at the top
    pub fn step_up(self) -> Self {
        Self::clamped(i64::from(self.0) + i64::from(levels::STEP))
    }

    /// One step darker; stays put at the bottom
    pub fn step_down(self) -> Self {
        Self::clamped(i64::from(self.0) - i64::from(levels::STEP))
    }
}

impl Default for BrightnessLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BrightnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BrightnessLevel {
    type Err = String;

    /// Strict parse used for persisted state: out-of-range values are an error, not clamped
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|e| format!("not a level: {s:?} ({e})"))?;
        Self::new(value).ok_or_else(|| format!("level {value} exceeds {}", levels::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_split_at_ten_and_twenty() {
        assert_eq!(BrightnessLevel::clamped(0).range(), Range::DarkGamma);
        assert_eq!(BrightnessLevel::clamped(9).range(), Range::DarkGamma);
        assert_eq!(BrightnessLevel::clamped(10).range(), Range::Hardware);
        assert_eq!(BrightnessLevel::clamped(19).range(), Range::Hardware);
        assert_eq!(BrightnessLevel::clamped(20).range(), Range::BrightGamma);
        assert_eq!(BrightnessLevel::clamped(29).range(), Range::BrightGamma);
    }

    #[test]
    fn test_clamped_never_leaves_ladder() {
        assert_eq!(BrightnessLevel::clamped(-5), BrightnessLevel::MIN);
        assert_eq!(BrightnessLevel::clamped(100), BrightnessLevel::MAX);
        assert_eq!(BrightnessLevel::MAX.value(), 29);
    }

    #[test]
    fn test_step_is_idempotent_at_edges() {
        assert_eq!(BrightnessLevel::MAX.step_up(), BrightnessLevel::MAX);
        assert_eq!(BrightnessLevel::MIN.step_down(), BrightnessLevel::MIN);
    }

    #[test]
    fn test_step_round_trip_for_interior_levels() {
        for value in 1..=28 {
            let level = BrightnessLevel::clamped(value);
            assert_eq!(level.step_up().step_down(), level);
            assert_eq!(level.step_down().step_up(), level);
        }
    }

    #[test]
    fn test_offset_in_range() {
        assert_eq!(BrightnessLevel::clamped(7).offset_in_range(), 7);
        assert_eq!(BrightnessLevel::clamped(13).offset_in_range(), 3);
        assert_eq!(BrightnessLevel::clamped(29).offset_in_range(), 9);
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_garbage() {
        assert_eq!("15\n".parse::<BrightnessLevel>(), Ok(BrightnessLevel::clamped(15)));
        assert!("30".parse::<BrightnessLevel>().is_err());
        assert!("-1".parse::<BrightnessLevel>().is_err());
        assert!("bright".parse::<BrightnessLevel>().is_err());
        assert!("".parse::<BrightnessLevel>().is_err());
    }

    #[test]
    fn test_default_is_full_hardware() {
        assert_eq!(BrightnessLevel::default().value(), 19);
        assert_eq!(BrightnessLevel::default().range(), Range::Hardware);
    }
}
