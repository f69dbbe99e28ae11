use crate::config::MoraleTuning;

/// Morale bands that scale outgoing damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MoraleTier {
    Low,
    Normal,
    High,
}

impl MoraleTier {
    pub fn of(morale: f64, tuning: &MoraleTuning) -> Self {
        if morale < tuning.low_threshold {
            Self::Low
        } else if morale >= tuning.high_threshold {
            Self::High
        } else {
            Self::Normal
        }
    }

    pub fn damage_multiplier(self, tuning: &MoraleTuning) -> f64 {
        match self {
            Self::Low => tuning.low_multiplier,
            Self::Normal => 1.0,
            Self::High => tuning.high_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        let tuning = MoraleTuning::default();
        assert_eq!(MoraleTier::of(29.9, &tuning), MoraleTier::Low);
        assert_eq!(MoraleTier::of(30.0, &tuning), MoraleTier::Normal);
        assert_eq!(MoraleTier::of(70.0, &tuning), MoraleTier::High);
        assert_eq!(MoraleTier::High.damage_multiplier(&tuning), 1.1);
    }
}
