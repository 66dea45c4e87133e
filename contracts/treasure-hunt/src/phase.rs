use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Timestamp;

#[cw_serde]
#[derive(Copy, Eq, PartialOrd, Ord)]
pub enum Phase {
    Registration,
    Active,
    Resolution,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Registration => "registration",
            Phase::Active => "active",
            Phase::Resolution => "resolution",
            Phase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// The three boundaries splitting the game into phases.
/// The phase is always derived from the block time and never stored.
#[cw_serde]
#[derive(Copy)]
pub struct Timeline {
    pub registration_end: Timestamp,
    pub game_end: Timestamp,
    pub resolution_end: Timestamp,
}

impl Timeline {
    pub fn phase_at(&self, now: Timestamp) -> Phase {
        if now < self.registration_end {
            Phase::Registration
        } else if now < self.game_end {
            Phase::Active
        } else if now < self.resolution_end {
            Phase::Resolution
        } else {
            Phase::Completed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline {
            registration_end: Timestamp::from_seconds(1_000),
            game_end: Timestamp::from_seconds(2_000),
            resolution_end: Timestamp::from_seconds(3_000),
        }
    }

    #[test]
    fn boundaries_belong_to_the_next_phase() {
        let timeline = timeline();
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(0)), Phase::Registration);
        assert_eq!(timeline.phase_at(Timestamp::from_nanos(999_999_999_999)), Phase::Registration);
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(1_000)), Phase::Active);
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(1_999)), Phase::Active);
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(2_000)), Phase::Resolution);
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(3_000)), Phase::Completed);
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(u32::MAX as u64)), Phase::Completed);
    }

    #[test]
    fn phase_never_goes_back_in_time() {
        let timeline = timeline();
        let mut previous = Phase::Registration;
        for seconds in (0..4_000).step_by(7) {
            let phase = timeline.phase_at(Timestamp::from_seconds(seconds));
            assert!(phase >= previous, "{phase} came after {previous}");
            previous = phase;
        }
        assert_eq!(previous, Phase::Completed);
    }

    #[test]
    fn collapsed_boundaries_skip_phases() {
        let timeline = Timeline {
            registration_end: Timestamp::from_seconds(1_000),
            game_end: Timestamp::from_seconds(1_000),
            resolution_end: Timestamp::from_seconds(1_000),
        };
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(999)), Phase::Registration);
        assert_eq!(timeline.phase_at(Timestamp::from_seconds(1_000)), Phase::Completed);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Registration.to_string(), "registration");
        assert_eq!(Phase::Completed.to_string(), "completed");
    }
}
