//! Queue advance policy
//!
//! Pure decision logic for which queue index plays next, given the repeat
//! mode and shuffle flag. Randomness is injected so callers (and tests)
//! control the RNG.

use rand::Rng;

use super::types::RepeatMode;

/// What caused the advance decision to be consulted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceTrigger {
    TrackEnded,
    ExplicitNext,
    ExplicitPrevious,
}

/// The resulting action on the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Load and play the track at this index from time 0
    Play(usize),
    /// Natural end of queue: stop playing, keep the index where it is
    Stop,
    /// Empty queue, nothing to do
    Stay,
}

/// Decide the next index for `trigger` against a queue of `len` tracks.
///
/// Shuffle picks a uniformly random index and may repeat the current one;
/// there is no shuffle history. With repeat off and shuffle on, track end
/// keeps shuffling indefinitely rather than stopping once every track has
/// played. Explicit next wraps even when repeat is off.
pub fn advance(
    trigger: AdvanceTrigger,
    repeat: RepeatMode,
    shuffle: bool,
    current: usize,
    len: usize,
    rng: &mut impl Rng,
) -> Advance {
    if len == 0 {
        return Advance::Stay;
    }

    match trigger {
        AdvanceTrigger::TrackEnded => match repeat {
            RepeatMode::One => Advance::Play(current),
            RepeatMode::All => {
                if shuffle {
                    Advance::Play(rng.gen_range(0..len))
                } else {
                    Advance::Play((current + 1) % len)
                }
            }
            RepeatMode::Off => {
                if shuffle {
                    Advance::Play(rng.gen_range(0..len))
                } else if current + 1 < len {
                    Advance::Play(current + 1)
                } else {
                    Advance::Stop
                }
            }
        },
        AdvanceTrigger::ExplicitNext => {
            if shuffle {
                Advance::Play(rng.gen_range(0..len))
            } else {
                Advance::Play((current + 1) % len)
            }
        }
        AdvanceTrigger::ExplicitPrevious => {
            if shuffle {
                Advance::Play(rng.gen_range(0..len))
            } else if current == 0 {
                Advance::Play(len - 1)
            } else {
                Advance::Play(current - 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn repeat_one_replays_same_index() {
        let got = advance(AdvanceTrigger::TrackEnded, RepeatMode::One, false, 1, 3, &mut rng());
        assert_eq!(got, Advance::Play(1));
        // Shuffle does not override repeat-one
        let got = advance(AdvanceTrigger::TrackEnded, RepeatMode::One, true, 1, 3, &mut rng());
        assert_eq!(got, Advance::Play(1));
    }

    #[test]
    fn repeat_all_wraps_at_end() {
        let got = advance(AdvanceTrigger::TrackEnded, RepeatMode::All, false, 2, 3, &mut rng());
        assert_eq!(got, Advance::Play(0));
    }

    #[test]
    fn repeat_off_stops_at_last_track() {
        let got = advance(AdvanceTrigger::TrackEnded, RepeatMode::Off, false, 2, 3, &mut rng());
        assert_eq!(got, Advance::Stop);
    }

    #[test]
    fn repeat_off_advances_mid_queue() {
        let got = advance(AdvanceTrigger::TrackEnded, RepeatMode::Off, false, 0, 3, &mut rng());
        assert_eq!(got, Advance::Play(1));
    }

    #[test]
    fn shuffle_keeps_playing_with_repeat_off() {
        // End of queue with shuffle on keeps picking indices instead of stopping
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            match advance(AdvanceTrigger::TrackEnded, RepeatMode::Off, true, 2, 3, &mut rng) {
                Advance::Play(i) => assert!(i < 3),
                other => panic!("expected Play, got {:?}", other),
            }
        }
    }

    #[test]
    fn explicit_next_wraps_even_with_repeat_off() {
        let got = advance(AdvanceTrigger::ExplicitNext, RepeatMode::Off, false, 2, 3, &mut rng());
        assert_eq!(got, Advance::Play(0));
    }

    #[test]
    fn explicit_previous_wraps_from_first_track() {
        let got = advance(AdvanceTrigger::ExplicitPrevious, RepeatMode::Off, false, 0, 3, &mut rng());
        assert_eq!(got, Advance::Play(2));
    }

    #[test]
    fn single_track_queue_never_panics() {
        let got = advance(AdvanceTrigger::ExplicitNext, RepeatMode::Off, false, 0, 1, &mut rng());
        assert_eq!(got, Advance::Play(0));
        let got = advance(AdvanceTrigger::ExplicitPrevious, RepeatMode::All, false, 0, 1, &mut rng());
        assert_eq!(got, Advance::Play(0));
        let got = advance(AdvanceTrigger::TrackEnded, RepeatMode::Off, false, 0, 1, &mut rng());
        assert_eq!(got, Advance::Stop);
    }

    #[test]
    fn empty_queue_stays_put() {
        let got = advance(AdvanceTrigger::ExplicitNext, RepeatMode::All, true, 0, 0, &mut rng());
        assert_eq!(got, Advance::Stay);
    }
}
