//! Synthetic analog inputs for the emulated board.
//!
//! Each channel carries one [`Waveform`]. Phase advances by one step every time
//! that channel is converted, so the shape is visible in `history` output
//! regardless of the conversion rate.

use std::f32::consts::TAU;
use std::fmt;

use scanner_core::TOP;
use scanner_core::sim::SignalSource;

/// Conversions per waveform period.
pub const PERIOD: u32 = 64;

const FULL_SCALE: u16 = TOP - 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Waveform {
    Constant(u16),
    Sawtooth,
    Triangle,
    Square,
    Sine,
    /// Uniform noise from a xorshift generator seeded per channel.
    Noise { state: u32 },
}

impl Waveform {
    /// Raw count at `phase` (in `0..PERIOD`).
    fn level(&mut self, phase: u32) -> u16 {
        match self {
            Waveform::Constant(value) => (*value).min(FULL_SCALE),
            Waveform::Sawtooth => ramp(phase, PERIOD),
            Waveform::Triangle => {
                let half = PERIOD / 2;
                if phase < half {
                    ramp(phase, half)
                } else {
                    FULL_SCALE - ramp(phase - half, half)
                }
            }
            Waveform::Square => {
                if phase < PERIOD / 2 {
                    FULL_SCALE
                } else {
                    0
                }
            }
            Waveform::Sine => {
                let angle = TAU * phase_fraction(phase);
                let unit = 0.5 + 0.5 * angle.sin();
                to_count(unit)
            }
            Waveform::Noise { state } => {
                *state ^= *state << 13;
                *state ^= *state >> 17;
                *state ^= *state << 5;
                u16::try_from(*state % u32::from(TOP)).unwrap_or(FULL_SCALE)
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Waveform::Constant(_) => "constant",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
            Waveform::Sine => "sine",
            Waveform::Noise { .. } => "noise",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waveform::Constant(value) => write!(f, "constant({value})"),
            other => f.write_str(other.label()),
        }
    }
}

fn ramp(phase: u32, span: u32) -> u16 {
    let scaled = u32::from(FULL_SCALE) * phase / span.saturating_sub(1).max(1);
    u16::try_from(scaled.min(u32::from(FULL_SCALE))).unwrap_or(FULL_SCALE)
}

#[allow(clippy::cast_precision_loss)]
fn phase_fraction(phase: u32) -> f32 {
    phase as f32 / PERIOD as f32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(unit: f32) -> u16 {
    (unit.clamp(0.0, 1.0) * f32::from(FULL_SCALE)).round() as u16
}

/// One waveform per channel, with an independent phase for each.
pub struct Waveforms {
    channels: Vec<(Waveform, u32)>,
}

impl Waveforms {
    pub fn new(waveforms: impl IntoIterator<Item = Waveform>) -> Self {
        Self {
            channels: waveforms.into_iter().map(|waveform| (waveform, 0)).collect(),
        }
    }

    /// The emulated board: a mid-scale constant followed by one of each
    /// periodic shape and a noisy input.
    pub fn board(channels: usize) -> Self {
        let palette = [
            Waveform::Constant(TOP / 2),
            Waveform::Sawtooth,
            Waveform::Sine,
            Waveform::Square,
            Waveform::Triangle,
            Waveform::Noise { state: 0x2545_F491 },
        ];
        Self::new((0..channels).map(|index| match palette[index % palette.len()] {
            Waveform::Noise { state } => Waveform::Noise {
                state: state.wrapping_add(u32::try_from(index).unwrap_or(0)),
            },
            waveform => waveform,
        }))
    }

    pub fn waveform(&self, channel: usize) -> Option<Waveform> {
        self.channels.get(channel).map(|(waveform, _)| *waveform)
    }
}

impl SignalSource for Waveforms {
    fn sample(&mut self, channel: u8) -> u16 {
        let Some((waveform, phase)) = self.channels.get_mut(usize::from(channel)) else {
            // Unconnected inputs float to ground.
            return 0;
        };
        let level = waveform.level(*phase);
        *phase = (*phase + 1) % PERIOD;
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_waveform_stays_below_top() {
        let mut source = Waveforms::board(6);
        for _ in 0..(PERIOD * 3) {
            for channel in 0..6 {
                assert!(source.sample(channel) < TOP);
            }
        }
    }

    #[test]
    fn sawtooth_spans_the_full_range_once_per_period() {
        let mut source = Waveforms::new([Waveform::Sawtooth]);
        let samples: Vec<u16> = (0..PERIOD).map(|_| source.sample(0)).collect();
        assert_eq!(samples.first(), Some(&0));
        assert_eq!(samples.last(), Some(&FULL_SCALE));
        assert!(samples.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(source.sample(0), 0);
    }

    #[test]
    fn square_wave_toggles_at_half_period() {
        let mut source = Waveforms::new([Waveform::Square]);
        let samples: Vec<u16> = (0..PERIOD).map(|_| source.sample(0)).collect();
        let half = usize::try_from(PERIOD / 2).expect("small period");
        assert!(samples[..half].iter().all(|value| *value == FULL_SCALE));
        assert!(samples[half..].iter().all(|value| *value == 0));
    }

    #[test]
    fn phases_advance_per_channel() {
        let mut source = Waveforms::new([Waveform::Sawtooth, Waveform::Sawtooth]);
        let _ = source.sample(0);
        let _ = source.sample(0);
        assert_eq!(source.sample(1), 0);
    }

    #[test]
    fn unknown_channels_read_as_ground() {
        let mut source = Waveforms::new([Waveform::Constant(700)]);
        assert_eq!(source.sample(0), 700);
        assert_eq!(source.sample(7), 0);
    }

    #[test]
    fn board_labels_match_the_channel_layout() {
        let source = Waveforms::board(6);
        assert!(source.waveform(5).is_some());
        assert_eq!(source.waveform(0).map(|w| w.to_string()).as_deref(), Some("constant(512)"));
        assert_eq!(source.waveform(2).map(|w| w.to_string()).as_deref(), Some("sine"));
        assert!(source.waveform(6).is_none());
    }
}
