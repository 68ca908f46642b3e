//! Amplitude envelopes.
//!
//! A voice does not shape its own amplitude: it asks an [`EnvelopeGenerator`] for one
//! gain value per frame. [`Adsr`] is the generator used by default.
//!
//! [`EnvelopeGenerator`]: ./trait.EnvelopeGenerator.html
//! [`Adsr`]: ./adsr/struct.Adsr.html

pub mod adsr;

pub use self::adsr::Adsr;

/// Timing of an attack-decay-sustain-release envelope.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EnvelopeParameters {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level, between `0.0` and `1.0`.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.1,
            sustain: 1.0,
            release: 0.1,
        }
    }
}

impl EnvelopeParameters {
    /// Default parameters with the given attack and release times (in seconds).
    pub fn with_attack_and_release(attack: f32, release: f32) -> Self {
        Self {
            attack,
            release,
            ..Self::default()
        }
    }
}

/// Defines the behaviour of an envelope generator.
///
/// The generator is advanced by calling `next_sample` exactly once per frame.
/// Implementations must not allocate in any of these methods: they are called from the
/// real-time thread.
pub trait EnvelopeGenerator {
    /// Set the rate (in frames per second) at which `next_sample` will be called.
    fn set_sample_rate(&mut self, sample_rate: f64);

    fn set_parameters(&mut self, parameters: EnvelopeParameters);

    /// Start the envelope from the attack phase.
    fn note_on(&mut self);

    /// Start the release phase.
    fn note_off(&mut self);

    /// Go back to idle immediately, the level becomes `0.0`.
    fn reset(&mut self);

    /// Advance one frame and return the gain for that frame, between `0.0` and `1.0`.
    fn next_sample(&mut self) -> f32;

    /// Return `false` when the envelope is idle: every subsequent call to `next_sample`
    /// returns `0.0` until `note_on` is called.
    fn is_active(&self) -> bool;
}
