//! # Rsampler
//! Real-time sample playback: play pre-loaded audio at any pitch, shaped by an envelope,
//! and stop it without clicks.
//!
//! ## Overview
//! * A [`SampleAsset`] holds the audio of one sound, read once with an [`AudioReader`]
//!   (from memory, or from a `.wav` file with the `reader-hound` feature).
//! * A [`SamplerVoice`] plays one note of a sample asset. It resamples the audio with
//!   linear interpolation, applies an [`EnvelopeGenerator`] and adds the result to the
//!   output buffer. When it is stopped abruptly, or when the audio runs out, it fades out
//!   over one block instead of jumping to silence.
//! * A [`Sampler`] distributes midi notes over a fixed set of voices.
//!
//! ## Real-time
//! Rendering and stopping voices does not allocate memory. Everything that allocates is
//! marked with
//!
//! Note: cannot be used in a real-time context
//! -------------------------------------
//!
//! in its documentation.
//!
//! ## Logging
//! This crate logs with the [`log`](https://crates.io/crates/log) crate. It does not
//! install a logger.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use rsampler::buffer::{AudioChunk, initialize_to_zero};
//! use rsampler::reader::memory::AudioBufferReader;
//! use rsampler::sample::{NoteMask, SampleAsset};
//! use rsampler::voice::SamplerVoice;
//! use rsampler::{AudioHandler, Sampler};
//!
//! let audio = AudioChunk::from_channels(vec![vec![0.5; 4410], vec![0.5; 4410]]);
//! let mut reader = AudioBufferReader::new(&audio, 44100.0);
//! let asset = SampleAsset::new("beep", &mut reader, NoteMask::all(), 60, 0.01, 0.1, 1.0)
//!     .unwrap();
//!
//! let mut sampler = Sampler::new((0..8).map(|_| SamplerVoice::new(256)).collect());
//! sampler.set_sample_rate(44100.0);
//! sampler.add_sound(Arc::new(asset));
//! sampler.note_on(0, 64, 0.8);
//!
//! let mut output = AudioChunk::zero(2, 256);
//! let mut slices = output.as_mut_slices();
//! initialize_to_zero(&mut slices);
//! sampler.render(&mut slices, 0, 256);
//! ```
//!
//! [`SampleAsset`]: ./sample/struct.SampleAsset.html
//! [`AudioReader`]: ./reader/trait.AudioReader.html
//! [`SamplerVoice`]: ./voice/struct.SamplerVoice.html
//! [`EnvelopeGenerator`]: ./envelope/trait.EnvelopeGenerator.html
//! [`Sampler`]: ./sampler/struct.Sampler.html
#[macro_use]
extern crate log;

#[macro_use]
pub mod buffer;
pub mod envelope;
pub mod event;
pub mod reader;
pub mod sample;
pub mod sampler;
pub mod test_utilities;
pub mod voice;

pub use crate::sampler::Sampler;

/// Define how sample-rate changes are handled.
pub trait AudioHandler {
    /// Called when the sample-rate changes.
    /// Should be called before any audio is rendered.
    ///
    /// # Parameters
    /// `sample_rate`: The new sample rate in frames per second (Hz).
    /// Common sample rates are 44100 Hz (CD quality) and 48000 Hz.
    fn set_sample_rate(&mut self, sample_rate: f64);
}
