//! Utilities for testing.

use crate::buffer::AudioChunk;
use crate::envelope::{EnvelopeGenerator, EnvelopeParameters};
use crate::reader::memory::AudioBufferReader;
use crate::sample::{NoteMask, SampleAsset};
use std::sync::Arc;

/// An envelope generator with a fixed level, useful for checking rendered audio exactly.
///
/// It is active from `note_on` until `reset`. `note_off` is only counted: the level stays
/// the same, as if the release were infinitely long.
#[derive(Clone, Debug)]
pub struct ConstantEnvelope {
    level: f32,
    active: bool,
    note_offs: usize,
    sample_rate: Option<f64>,
    parameters: Option<EnvelopeParameters>,
}

impl ConstantEnvelope {
    pub fn new(level: f32) -> Self {
        Self {
            level,
            active: false,
            note_offs: 0,
            sample_rate: None,
            parameters: None,
        }
    }

    /// The number of times `note_off` has been called.
    pub fn note_offs(&self) -> usize {
        self.note_offs
    }

    /// The last sample rate passed to `set_sample_rate`, if any.
    pub fn sample_rate(&self) -> Option<f64> {
        self.sample_rate
    }

    /// The last parameters passed to `set_parameters`, if any.
    pub fn parameters(&self) -> Option<EnvelopeParameters> {
        self.parameters
    }
}

impl Default for ConstantEnvelope {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl EnvelopeGenerator for ConstantEnvelope {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = Some(sample_rate);
    }

    fn set_parameters(&mut self, parameters: EnvelopeParameters) {
        self.parameters = Some(parameters);
    }

    fn note_on(&mut self) {
        self.active = true;
    }

    fn note_off(&mut self) {
        self.note_offs += 1;
    }

    fn reset(&mut self) {
        self.active = false;
    }

    fn next_sample(&mut self) -> f32 {
        if self.active {
            self.level
        } else {
            0.0
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Build an asset that answers to every note from the given audio.
///
/// # Panics
/// Panics if `chunk` has no channels.
pub fn asset_from_chunk(
    chunk: &AudioChunk<f32>,
    sample_rate: f64,
    root_note: u8,
) -> Arc<SampleAsset> {
    let mut reader = AudioBufferReader::new(chunk, sample_rate);
    let max_length_seconds = chunk.number_of_frames() as f64 / sample_rate + 1.0;
    match SampleAsset::new(
        "test asset",
        &mut reader,
        NoteMask::all(),
        root_note,
        0.0,
        0.0,
        max_length_seconds,
    ) {
        Ok(asset) => Arc::new(asset),
        Err(never) => match never {},
    }
}

/// An asset in which every sample has the given value.
pub fn dc_asset(
    value: f32,
    number_of_channels: usize,
    length: usize,
    sample_rate: f64,
    root_note: u8,
) -> Arc<SampleAsset> {
    let chunk = AudioChunk::from_channels(vec![vec![value; length]; number_of_channels]);
    asset_from_chunk(&chunk, sample_rate, root_note)
}

/// A mono asset in which the sample at frame `i` has the value `i`.
pub fn ramp_asset(length: usize, sample_rate: f64, root_note: u8) -> Arc<SampleAsset> {
    let chunk = AudioChunk::from_channels(vec![(0..length).map(|i| i as f32).collect()]);
    asset_from_chunk(&chunk, sample_rate, root_note)
}

/// A silent asset (it has no audio at all).
pub fn silent_asset(root_note: u8) -> Arc<SampleAsset> {
    let chunk = AudioChunk::<f32>::zero(1, 0);
    let mut reader = AudioBufferReader::new(&chunk, 44100.0);
    match SampleAsset::new("silent", &mut reader, NoteMask::all(), root_note, 0.0, 0.0, 1.0) {
        Ok(asset) => Arc::new(asset),
        Err(never) => match never {},
    }
}

/// Assert that two sample slices are equal up to `tolerance`.
pub fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "expected {} samples, but got {}",
        expected.len(),
        actual.len()
    );
    for (index, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "mismatch in sample with index #{}: expected {} but got {}",
            index,
            e,
            a
        );
    }
}
