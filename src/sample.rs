//! Sample assets: immutable, pre-loaded audio that voices play back.
use crate::buffer::AudioChunk;
use crate::envelope::EnvelopeParameters;
use crate::reader::AudioReader;
use std::iter::FromIterator;

/// A set of MIDI note numbers (0 to 127).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoteMask(u128);

impl NoteMask {
    pub fn empty() -> Self {
        NoteMask(0)
    }

    pub fn all() -> Self {
        NoteMask(u128::max_value())
    }

    /// All notes from `low` to `high`, both inclusive.
    pub fn range(low: u8, high: u8) -> Self {
        (low..=high).filter(|note| *note < 128).collect()
    }

    pub fn insert(&mut self, note: u8) {
        if note < 128 {
            self.0 |= 1 << note;
        }
    }

    pub fn contains(&self, note: u8) -> bool {
        note < 128 && self.0 & (1 << note) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<u8> for NoteMask {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut mask = NoteMask::empty();
        for note in iter {
            mask.insert(note);
        }
        mask
    }
}

impl std::fmt::Debug for NoteMask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_set()
            .entries((0..128u8).filter(|note| self.contains(*note)))
            .finish()
    }
}

/// Describes something that can be played by a voice.
pub trait Sound {
    fn applies_to_note(&self, note: u8) -> bool;
    fn applies_to_channel(&self, channel: u8) -> bool;
}

/// A sound that plays back pre-loaded audio, pitched relative to a root note.
///
/// The audio holds at most two channels and is stored with [`GUARD_FRAMES`] extra frames
/// after the last usable frame, so that the resampler can always read the frame after
/// the one it is at without checking bounds. Guard frames hold the continuation of the
/// source when the source is longer than the usable length and zeros otherwise.
///
/// An asset for which no audio could be loaded is *silent*: it has no data and a voice
/// never produces sound for it.
///
/// [`GUARD_FRAMES`]: ./constant.GUARD_FRAMES.html
#[derive(Clone, Debug)]
pub struct SampleAsset {
    name: String,
    source_sample_rate: f64,
    root_note: u8,
    notes: NoteMask,
    length: usize,
    // `None` if and only if the asset is silent. Otherwise shape `[channels][length + GUARD_FRAMES]`.
    data: Option<AudioChunk<f32>>,
    envelope: EnvelopeParameters,
}

/// Number of frames stored after the last usable frame of a [`SampleAsset`].
///
/// [`SampleAsset`]: ./struct.SampleAsset.html
pub const GUARD_FRAMES: usize = 4;

impl SampleAsset {
    /// Load a sample asset from `reader`.
    ///
    /// At most `max_length_seconds` of audio and at most two channels are kept.
    /// `attack_seconds` and `release_seconds` configure the envelope of the voices that
    /// play the asset.
    ///
    /// If the reader reports no audio (no channels, no frames, or a non-positive sample
    /// rate), or if `max_length_seconds` leaves no frames, a silent asset is returned.
    ///
    /// Note: cannot be used in a real-time context
    /// -------------------------------------
    /// This method allocates memory and reads from `reader`.
    pub fn new<R, N>(
        name: N,
        reader: &mut R,
        notes: NoteMask,
        root_note: u8,
        attack_seconds: f64,
        release_seconds: f64,
        max_length_seconds: f64,
    ) -> Result<Self, R::Err>
    where
        R: AudioReader<f32>,
        N: Into<String>,
    {
        let name = name.into();
        let source_sample_rate = reader.frames_per_second();
        let source_frames = reader.number_of_frames();
        let envelope = EnvelopeParameters {
            attack: attack_seconds as f32,
            release: release_seconds as f32,
            ..EnvelopeParameters::default()
        };
        let mut asset = Self {
            name,
            source_sample_rate,
            root_note,
            notes,
            length: 0,
            data: None,
            envelope,
        };

        if !(source_sample_rate > 0.0) || source_frames == 0 {
            warn!(
                "Sample asset {:?} has no audio (sample rate {}, {} frames), it will be silent.",
                asset.name, source_sample_rate, source_frames
            );
            return Ok(asset);
        }
        let max_frames = (max_length_seconds * source_sample_rate).floor();
        let max_frames = if max_frames > 0.0 { max_frames as u64 } else { 0 };
        let length = std::cmp::min(source_frames, max_frames) as usize;
        let channels = std::cmp::min(2, reader.number_of_channels());
        if length == 0 || channels == 0 {
            warn!(
                "Sample asset {:?} has {} usable frames and {} channels, it will be silent.",
                asset.name, length, channels
            );
            return Ok(asset);
        }

        let mut data = AudioChunk::zero(channels, length + GUARD_FRAMES);
        let frames_to_read =
            std::cmp::min((length + GUARD_FRAMES) as u64, source_frames) as usize;
        {
            let mut slices: Vec<&mut [f32]> = data
                .as_mut_slices()
                .into_iter()
                .map(|channel| &mut channel[..frames_to_read])
                .collect();
            reader.read(&mut slices, 0)?;
        }
        debug!(
            "Loaded sample asset {:?}: {} frames, {} channel(s) at {} Hz, root note {}.",
            asset.name, length, channels, source_sample_rate, root_note
        );
        asset.length = length;
        asset.data = Some(data);
        Ok(asset)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_sample_rate(&self) -> f64 {
        self.source_sample_rate
    }

    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    pub fn notes(&self) -> NoteMask {
        self.notes
    }

    /// The number of usable frames, guard frames not included.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The number of channels: 0 for a silent asset, 1 or 2 otherwise.
    pub fn channels(&self) -> usize {
        self.data
            .as_ref()
            .map(|data| data.number_of_channels())
            .unwrap_or(0)
    }

    pub fn is_silent(&self) -> bool {
        self.data.is_none()
    }

    pub fn envelope_parameters(&self) -> EnvelopeParameters {
        self.envelope
    }

    /// The frames of the given channel, guard frames included.
    ///
    /// # Panics
    /// Panics if the asset is silent or if `channel >= self.channels()`.
    pub fn channel_data(&self, channel: usize) -> &[f32] {
        match self.data {
            Some(ref data) => data.channel(channel),
            None => panic!("Sample asset {:?} is silent and has no data.", self.name),
        }
    }
}

impl Sound for SampleAsset {
    fn applies_to_note(&self, note: u8) -> bool {
        self.notes.contains(note)
    }

    fn applies_to_channel(&self, _channel: u8) -> bool {
        true
    }
}
