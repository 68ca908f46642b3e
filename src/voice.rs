//! Voices: the part of the sampler that turns a sample asset into sound.
//!
//! A voice plays one note at a time. It reads the asset with linear interpolation at a
//! speed that depends on the note, multiplies the result with an envelope and adds it to
//! the output buffer.
//!
//! ## Stopping without clicks
//! A voice that is stopped without tail-off (or that runs out of source audio) would
//! jump from its current level to silence, which is audible as a click. Instead, the
//! voice renders one more block of audio into a private buffer, fades that out
//! linearly and mixes the fade into the output at the start of the next call to
//! `render`. The voice is free to start a new note as soon as the fade has been
//! captured; the new note starts sounding after the fade has been mixed.
use crate::buffer::AudioChunk;
use crate::envelope::{Adsr, EnvelopeGenerator};
use crate::sample::{SampleAsset, Sound};
use std::mem;
use std::sync::Arc;

/// Implement this trait for a struct if you want to use it as a voice in a [`Sampler`].
///
/// Voices *add* to the output buffer (`sample += value` instead of `sample = value`).
///
/// [`Sampler`]: ../sampler/struct.Sampler.html
pub trait Voice {
    /// The type of sound this voice can play.
    type Sound: Sound;

    /// Return `true` if this voice can play the given sound.
    fn can_play(&self, sound: &Self::Sound) -> bool;

    /// Start playing the given note. `velocity` is between `0.0` and `1.0`.
    fn start_note(&mut self, note: u8, velocity: f32, sound: Arc<Self::Sound>);

    /// Stop the current note, with a release phase if `allow_tail_off` is `true`.
    fn stop_note(&mut self, velocity: f32, allow_tail_off: bool);

    /// Add `number_of_frames` frames of audio to `output`, starting at frame `start`.
    ///
    /// # Panics
    /// Implementations may panic if a channel in `output` has less than
    /// `start + number_of_frames` frames.
    fn render(&mut self, output: &mut [&mut [f32]], start: usize, number_of_frames: usize);

    fn pitch_wheel_moved(&mut self, value: u16);

    fn controller_moved(&mut self, controller: u8, value: u8);

    /// Set the sample rate (in frames per second) of the output.
    fn set_sample_rate(&mut self, sample_rate: f64);

    /// Return `false` if no note is assigned to the voice, so that it can start a new note.
    fn is_active(&self) -> bool;

    /// The note the voice is playing, if any.
    fn current_note(&self) -> Option<u8>;
}

/// What a voice does after a pending fade has been mixed into the output.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resume {
    Idle,
    Playing,
    Releasing,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VoiceState {
    /// Not playing anything.
    Idle,
    /// Playing a note.
    Playing,
    /// Playing a note in the release phase of its envelope.
    Releasing,
    /// Rendering the block that will be faded out. Stopping the voice has no effect.
    FadeCapturing,
    /// A fade-out is waiting to be mixed into the output by the next call to `render`.
    FadeFlushing(Resume),
}

impl From<Resume> for VoiceState {
    fn from(resume: Resume) -> Self {
        match resume {
            Resume::Idle => VoiceState::Idle,
            Resume::Playing => VoiceState::Playing,
            Resume::Releasing => VoiceState::Releasing,
        }
    }
}

enum RenderOutcome {
    Completed,
    SourceExhausted,
    EnvelopeFinished,
}

/// A voice that plays back a [`SampleAsset`].
///
/// The pitch is changed by changing the playback speed: a note `n` semitones above the
/// root note of the asset plays `2^(n/12)` times faster.
///
/// [`SampleAsset`]: ../sample/struct.SampleAsset.html
pub struct SamplerVoice<E = Adsr> {
    block_size: usize,
    output_sample_rate: f64,
    asset: Option<Arc<SampleAsset>>,
    note: Option<u8>,
    // Fractional read position in the asset, in source frames.
    source_position: f64,
    // Source frames per output frame.
    pitch_ratio: f64,
    left_gain: f32,
    right_gain: f32,
    // The envelope value at the first frame of the last call to `render_playing`.
    starting_gain: f32,
    // Always two channels of `block_size` frames.
    fade_buffer: AudioChunk<f32>,
    envelope: E,
    state: VoiceState,
}

impl SamplerVoice<Adsr> {
    /// Create a new voice with the default envelope.
    ///
    /// `block_size` is the largest number of frames that is rendered in one call to
    /// `render`; it is the length of the fade-out when the voice is stopped abruptly.
    ///
    /// Note: cannot be used in a real-time context
    /// -------------------------------------
    /// This method allocates memory and cannot be used in a real-time context.
    pub fn new(block_size: usize) -> Self {
        Self::with_envelope(block_size, Adsr::new())
    }
}

impl<E: EnvelopeGenerator> SamplerVoice<E> {
    /// Create a new voice with the given envelope generator.
    ///
    /// Note: cannot be used in a real-time context
    /// -------------------------------------
    /// This method allocates memory and cannot be used in a real-time context.
    pub fn with_envelope(block_size: usize, envelope: E) -> Self {
        Self {
            block_size,
            output_sample_rate: 44100.0,
            asset: None,
            note: None,
            source_position: 0.0,
            pitch_ratio: 1.0,
            left_gain: 0.0,
            right_gain: 0.0,
            starting_gain: 0.0,
            fade_buffer: AudioChunk::zero(2, block_size),
            envelope,
            state: VoiceState::Idle,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        debug_assert!(sample_rate > 0.0);
        self.output_sample_rate = sample_rate;
    }

    /// Start playing `asset` at the given note.
    ///
    /// If the voice has a pending fade-out, the fade is mixed in first and the note starts
    /// sounding in the call to `render` after that.
    /// A silent asset leaves the voice without a note.
    pub fn start(&mut self, note: u8, velocity: f32, asset: Arc<SampleAsset>) {
        if asset.is_silent() {
            debug!(
                "Not starting note {}: sample asset {:?} is silent.",
                note,
                asset.name()
            );
            self.clear_note();
            if let VoiceState::FadeFlushing(_) = self.state {
                self.state = VoiceState::FadeFlushing(Resume::Idle);
            } else {
                self.state = VoiceState::Idle;
            }
            return;
        }

        let semitones = note as f64 - asset.root_note() as f64;
        self.pitch_ratio = 2.0f64.powf(semitones / 12.0) * asset.source_sample_rate()
            / self.output_sample_rate;
        self.source_position = 0.0;
        self.left_gain = velocity;
        self.right_gain = velocity;

        self.envelope.set_sample_rate(asset.source_sample_rate());
        self.envelope.set_parameters(asset.envelope_parameters());
        self.envelope.note_on();

        debug!(
            "Starting note {} with sample asset {:?} (pitch ratio {}).",
            note,
            asset.name(),
            self.pitch_ratio
        );
        self.asset = Some(asset);
        self.note = Some(note);
        self.state = match self.state {
            VoiceState::FadeFlushing(_) => VoiceState::FadeFlushing(Resume::Playing),
            _ => VoiceState::Playing,
        };
    }

    /// Stop the current note.
    ///
    /// With `allow_tail_off`, the envelope enters its release phase and the voice keeps
    /// playing until the release has finished or the asset runs out.
    /// Without it, the voice fades out over at most one block.
    pub fn stop(&mut self, _velocity: f32, allow_tail_off: bool) {
        if allow_tail_off {
            self.tail_off();
        } else {
            self.hard_stop();
        }
    }

    fn tail_off(&mut self) {
        match self.state {
            VoiceState::Playing => {
                self.envelope.note_off();
                self.state = VoiceState::Releasing;
                debug!("Releasing note {:?}.", self.note);
            }
            VoiceState::FadeFlushing(Resume::Playing) => {
                self.envelope.note_off();
                self.state = VoiceState::FadeFlushing(Resume::Releasing);
                debug!("Releasing note {:?}.", self.note);
            }
            _ => {}
        }
    }

    fn hard_stop(&mut self) {
        match self.state {
            VoiceState::FadeCapturing => {
                trace!("Ignoring stop request while capturing a fade-out.");
                return;
            }
            VoiceState::Idle | VoiceState::FadeFlushing(Resume::Idle) => return,
            VoiceState::FadeFlushing(_) => {
                // The note was started after the fade and has not sounded yet.
                debug!("Dropping note {:?} before it has sounded.", self.note);
                self.clear_note();
                self.state = VoiceState::FadeFlushing(Resume::Idle);
                return;
            }
            VoiceState::Playing | VoiceState::Releasing => {}
        }
        debug!("Stopping note {:?} with a fade-out.", self.note);

        let block_size = self.block_size;
        let mut fade = mem::take(&mut self.fade_buffer);
        fade.clear();
        self.state = VoiceState::FadeCapturing;
        let outcome = {
            let (left, right) = fade.stereo_mut();
            let mut capture = [left, right];
            self.render_playing(&mut capture, 0, block_size)
        };
        // Running out of source audio during the capture tries to stop the voice again.
        self.finish(outcome);

        let ramp_end = if self.pitch_ratio >= 1.0 {
            block_size
        } else {
            (block_size as f64 * self.pitch_ratio).floor() as usize
        };
        fade.apply_gain_ramp(0, ramp_end, self.starting_gain, 0.0);
        fade.apply_gain_ramp(1, ramp_end, self.starting_gain, 0.0);
        fade.clear_frames(ramp_end..block_size);
        self.fade_buffer = fade;

        self.clear_note();
        self.state = VoiceState::FadeFlushing(Resume::Idle);
    }

    /// Add `number_of_frames` frames of audio to `output`, starting at frame `start`.
    ///
    /// Stereo assets are rendered to the first two output channels; with a single output
    /// channel, left and right are mixed. A pending fade-out is mixed into the first two
    /// channels and nothing else is rendered in that call.
    ///
    /// # Panics
    /// Panics if a channel of `output` that is written to has less than
    /// `start + number_of_frames` frames.
    pub fn render(&mut self, output: &mut [&mut [f32]], start: usize, number_of_frames: usize) {
        match self.state {
            VoiceState::Idle | VoiceState::FadeCapturing => {}
            VoiceState::FadeFlushing(resume) => {
                let frames = std::cmp::min(number_of_frames, self.block_size);
                self.fade_buffer.add_to(output, start, frames);
                self.state = resume.into();
            }
            VoiceState::Playing | VoiceState::Releasing => {
                let outcome = self.render_playing(output, start, number_of_frames);
                self.finish(outcome);
            }
        }
    }

    fn render_playing(
        &mut self,
        output: &mut [&mut [f32]],
        start: usize,
        number_of_frames: usize,
    ) -> RenderOutcome {
        let asset = match self.asset {
            Some(ref asset) => asset,
            None => return RenderOutcome::Completed,
        };
        let length = asset.length() as f64;
        if self.source_position >= length {
            return RenderOutcome::SourceExhausted;
        }
        let left_data = asset.channel_data(0);
        let right_data = if asset.channels() > 1 {
            asset.channel_data(1)
        } else {
            left_data
        };

        for frame in start..start + number_of_frames {
            // `index + 1 < length + GUARD_FRAMES` because `source_position < length`.
            let index = self.source_position as usize;
            let alpha = (self.source_position - index as f64) as f32;
            let inverse_alpha = 1.0 - alpha;
            let mut left = left_data[index] * inverse_alpha + left_data[index + 1] * alpha;
            let mut right = right_data[index] * inverse_alpha + right_data[index + 1] * alpha;

            let envelope_value = self.envelope.next_sample();
            if frame == start {
                self.starting_gain = envelope_value;
            }
            left *= self.left_gain * envelope_value;
            right *= self.right_gain * envelope_value;

            match output.len() {
                0 => {}
                1 => output[0][frame] += (left + right) * 0.5,
                _ => {
                    output[0][frame] += left;
                    output[1][frame] += right;
                }
            }

            self.source_position += self.pitch_ratio;
            if self.source_position >= length {
                return RenderOutcome::SourceExhausted;
            }
            if !self.envelope.is_active() {
                return RenderOutcome::EnvelopeFinished;
            }
        }
        RenderOutcome::Completed
    }

    fn finish(&mut self, outcome: RenderOutcome) {
        match outcome {
            RenderOutcome::Completed => {}
            RenderOutcome::SourceExhausted => {
                trace!("Note {:?} reached the end of its sample asset.", self.note);
                self.hard_stop();
            }
            RenderOutcome::EnvelopeFinished => {
                if self.state != VoiceState::FadeCapturing {
                    debug!("Note {:?} has been released.", self.note);
                    self.clear_note();
                    self.state = VoiceState::Idle;
                }
            }
        }
    }

    fn clear_note(&mut self) {
        self.asset = None;
        self.note = None;
        self.envelope.reset();
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Return `true` if a note is assigned to this voice.
    pub fn is_active(&self) -> bool {
        self.note.is_some()
    }

    pub fn current_note(&self) -> Option<u8> {
        self.note
    }

    pub fn asset(&self) -> Option<&Arc<SampleAsset>> {
        self.asset.as_ref()
    }

    /// Return `true` if a fade-out will be mixed into the output by the next call to
    /// `render`.
    pub fn has_pending_fade(&self) -> bool {
        match self.state {
            VoiceState::FadeFlushing(_) => true,
            _ => false,
        }
    }

    pub fn source_position(&self) -> f64 {
        self.source_position
    }

    pub fn pitch_ratio(&self) -> f64 {
        self.pitch_ratio
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn envelope(&self) -> &E {
        &self.envelope
    }
}

impl<E: EnvelopeGenerator> Voice for SamplerVoice<E> {
    type Sound = SampleAsset;

    fn can_play(&self, _sound: &SampleAsset) -> bool {
        true
    }

    fn start_note(&mut self, note: u8, velocity: f32, sound: Arc<SampleAsset>) {
        self.start(note, velocity, sound);
    }

    fn stop_note(&mut self, velocity: f32, allow_tail_off: bool) {
        self.stop(velocity, allow_tail_off);
    }

    fn render(&mut self, output: &mut [&mut [f32]], start: usize, number_of_frames: usize) {
        SamplerVoice::render(self, output, start, number_of_frames);
    }

    fn pitch_wheel_moved(&mut self, _value: u16) {}

    fn controller_moved(&mut self, _controller: u8, _value: u8) {}

    fn set_sample_rate(&mut self, sample_rate: f64) {
        SamplerVoice::set_sample_rate(self, sample_rate);
    }

    fn is_active(&self) -> bool {
        SamplerVoice::is_active(self)
    }

    fn current_note(&self) -> Option<u8> {
        self.note
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeParameters;
    use crate::test_utilities::{
        assert_close, dc_asset, ramp_asset, silent_asset, ConstantEnvelope,
    };

    const SAMPLE_RATE: f64 = 44100.0;

    fn voice(block_size: usize) -> SamplerVoice<ConstantEnvelope> {
        let mut voice = SamplerVoice::with_envelope(block_size, ConstantEnvelope::new(1.0));
        voice.set_sample_rate(SAMPLE_RATE);
        voice
    }

    fn render(
        voice: &mut SamplerVoice<ConstantEnvelope>,
        channels: usize,
        frames: usize,
    ) -> AudioChunk<f32> {
        let mut output = AudioChunk::zero(channels, frames);
        {
            let mut slices = output.as_mut_slices();
            voice.render(&mut slices, 0, frames);
        }
        output
    }

    #[test]
    fn plays_the_source_unchanged_at_the_root_note() {
        let mut voice = voice(16);
        voice.start(60, 1.0, ramp_asset(32, SAMPLE_RATE, 60));
        let output = render(&mut voice, 1, 8);
        assert_eq!(output.channel(0), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(voice.state(), VoiceState::Playing);
    }

    #[test]
    fn velocity_scales_both_channels() {
        let mut voice = voice(16);
        voice.start(60, 0.5, dc_asset(1.0, 2, 32, SAMPLE_RATE, 60));
        let output = render(&mut voice, 2, 4);
        assert_eq!(output.channel(0), &[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(output.channel(1), &[0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn interpolates_between_frames_an_octave_down() {
        let mut voice = voice(16);
        voice.start(48, 1.0, ramp_asset(32, SAMPLE_RATE, 60));
        let output = render(&mut voice, 1, 6);
        assert_eq!(output.channel(0), &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn position_advances_by_the_pitch_ratio_across_calls() {
        let mut voice = voice(64);
        voice.start(67, 1.0, dc_asset(1.0, 1, 10_000, SAMPLE_RATE, 60));
        let ratio = voice.pitch_ratio();
        let mut rendered = 0;
        for frames in &[13, 64, 1, 30] {
            render(&mut voice, 2, *frames);
            rendered += *frames;
            let expected = rendered as f64 * ratio;
            assert!((voice.source_position() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn pitch_ratio_follows_the_note_and_the_sample_rates() {
        let mut voice = voice(16);
        voice.start(69, 1.0, dc_asset(1.0, 1, 32, SAMPLE_RATE, 69));
        assert_eq!(voice.pitch_ratio(), 1.0);
        voice.start(81, 1.0, dc_asset(1.0, 1, 32, SAMPLE_RATE, 69));
        assert_eq!(voice.pitch_ratio(), 2.0);

        let mut slower = self::voice(16);
        slower.start(69, 1.0, dc_asset(1.0, 1, 32, 22050.0, 69));
        assert_eq!(slower.pitch_ratio(), 0.5);
    }

    #[test]
    fn start_configures_the_envelope_from_the_asset() {
        let mut voice = voice(16);
        voice.start(60, 1.0, dc_asset(1.0, 1, 32, 22050.0, 60));
        assert_eq!(voice.envelope().sample_rate(), Some(22050.0));
        assert_eq!(
            voice.envelope().parameters(),
            Some(EnvelopeParameters::with_attack_and_release(0.0, 0.0))
        );
        assert!(voice.envelope().is_active());
    }

    #[test]
    fn exhausting_the_source_stops_the_voice_after_exactly_its_length() {
        let mut voice = voice(64);
        voice.start(60, 1.0, dc_asset(1.0, 2, 100, SAMPLE_RATE, 60));
        let first = render(&mut voice, 2, 64);
        assert_eq!(first.channel(0), &[1.0; 64][..]);
        assert_eq!(voice.state(), VoiceState::Playing);

        let second = render(&mut voice, 2, 64);
        let mut expected = vec![1.0; 36];
        expected.extend(vec![0.0; 28]);
        assert_eq!(second.channel(0), &expected[..]);
        assert_eq!(second.channel(1), &expected[..]);
        assert_eq!(voice.state(), VoiceState::FadeFlushing(Resume::Idle));
        assert!(voice.has_pending_fade());
        assert!(!voice.is_active());

        // The source ended exactly at a frame boundary, so the fade-out is silent.
        let third = render(&mut voice, 2, 64);
        assert_eq!(third.channel(0), &[0.0; 64][..]);
        assert_eq!(voice.state(), VoiceState::Idle);
    }

    #[test]
    fn hard_stop_fades_out_over_the_pitch_scaled_block() {
        let mut voice = voice(64);
        voice.start(48, 1.0, dc_asset(1.0, 2, 1000, SAMPLE_RATE, 60));
        assert_eq!(voice.pitch_ratio(), 0.5);
        render(&mut voice, 2, 64);

        voice.stop(0.0, false);
        assert_eq!(voice.state(), VoiceState::FadeFlushing(Resume::Idle));
        assert!(!voice.is_active());

        let fade = render(&mut voice, 2, 64);
        let expected: Vec<f32> = (0..64)
            .map(|i| if i < 32 { 1.0 - i as f32 / 32.0 } else { 0.0 })
            .collect();
        assert_eq!(fade.channel(0), &expected[..]);
        assert_eq!(fade.channel(1), &expected[..]);
        assert_eq!(voice.state(), VoiceState::Idle);

        let after = render(&mut voice, 2, 64);
        assert_eq!(after.channel(0), &[0.0; 64][..]);
    }

    #[test]
    fn running_out_during_the_fade_capture_does_not_stop_twice() {
        let mut voice = voice(64);
        voice.start(60, 1.0, dc_asset(1.0, 2, 10, SAMPLE_RATE, 60));
        let start = render(&mut voice, 2, 4);
        assert_eq!(start.channel(0), &[1.0; 4]);

        // The capture reaches the end of the source after 6 frames and tries to stop the
        // voice again.
        voice.stop(0.0, false);
        assert_eq!(voice.state(), VoiceState::FadeFlushing(Resume::Idle));

        let fade = render(&mut voice, 2, 64);
        let expected: Vec<f32> = (0..64)
            .map(|i| if i < 6 { 1.0 - i as f32 / 64.0 } else { 0.0 })
            .collect();
        assert_eq!(fade.channel(0), &expected[..]);
        assert_eq!(fade.channel(1), &expected[..]);
        assert_eq!(voice.state(), VoiceState::Idle);

        let after = render(&mut voice, 2, 64);
        assert_eq!(after.channel(0), &[0.0; 64][..]);
    }

    #[test]
    fn two_voices_add_to_the_same_output() {
        let mut first = voice(16);
        let mut second = voice(16);
        first.start(60, 1.0, ramp_asset(32, SAMPLE_RATE, 60));
        second.start(60, 0.5, dc_asset(1.0, 2, 32, SAMPLE_RATE, 60));

        let mut output = AudioChunk::from_channels(vec![vec![10.0; 4], vec![20.0; 4]]);
        {
            let mut slices = output.as_mut_slices();
            first.render(&mut slices, 0, 4);
            second.render(&mut slices, 0, 4);
        }
        assert_eq!(output.channel(0), &[10.5, 11.5, 12.5, 13.5]);
        assert_eq!(output.channel(1), &[20.5, 21.5, 22.5, 23.5]);
    }

    #[test]
    fn a_silent_asset_never_produces_sound() {
        let mut voice = voice(16);
        voice.start(60, 1.0, silent_asset(60));
        assert!(!voice.is_active());
        assert_eq!(voice.state(), VoiceState::Idle);
        let output = render(&mut voice, 2, 16);
        assert_eq!(output.channel(0), &[0.0; 16]);
        assert_eq!(output.channel(1), &[0.0; 16]);
    }

    #[test]
    fn mono_output_mixes_left_and_right() {
        let mut voice = voice(16);
        let chunk = AudioChunk::from_channels(vec![vec![1.0; 8], vec![0.0; 8]]);
        voice.start(60, 1.0, crate::test_utilities::asset_from_chunk(&chunk, SAMPLE_RATE, 60));
        let output = render(&mut voice, 1, 4);
        assert_eq!(output.channel(0), &[0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn rendering_without_output_channels_still_advances() {
        let mut voice = voice(16);
        voice.start(60, 1.0, dc_asset(1.0, 1, 32, SAMPLE_RATE, 60));
        voice.render(&mut [], 0, 5);
        assert_eq!(voice.source_position(), 5.0);
    }

    #[test]
    fn render_writes_at_the_given_offset() {
        let mut voice = voice(16);
        voice.start(60, 1.0, ramp_asset(32, SAMPLE_RATE, 60));
        let mut output = AudioChunk::zero(2, 6);
        {
            let mut slices = output.as_mut_slices();
            voice.render(&mut slices, 2, 3);
        }
        assert_eq!(output.channel(0), &[0.0, 0.0, 0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn tail_off_keeps_playing_in_the_release_phase() {
        let mut voice = voice(16);
        voice.start(60, 1.0, dc_asset(1.0, 1, 32, SAMPLE_RATE, 60));
        voice.stop(1.0, true);
        assert_eq!(voice.state(), VoiceState::Releasing);
        assert_eq!(voice.envelope().note_offs(), 1);
        assert!(voice.is_active());
        let output = render(&mut voice, 1, 4);
        assert_eq!(output.channel(0), &[1.0; 4]);
    }

    #[test]
    fn voice_is_freed_when_the_release_has_finished() {
        let mut voice = SamplerVoice::new(16);
        voice.set_sample_rate(100.0);
        let chunk = AudioChunk::from_channels(vec![vec![1.0; 100]]);
        let mut reader = crate::reader::memory::AudioBufferReader::new(&chunk, 100.0);
        let asset = crate::sample::SampleAsset::new(
            "released",
            &mut reader,
            crate::sample::NoteMask::all(),
            60,
            0.0,
            0.04,
            1.0,
        )
        .unwrap();
        voice.start(60, 1.0, Arc::new(asset));
        voice.stop(1.0, true);
        let mut output = AudioChunk::zero(1, 8);
        {
            let mut slices = output.as_mut_slices();
            voice.render(&mut slices, 0, 8);
        }
        assert_close(output.channel(0), &[0.75, 0.5, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0], 1e-6);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert!(!voice.is_active());
    }

    #[test]
    fn hard_stop_while_idle_does_nothing() {
        let mut voice = voice(16);
        voice.stop(0.0, false);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert!(!voice.has_pending_fade());
    }

    #[test]
    fn a_new_note_starts_after_the_pending_fade() {
        let mut voice = voice(8);
        voice.start(60, 1.0, dc_asset(1.0, 2, 100, SAMPLE_RATE, 60));
        render(&mut voice, 2, 8);
        voice.stop(0.0, false);

        voice.start(60, 0.5, dc_asset(1.0, 2, 100, SAMPLE_RATE, 60));
        assert_eq!(voice.state(), VoiceState::FadeFlushing(Resume::Playing));
        assert!(voice.is_active());

        let fade = render(&mut voice, 2, 8);
        let expected: Vec<f32> = (0..8).map(|i| 1.0 - i as f32 / 8.0).collect();
        assert_eq!(fade.channel(0), &expected[..]);
        assert_eq!(voice.state(), VoiceState::Playing);

        let next = render(&mut voice, 2, 8);
        assert_eq!(next.channel(0), &[0.5; 8]);
    }

    #[test]
    fn stopping_a_note_that_has_not_sounded_keeps_the_fade() {
        let mut voice = voice(8);
        voice.start(60, 1.0, dc_asset(1.0, 2, 100, SAMPLE_RATE, 60));
        render(&mut voice, 2, 8);
        voice.stop(0.0, false);
        voice.start(62, 1.0, dc_asset(1.0, 2, 100, SAMPLE_RATE, 60));

        voice.stop(1.0, true);
        assert_eq!(voice.state(), VoiceState::FadeFlushing(Resume::Releasing));
        voice.stop(0.0, false);
        assert_eq!(voice.state(), VoiceState::FadeFlushing(Resume::Idle));
        assert!(!voice.is_active());

        let fade = render(&mut voice, 2, 8);
        assert_eq!(fade.channel(0)[0], 1.0);
        assert_eq!(voice.state(), VoiceState::Idle);
    }

    #[test]
    fn flushing_a_fade_into_a_shorter_block_only_uses_its_start() {
        let mut voice = voice(8);
        voice.start(60, 1.0, dc_asset(1.0, 2, 100, SAMPLE_RATE, 60));
        render(&mut voice, 2, 8);
        voice.stop(0.0, false);
        let fade = render(&mut voice, 1, 4);
        assert_eq!(fade.channel(0), &[1.0, 0.875, 0.75, 0.625]);
        assert_eq!(voice.state(), VoiceState::Idle);
    }
}
