//! Audio buffers.
//!
//! ## Some audio concepts
//! A *sample* is a single number representing the air pressure at a given time.
//! Inside this crate, it is represented by an `f32`.
//!
//! A *channel* usually corresponds with a speaker or a number of speakers.
//! E.g. in a stereo setup, there is a "left" channel and a "right" channel.
//!
//! A *frame* consists of the samples for all the channels at a given time.
//!
//! A *chunk* consists of the samples for all channels for a given time period.
//! (Non-standard terminology.)
//!
//!```text
//!                         ┌ chunk     ┌ frame
//!             ┌ sample    ↓           ↓
//!             │      ┌─────────┐     ┌─┐
//!          ┌──↓──────┼─────────┼─────┼─┼───────────────────┐
//! channel →│• • • • •│• • • • •│• • •│•│• • • • • • • • • •│
//!          └─────────┼─────────┼─────┼─┼───────────────────┘
//!           • • • • •│• • • • •│• • •│•│• • • • • • • • • •
//!                    │         │     │ │
//!           • • • • •│• • • • •│• • •│•│• • • • • • • • • •
//!                    └─────────┘     └─┘
//! ```
//!
//! Output buffers are passed around as `&mut [&mut [f32]]`: one slice per channel.
//! Everything that renders into such a buffer *adds* to it, so that several voices can
//! share the same output.
use num_traits::Zero;
use std::ops::{Add, Range};

/// Owned audio with a fixed number of channels that all have the same length.
#[derive(Clone, PartialEq, Debug)]
pub struct AudioChunk<F> {
    // Invariant: all channels have the same length.
    channels: Vec<Vec<F>>,
}

impl<F> Default for AudioChunk<F> {
    /// An `AudioChunk` without channels. Does not allocate.
    fn default() -> Self {
        Self {
            channels: Vec::new(),
        }
    }
}

impl<F> AudioChunk<F> {
    /// Note: cannot be used in a real-time context
    /// -------------------------------------
    /// This method allocates memory and cannot be used in a real-time context.
    pub fn zero(number_of_channels: usize, number_of_frames: usize) -> Self
    where
        F: Zero + Clone,
    {
        let mut channels = Vec::with_capacity(number_of_channels);
        for _ in 0..number_of_channels {
            channels.push(vec![F::zero(); number_of_frames]);
        }
        Self { channels }
    }

    /// # Panics
    /// Panics if `channels` is empty or if not all channels have the same length.
    pub fn from_channels(channels: Vec<Vec<F>>) -> Self {
        assert!(!channels.is_empty());
        let len = channels[0].len();
        for channel in channels.iter() {
            assert_eq!(len, channel.len());
        }

        Self { channels }
    }

    pub fn channels(&self) -> &[Vec<F>] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> &[F] {
        &self.channels[index]
    }

    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn number_of_frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Borrow the first two channels mutably at the same time.
    ///
    /// # Panics
    /// Panics if the chunk has less than two channels.
    pub fn stereo_mut(&mut self) -> (&mut [F], &mut [F]) {
        let (left, rest) = self.channels.split_at_mut(1);
        (left[0].as_mut_slice(), rest[0].as_mut_slice())
    }

    /// Note: cannot be used in a real-time context
    /// -------------------------------------
    /// This method allocates memory and cannot be used in a real-time context.
    pub fn as_mut_slices(&mut self) -> Vec<&mut [F]> {
        self.channels
            .iter_mut()
            .map(|element| element.as_mut_slice())
            .collect()
    }

    pub fn clear(&mut self)
    where
        F: Zero,
    {
        for channel in self.channels.iter_mut() {
            for sample in channel.iter_mut() {
                *sample = F::zero();
            }
        }
    }

    /// Set the given frames to zero in every channel.
    pub fn clear_frames(&mut self, frames: Range<usize>)
    where
        F: Zero,
    {
        for channel in self.channels.iter_mut() {
            for sample in channel[frames.clone()].iter_mut() {
                *sample = F::zero();
            }
        }
    }

    /// Add the first `number_of_frames` frames of this chunk to `output`, starting at
    /// `start` in `output`, for every channel that exists in both.
    ///
    /// # Panics
    /// Panics if an output channel that is used is shorter than `start + number_of_frames`
    /// or if `number_of_frames` exceeds the length of this chunk.
    pub fn add_to(&self, output: &mut [&mut [F]], start: usize, number_of_frames: usize)
    where
        F: Copy + Add<Output = F>,
    {
        for (output_channel, input_channel) in output.iter_mut().zip(self.channels.iter()) {
            let destination = &mut output_channel[start..start + number_of_frames];
            for (out, sample) in destination.iter_mut().zip(&input_channel[..number_of_frames]) {
                *out = *out + *sample;
            }
        }
    }
}

impl AudioChunk<f32> {
    /// Multiply the first `number_of_frames` frames of the given channel with a gain that
    /// goes linearly from `start_gain` to `end_gain`.
    /// The first frame is multiplied with `start_gain`, `end_gain` itself is never reached.
    pub fn apply_gain_ramp(
        &mut self,
        channel: usize,
        number_of_frames: usize,
        start_gain: f32,
        end_gain: f32,
    ) {
        if number_of_frames == 0 {
            return;
        }
        let increment = (end_gain - start_gain) / number_of_frames as f32;
        let mut gain = start_gain;
        for sample in self.channels[channel][..number_of_frames].iter_mut() {
            *sample *= gain;
            gain += increment;
        }
    }
}

/// Initialize a slice of buffers to zero.
pub fn initialize_to_zero<F: Zero>(buffers: &mut [&mut [F]]) {
    for buffer in buffers.iter_mut() {
        for sample in buffer.iter_mut() {
            *sample = F::zero();
        }
    }
}

#[macro_export]
macro_rules! audio_chunk {
    [
        [
            $head_head:expr
            $(
                , $head_tail: expr
            )*
        ]
        $(
            ,
            [
                $tail_head:expr
                $(
                    , $tail_tail: expr
                )*
            ]
        )*
    ] => {
        $crate::buffer::AudioChunk::from_channels(
            vec![
                vec![
                    $head_head
                    $(
                        , $head_tail
                    )*
                ]
                $(
                    , vec![
                        $tail_head
                        $(
                            , $tail_tail
                        )*
                    ]
                )*
            ]
        )
    };
}

#[test]
fn clear_frames_only_touches_the_given_range() {
    let mut chunk = audio_chunk![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]];
    chunk.clear_frames(1..3);
    assert_eq!(chunk, audio_chunk![[1.0, 0.0, 0.0, 4.0], [5.0, 0.0, 0.0, 8.0]]);
}

#[test]
fn gain_ramp_starts_at_start_gain_and_leaves_the_tail_alone() {
    let mut chunk = audio_chunk![[1.0f32, 1.0, 1.0, 1.0, 1.0], [2.0, 2.0, 2.0, 2.0, 2.0]];
    chunk.apply_gain_ramp(0, 4, 1.0, 0.0);
    assert_eq!(chunk.channel(0), &[1.0, 0.75, 0.5, 0.25, 1.0]);
    assert_eq!(chunk.channel(1), &[2.0, 2.0, 2.0, 2.0, 2.0]);
}

#[test]
fn gain_ramp_over_zero_frames_does_nothing() {
    let mut chunk = audio_chunk![[1.0f32, 1.0]];
    chunk.apply_gain_ramp(0, 0, 0.5, 0.0);
    assert_eq!(chunk.channel(0), &[1.0, 1.0]);
}

#[test]
fn add_to_accumulates_at_the_offset() {
    let chunk = audio_chunk![[1, 2, 3], [4, 5, 6]];
    let mut output = audio_chunk![[10, 10, 10, 10], [20, 20, 20, 20]];
    {
        let mut slices = output.as_mut_slices();
        chunk.add_to(&mut slices, 1, 2);
    }
    assert_eq!(output, audio_chunk![[10, 11, 12, 10], [20, 24, 25, 20]]);
}

#[test]
fn add_to_skips_channels_missing_in_the_output() {
    let chunk = audio_chunk![[1.0, 1.0], [2.0, 2.0]];
    let mut output = audio_chunk![[0.5, 0.5]];
    {
        let mut slices = output.as_mut_slices();
        chunk.add_to(&mut slices, 0, 2);
    }
    assert_eq!(output, audio_chunk![[1.5, 1.5]]);
}

#[test]
fn stereo_mut_gives_both_channels() {
    let mut chunk = audio_chunk![[0, 0], [0, 0]];
    {
        let (left, right) = chunk.stereo_mut();
        left[0] = 1;
        right[1] = 2;
    }
    assert_eq!(chunk, audio_chunk![[1, 0], [0, 2]]);
}

#[test]
fn default_chunk_has_no_frames() {
    let chunk = AudioChunk::<f32>::default();
    assert_eq!(chunk.number_of_channels(), 0);
    assert_eq!(chunk.number_of_frames(), 0);
}
