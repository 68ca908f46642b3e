//! Sources of audio data for building sample assets.
//!
//! Currently, the following readers are available:
//!
//! * Memory: [`AudioChunkReader`]: read from an [`AudioChunk`], useful for tests and for
//!   audio that has been generated or decoded elsewhere.
//! * Hound: [`HoundAudioReader`]: read `.wav` files (behind the "reader-hound" feature).
//!
//! [`AudioChunkReader`]: ./memory/struct.AudioChunkReader.html
//! [`AudioChunk`]: ../buffer/struct.AudioChunk.html
//! [`HoundAudioReader`]: ./hound/struct.HoundAudioReader.html

#[cfg(feature = "reader-hound")]
pub mod hound;
pub mod memory;

/// Defines an interface for reading audio with random access.
pub trait AudioReader<S> {
    type Err;

    /// The number of channels in the source.
    fn number_of_channels(&self) -> usize;

    fn frames_per_second(&self) -> f64;

    /// The total number of frames in the source.
    fn number_of_frames(&self) -> u64;

    /// Read audio, starting at frame `start_frame` of the source.
    ///
    /// Every slice in `output` is filled with the corresponding channel of the source, up
    /// to the length of `output[0]`. The source may have more channels than `output`: the
    /// remaining channels are skipped. Frames beyond the end of the source are left
    /// untouched.
    ///
    /// Returns the number of frames that have been written.
    fn read(&mut self, output: &mut [&mut [S]], start_frame: u64) -> Result<usize, Self::Err>;
}
