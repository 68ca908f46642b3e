//! In-memory reader, useful for testing.
use super::AudioReader;
use crate::buffer::AudioChunk;
use std::borrow::Borrow;
use std::marker::PhantomData;

/// An [`AudioReader`] that reads from a given [`AudioChunk`].
/// The generic parameter type `S` represents the sample type.
///
/// [`AudioReader`]: ../trait.AudioReader.html
/// [`AudioChunk`]: ../../buffer/struct.AudioChunk.html
pub struct AudioChunkReader<S, T>
where
    T: Borrow<AudioChunk<S>>,
    S: Copy,
{
    frames_per_second: f64,
    chunk: T,
    phantom: PhantomData<S>,
}

impl<S, T> AudioChunkReader<S, T>
where
    T: Borrow<AudioChunk<S>>,
    S: Copy,
{
    /// Construct a new `AudioChunkReader` with the given [`AudioChunk`] and
    /// sample rate in frames per second.
    ///
    /// [`AudioChunk`]: ../../buffer/struct.AudioChunk.html
    pub fn new(chunk: T, frames_per_second: f64) -> Self {
        Self {
            chunk,
            frames_per_second,
            phantom: PhantomData,
        }
    }
}

/// An [`AudioReader`] that borrows the [`AudioChunk`] it reads from.
///
/// [`AudioReader`]: ../trait.AudioReader.html
/// [`AudioChunk`]: ../../buffer/struct.AudioChunk.html
pub type AudioBufferReader<'b, S> = AudioChunkReader<S, &'b AudioChunk<S>>;

impl<S, T> AudioReader<S> for AudioChunkReader<S, T>
where
    T: Borrow<AudioChunk<S>>,
    S: Copy,
{
    type Err = std::convert::Infallible;

    fn number_of_channels(&self) -> usize {
        self.chunk.borrow().number_of_channels()
    }

    fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    fn number_of_frames(&self) -> u64 {
        self.chunk.borrow().number_of_frames() as u64
    }

    fn read(&mut self, output: &mut [&mut [S]], start_frame: u64) -> Result<usize, Self::Err> {
        let chunk = self.chunk.borrow();
        let requested = match output.first() {
            Some(channel) => channel.len(),
            None => return Ok(0),
        };
        let start = std::cmp::min(start_frame, chunk.number_of_frames() as u64) as usize;
        let frames_to_copy = std::cmp::min(requested, chunk.number_of_frames() - start);

        for (output_channel, input_channel) in output.iter_mut().zip(chunk.channels().iter()) {
            output_channel[..frames_to_copy]
                .copy_from_slice(&input_channel[start..start + frames_to_copy]);
        }
        Ok(frames_to_copy)
    }
}

#[cfg(test)]
mod tests {
    use super::super::AudioReader;
    use super::AudioBufferReader;
    use crate::buffer::AudioChunk;

    #[test]
    fn reads_from_the_start() {
        let chunk = audio_chunk![[1, 2, 3, 4, 5], [6, 7, 8, 9, 10]];
        let mut reader = AudioBufferReader::new(&chunk, 16.0);
        let mut output = AudioChunk::zero(2, 3);
        let read = {
            let mut slices = output.as_mut_slices();
            reader.read(&mut slices, 0).unwrap()
        };
        assert_eq!(read, 3);
        assert_eq!(output, audio_chunk![[1, 2, 3], [6, 7, 8]]);
    }

    #[test]
    fn reads_at_an_offset_and_leaves_the_rest_untouched() {
        let chunk = audio_chunk![[1, 2, 3, 4, 5], [6, 7, 8, 9, 10]];
        let mut reader = AudioBufferReader::new(&chunk, 16.0);
        let mut output = audio_chunk![[0, 0, 0, 0], [0, 0, 0, 0]];
        let read = {
            let mut slices = output.as_mut_slices();
            reader.read(&mut slices, 3).unwrap()
        };
        assert_eq!(read, 2);
        assert_eq!(output, audio_chunk![[4, 5, 0, 0], [9, 10, 0, 0]]);
    }

    #[test]
    fn reads_fewer_channels_than_available() {
        let chunk = audio_chunk![[1, 2], [3, 4], [5, 6]];
        let mut reader = AudioBufferReader::new(&chunk, 16.0);
        assert_eq!(reader.number_of_channels(), 3);
        assert_eq!(reader.number_of_frames(), 2);
        let mut output = AudioChunk::zero(1, 2);
        {
            let mut slices = output.as_mut_slices();
            reader.read(&mut slices, 0).unwrap();
        }
        assert_eq!(output, audio_chunk![[1, 2]]);
    }

    #[test]
    fn reading_past_the_end_reads_nothing() {
        let chunk = audio_chunk![[1, 2]];
        let mut reader = AudioBufferReader::new(&chunk, 16.0);
        let mut output = AudioChunk::zero(1, 2);
        let read = {
            let mut slices = output.as_mut_slices();
            reader.read(&mut slices, 10).unwrap()
        };
        assert_eq!(read, 0);
        assert_eq!(output, audio_chunk![[0, 0]]);
    }
}
