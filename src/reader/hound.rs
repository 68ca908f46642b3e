//! Read `.wav` files with the `hound` crate.
use super::AudioReader;
use dasp_sample::{FromSample, I24};
use hound::{SampleFormat, WavReader};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// An [`AudioReader`] for `.wav` files.
///
/// Supports 32-bit float samples and 8, 16, 24 and 32-bit integer samples. Samples are
/// converted to the requested sample type with `dasp_sample`.
///
/// [`AudioReader`]: ../trait.AudioReader.html
pub struct HoundAudioReader<R: Read + Seek> {
    reader: WavReader<R>,
    number_of_channels: usize,
    frames_per_second: f64,
}

#[derive(Debug)]
pub enum HoundAudioError {
    UnsupportedAudioFormat {
        sample_format: SampleFormat,
        bits_per_sample: u16,
    },
    Hound(hound::Error),
}

impl Display for HoundAudioError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            HoundAudioError::UnsupportedAudioFormat {
                sample_format,
                bits_per_sample,
            } => write!(
                f,
                "Unsupported audio format: {:?} with {} bits per sample",
                sample_format, bits_per_sample
            ),
            HoundAudioError::Hound(ref e) => write!(f, "Error reading wav file: {}", e),
        }
    }
}

impl Error for HoundAudioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HoundAudioError::UnsupportedAudioFormat { .. } => None,
            HoundAudioError::Hound(ref e) => Some(e),
        }
    }
}

impl From<hound::Error> for HoundAudioError {
    fn from(e: hound::Error) -> Self {
        HoundAudioError::Hound(e)
    }
}

impl From<std::io::Error> for HoundAudioError {
    fn from(e: std::io::Error) -> Self {
        HoundAudioError::Hound(hound::Error::IoError(e))
    }
}

fn check_format(sample_format: SampleFormat, bits_per_sample: u16) -> Result<(), HoundAudioError> {
    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) | (SampleFormat::Int, 8) | (SampleFormat::Int, 16) => Ok(()),
        (SampleFormat::Int, 24) | (SampleFormat::Int, 32) => Ok(()),
        _ => Err(HoundAudioError::UnsupportedAudioFormat {
            sample_format,
            bits_per_sample,
        }),
    }
}

impl<R: Read + Seek> HoundAudioReader<R> {
    pub fn new(reader: WavReader<R>) -> Result<Self, HoundAudioError> {
        let spec = reader.spec();
        check_format(spec.sample_format, spec.bits_per_sample)?;
        Ok(Self {
            number_of_channels: spec.channels as usize,
            frames_per_second: spec.sample_rate as f64,
            reader,
        })
    }
}

impl HoundAudioReader<BufReader<File>> {
    /// Open the `.wav` file at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HoundAudioError> {
        Self::new(WavReader::open(path)?)
    }
}

/// De-interleave the samples of `reader` into `output`, starting at the current position.
fn read_interleaved<R, T, S, C>(
    reader: &mut WavReader<R>,
    output: &mut [&mut [S]],
    number_of_channels: usize,
    number_of_frames: usize,
    convert: C,
) -> Result<usize, HoundAudioError>
where
    R: Read,
    T: hound::Sample,
    C: Fn(T) -> S,
{
    let mut samples = reader.samples::<T>();
    for frame_index in 0..number_of_frames {
        for channel_index in 0..number_of_channels {
            let sample = match samples.next() {
                Some(sample) => sample?,
                None => return Ok(frame_index),
            };
            if let Some(channel) = output.get_mut(channel_index) {
                channel[frame_index] = convert(sample);
            }
        }
    }
    Ok(number_of_frames)
}

impl<R, S> AudioReader<S> for HoundAudioReader<R>
where
    R: Read + Seek,
    S: FromSample<f32> + FromSample<i8> + FromSample<i16> + FromSample<I24> + FromSample<i32>,
{
    type Err = HoundAudioError;

    fn number_of_channels(&self) -> usize {
        self.number_of_channels
    }

    fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    fn number_of_frames(&self) -> u64 {
        self.reader.duration() as u64
    }

    fn read(&mut self, output: &mut [&mut [S]], start_frame: u64) -> Result<usize, Self::Err> {
        let requested = match output.first() {
            Some(channel) => channel.len(),
            None => return Ok(0),
        };
        let total = self.reader.duration() as u64;
        if start_frame >= total || self.number_of_channels == 0 {
            return Ok(0);
        }
        let number_of_frames = std::cmp::min(requested as u64, total - start_frame) as usize;
        self.reader.seek(start_frame as u32)?;

        let spec = self.reader.spec();
        let channels = self.number_of_channels;
        let reader = &mut self.reader;
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => {
                read_interleaved(reader, output, channels, number_of_frames, |s: f32| {
                    S::from_sample_(s)
                })
            }
            (SampleFormat::Int, 8) => {
                read_interleaved(reader, output, channels, number_of_frames, |s: i8| {
                    S::from_sample_(s)
                })
            }
            (SampleFormat::Int, 16) => {
                read_interleaved(reader, output, channels, number_of_frames, |s: i16| {
                    S::from_sample_(s)
                })
            }
            (SampleFormat::Int, 24) => {
                read_interleaved(reader, output, channels, number_of_frames, |s: i32| {
                    S::from_sample_(I24::new_unchecked(s))
                })
            }
            (SampleFormat::Int, 32) => {
                read_interleaved(reader, output, channels, number_of_frames, |s: i32| {
                    S::from_sample_(s)
                })
            }
            (sample_format, bits_per_sample) => Err(HoundAudioError::UnsupportedAudioFormat {
                sample_format,
                bits_per_sample,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AudioChunk;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    fn wav_i16(channels: u16, samples: &[i16]) -> Cursor<Vec<u8>> {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for sample in samples {
                writer.write_sample(*sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn reads_stereo_16_bit_as_f32() {
        let cursor = wav_i16(2, &[16384, -16384, 0, 8192, -32768, 0]);
        let mut reader = HoundAudioReader::new(WavReader::new(cursor).unwrap()).unwrap();
        assert_eq!(AudioReader::<f32>::number_of_channels(&reader), 2);
        assert_eq!(AudioReader::<f32>::frames_per_second(&reader), 8000.0);
        assert_eq!(AudioReader::<f32>::number_of_frames(&reader), 3);

        let mut output = AudioChunk::<f32>::zero(2, 3);
        let read = {
            let mut slices = output.as_mut_slices();
            reader.read(&mut slices, 0).unwrap()
        };
        assert_eq!(read, 3);
        assert_eq!(output, audio_chunk![[0.5, 0.0, -1.0], [-0.5, 0.25, 0.0]]);
    }

    #[test]
    fn reads_from_an_offset_into_fewer_channels() {
        let cursor = wav_i16(2, &[16384, -16384, 0, 8192, -32768, 0]);
        let mut reader = HoundAudioReader::new(WavReader::new(cursor).unwrap()).unwrap();
        let mut output = AudioChunk::<f32>::zero(1, 4);
        let read = {
            let mut slices = output.as_mut_slices();
            reader.read(&mut slices, 1).unwrap()
        };
        assert_eq!(read, 2);
        assert_eq!(output, audio_chunk![[0.0, -1.0, 0.0, 0.0]]);
    }

    #[test]
    fn unsupported_formats_are_rejected() {
        assert!(check_format(SampleFormat::Int, 32).is_ok());
        match check_format(SampleFormat::Float, 64) {
            Err(HoundAudioError::UnsupportedAudioFormat {
                bits_per_sample, ..
            }) => assert_eq!(bits_per_sample, 64),
            _ => panic!("64-bit float should be rejected"),
        }
    }
}
