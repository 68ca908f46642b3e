//! This module defines the `EventHandler` trait and the event types the sampler
//! understands: `RawMidiEvent` and `Timed`.
use std::fmt::{Debug, Error, Formatter};

/// The trait that a sampler implements in order to handle the given type of events.
///
/// The type parameter `E` corresponds to the type of the event.
pub trait EventHandler<E> {
    fn handle_event(&mut self, event: E);
}

/// A raw midi event.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawMidiEvent {
    data: [u8; 3],
}

impl Debug for RawMidiEvent {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(
            f,
            "RawMidiEvent({:X} {:X} {:X})",
            self.data[0], self.data[1], self.data[2]
        )
    }
}

impl RawMidiEvent {
    /// Create a new `RawMidiEvent` with the given raw data.
    pub fn new(data: [u8; 3]) -> Self {
        Self { data }
    }

    /// Get the raw data from a `RawMidiEvent`.
    pub fn data(&self) -> &[u8; 3] {
        &self.data
    }

    /// The midi channel (0 to 15) of a channel event.
    pub fn channel(&self) -> u8 {
        self.data[0] & 0x0F
    }
}

/// `Timed<E>` adds timing to an event.
#[derive(PartialEq, Eq, Debug)]
pub struct Timed<E> {
    /// The offset (in frames) of the event relative to the start of
    /// the audio buffer.
    ///
    /// E.g. when `time_in_frames` is 6, this means that the event happens on the sixth
    /// frame of the buffer passed to [`render_with_events`].
    ///
    /// [`render_with_events`]: ../sampler/struct.Sampler.html#method.render_with_events
    pub time_in_frames: u32,
    /// The underlying event.
    pub event: E,
}

impl<E> Timed<E> {
    pub fn new(time_in_frames: u32, event: E) -> Self {
        Self {
            time_in_frames,
            event,
        }
    }
}

impl<E> Clone for Timed<E>
where
    E: Clone,
{
    fn clone(&self) -> Self {
        Timed {
            time_in_frames: self.time_in_frames,
            event: self.event.clone(),
        }
    }
}

impl<E> Copy for Timed<E> where E: Copy {}

#[test]
fn raw_midi_event_reports_its_channel() {
    assert_eq!(RawMidiEvent::new([0x93, 60, 100]).channel(), 3);
    assert_eq!(
        format!("{:?}", RawMidiEvent::new([0x93, 0x3C, 0x64])),
        "RawMidiEvent(93 3C 64)"
    );
}
