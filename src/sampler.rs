//! A polyphonic sampler: distributes notes over a fixed set of voices.
//!
//! # Notes
//!
//! Voices add values to the output buffer (`sample += value` instead of
//! `sample = value`). The caller owns the output buffer and must initialize it to zero
//! before calling `render`, e.g. with [`initialize_to_zero`].
//!
//! [`initialize_to_zero`]: ../buffer/fn.initialize_to_zero.html
use crate::event::{EventHandler, RawMidiEvent, Timed};
use crate::sample::Sound;
use crate::voice::Voice;
use crate::AudioHandler;
use midi_consts::channel_event::control_change::{ALL_NOTES_OFF, ALL_SOUND_OFF};
use midi_consts::channel_event::{
    CONTROL_CHANGE, EVENT_TYPE_MASK, NOTE_OFF, NOTE_ON, PITCH_BEND_CHANGE,
};
use std::sync::Arc;

struct VoiceWithChannel<V> {
    voice: V,
    // The midi channel of the note the voice was last started for.
    channel: Option<u8>,
}

/// `Sampler` plays sounds on a fixed number of voices.
///
/// When a note starts and all voices are busy, the note is dropped: voices are never
/// stolen.
pub struct Sampler<V: Voice> {
    voices: Vec<VoiceWithChannel<V>>,
    sounds: Vec<Arc<V::Sound>>,
    // Removed sounds that voices may still be playing.
    retired: Vec<Arc<V::Sound>>,
}

impl<V: Voice> Sampler<V> {
    /// Create a new `Sampler` with the given voices and no sounds.
    ///
    /// # Panics
    /// This method panics if `voices` is empty.
    pub fn new(voices: Vec<V>) -> Self {
        if voices.is_empty() {
            error!("A sampler needs at least one voice.");
            panic!("A sampler needs at least one voice.");
        }
        Sampler {
            voices: voices
                .into_iter()
                .map(|voice| VoiceWithChannel {
                    voice,
                    channel: None,
                })
                .collect(),
            sounds: Vec::new(),
            retired: Vec::new(),
        }
    }

    /// Add a sound. The sampler keeps a handle to it, so that it is never deallocated
    /// by a voice that is done with it.
    pub fn add_sound(&mut self, sound: Arc<V::Sound>) {
        self.sounds.push(sound);
    }

    /// Remove all sounds. Voices that are playing keep playing until they are stopped.
    ///
    /// The sampler keeps a handle to the removed sounds until
    /// [`release_retired_sounds`] finds that no voice uses them anymore.
    ///
    /// [`release_retired_sounds`]: #method.release_retired_sounds
    pub fn clear_sounds(&mut self) {
        self.retired.append(&mut self.sounds);
    }

    /// Deallocate the removed sounds that are no longer played by any voice.
    /// Returns the number of removed sounds that are still in use.
    ///
    /// Note: cannot be used in a real-time context
    /// -------------------------------------
    /// This method may deallocate memory and cannot be used in a real-time context.
    pub fn release_retired_sounds(&mut self) -> usize {
        self.retired.retain(|sound| Arc::strong_count(sound) > 1);
        self.retired.len()
    }

    pub fn sounds(&self) -> &[Arc<V::Sound>] {
        &self.sounds
    }

    pub fn voices(&self) -> impl Iterator<Item = &V> + '_ {
        self.voices.iter().map(|v| &v.voice)
    }

    /// The number of voices that have a note assigned.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.voice.is_active()).count()
    }

    /// Start `note` on `channel` for every sound that applies to it.
    ///
    /// A voice that is still playing the same note on the same channel is released first.
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        for v in self.voices.iter_mut() {
            if v.voice.is_active()
                && v.voice.current_note() == Some(note)
                && v.channel == Some(channel)
            {
                v.voice.stop_note(1.0, true);
            }
        }

        for sound in self.sounds.iter() {
            if !(sound.applies_to_note(note) && sound.applies_to_channel(channel)) {
                continue;
            }
            let free_voice = self
                .voices
                .iter_mut()
                .find(|v| !v.voice.is_active() && v.voice.can_play(sound));
            match free_voice {
                Some(v) => {
                    v.channel = Some(channel);
                    v.voice.start_note(note, velocity, Arc::clone(sound));
                }
                None => {
                    warn!(
                        "No free voice for note {} on channel {}, the note is dropped.",
                        note, channel
                    );
                }
            }
        }
    }

    /// Stop every voice that plays `note` on `channel`.
    pub fn note_off(&mut self, channel: u8, note: u8, velocity: f32, allow_tail_off: bool) {
        for v in self.voices.iter_mut() {
            if v.voice.is_active()
                && v.voice.current_note() == Some(note)
                && v.channel == Some(channel)
            {
                v.voice.stop_note(velocity, allow_tail_off);
            }
        }
    }

    /// Stop every voice that plays on `channel`, or every voice if `channel` is `None`.
    pub fn all_notes_off(&mut self, channel: Option<u8>, allow_tail_off: bool) {
        for v in self.voices.iter_mut() {
            if v.voice.is_active() && (channel.is_none() || v.channel == channel) {
                v.voice.stop_note(1.0, allow_tail_off);
            }
        }
    }

    /// Add `number_of_frames` frames of every voice to `output`, starting at frame `start`.
    pub fn render(&mut self, output: &mut [&mut [f32]], start: usize, number_of_frames: usize) {
        for v in self.voices.iter_mut() {
            v.voice.render(output, start, number_of_frames);
        }
    }

    /// Render `number_of_frames` frames, handling each event at the frame it occurs.
    ///
    /// `events` must be sorted by `time_in_frames`. Events that are later than the end
    /// of the buffer are handled after the last frame has been rendered.
    pub fn render_with_events(
        &mut self,
        output: &mut [&mut [f32]],
        number_of_frames: usize,
        events: &[Timed<RawMidiEvent>],
    ) {
        let mut position = 0;
        for timed in events {
            let time = std::cmp::min(timed.time_in_frames as usize, number_of_frames);
            if time > position {
                self.render(output, position, time - position);
                position = time;
            }
            self.handle_event(timed.event);
        }
        if position < number_of_frames {
            self.render(output, position, number_of_frames - position);
        }
    }

    fn voices_on_channel(&mut self, channel: u8) -> impl Iterator<Item = &mut V> + '_ {
        self.voices
            .iter_mut()
            .filter(move |v| v.voice.is_active() && v.channel == Some(channel))
            .map(|v| &mut v.voice)
    }
}

impl<V: Voice> EventHandler<RawMidiEvent> for Sampler<V> {
    fn handle_event(&mut self, event: RawMidiEvent) {
        let data = *event.data();
        let channel = event.channel();
        match (data[0] & EVENT_TYPE_MASK, data[1], data[2]) {
            (NOTE_OFF, note, velocity) => {
                self.note_off(channel, note, velocity as f32 / 127.0, true);
            }
            (NOTE_ON, note, 0) => {
                // Velocity 0 is considered the same as note off.
                self.note_off(channel, note, 0.0, true);
            }
            (NOTE_ON, note, velocity) => {
                self.note_on(channel, note, velocity as f32 / 127.0);
            }
            (CONTROL_CHANGE, ALL_NOTES_OFF, _) => {
                self.all_notes_off(Some(channel), true);
            }
            (CONTROL_CHANGE, ALL_SOUND_OFF, _) => {
                self.all_notes_off(Some(channel), false);
            }
            (CONTROL_CHANGE, controller, value) => {
                for voice in self.voices_on_channel(channel) {
                    voice.controller_moved(controller, value);
                }
            }
            (PITCH_BEND_CHANGE, least_significant, most_significant) => {
                let value = ((most_significant as u16) << 7) | least_significant as u16;
                for voice in self.voices_on_channel(channel) {
                    voice.pitch_wheel_moved(value);
                }
            }
            _ => {
                trace!("Ignoring {:?}.", event);
            }
        }
    }
}

impl<V: Voice> AudioHandler for Sampler<V> {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        for v in self.voices.iter_mut() {
            v.voice.set_sample_rate(sample_rate);
        }
    }
}
