use crate::{
    io::midi::MidiEvent,
    synth::message::{SynthMessage, PITCH_WHEEL_CENTER},
};

/// Translate a MIDI event on `channel_filter` into a synth message.
///
/// Note-on with velocity 0 is a note-off. Events the synth has no use for
/// (program and controller changes) map to `None`.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity: 0, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity: 0,
        }),
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, velocity, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchWheel {
            value: (value as i32 + PITCH_WHEEL_CENTER as i32).clamp(0, 16_383) as u16,
        }),
        MidiEvent::ChannelPressure { pressure, .. } => {
            Some(SynthMessage::ChannelPressure { value: pressure })
        }
        MidiEvent::PolyAftertouch { key, pressure, .. } => Some(SynthMessage::Aftertouch {
            note: key,
            value: pressure,
        }),
        // All Notes Off
        MidiEvent::ControlChange {
            controller: 123, ..
        } => Some(SynthMessage::AllNotesOff),
        MidiEvent::ControlChange { .. } | MidiEvent::ProgramChange { .. } => None,
    }
}

/// Equal-tempered frequency of a MIDI note, A4 (69) = 440 Hz.
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
