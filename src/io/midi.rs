/// Channel voice messages, decoded from raw MIDI bytes.
///
/// `PitchBend` is signed around the wheel centre: -8192..=8191.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    PolyAftertouch { channel: u8, key: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, value: i16 },
}

impl MidiEvent {
    /// Decode one message. Running status, system messages and truncated
    /// input yield `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status & 0x80 == 0 {
            return None;
        }

        let channel = status & 0x0F;
        let d1 = data.first().map(|b| b & 0x7F);
        let d2 = data.get(1).map(|b| b & 0x7F);

        let event = match status & 0xF0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: d1?,
                velocity: d2?,
            },
            0x90 => MidiEvent::NoteOn {
                channel,
                key: d1?,
                velocity: d2?,
            },
            0xA0 => MidiEvent::PolyAftertouch {
                channel,
                key: d1?,
                pressure: d2?,
            },
            0xB0 => MidiEvent::ControlChange {
                channel,
                controller: d1?,
                value: d2?,
            },
            0xC0 => MidiEvent::ProgramChange {
                channel,
                program: d1?,
            },
            0xD0 => MidiEvent::ChannelPressure {
                channel,
                pressure: d1?,
            },
            0xE0 => {
                let lsb = d1? as i16;
                let msb = d2? as i16;
                MidiEvent::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                }
            }
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::PolyAftertouch { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ProgramChange { channel, .. }
            | MidiEvent::ChannelPressure { channel, .. }
            | MidiEvent::PitchBend { channel, .. } => channel,
        }
    }
}
