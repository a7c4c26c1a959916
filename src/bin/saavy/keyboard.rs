//! Computer-keyboard piano and parameter shortcuts

use saavy_synth::{
    dsp::{FilterType, LfoTarget, Waveform},
    ParamId, ParamSnapshot,
};

/// Two rows of a QWERTY keyboard laid out like a piano octave plus one note.
const PIANO_KEYS: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];

pub const DEFAULT_OCTAVE: i8 = 4;
const MIN_OCTAVE: i8 = 0;
const MAX_OCTAVE: i8 = 8;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Note(u8),
    OctaveDown,
    OctaveUp,
    Panic,
    Param(ParamEdit),
}

/// Parameter shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEdit {
    CycleWave(usize),
    CutoffDown,
    CutoffUp,
    ResonanceDown,
    ResonanceUp,
    CycleFilterType,
    CycleLfoTarget,
    ToggleUnison,
    ToggleSub,
    GainDown,
    GainUp,
}

/// MIDI note for a piano key at the given octave (C4 = 60).
pub fn note_for_key(key: char, octave: i8) -> Option<u8> {
    let semitone = PIANO_KEYS.iter().position(|&k| k == key.to_ascii_lowercase())?;
    let note = (octave as i32 + 1) * 12 + semitone as i32;
    u8::try_from(note).ok().filter(|&n| n <= 127)
}

pub fn action_for_key(key: char, octave: i8) -> Option<KeyAction> {
    if let Some(note) = note_for_key(key, octave) {
        return Some(KeyAction::Note(note));
    }

    let action = match key {
        'z' => KeyAction::OctaveDown,
        'x' => KeyAction::OctaveUp,
        ' ' => KeyAction::Panic,
        '1' => KeyAction::Param(ParamEdit::CycleWave(0)),
        '2' => KeyAction::Param(ParamEdit::CycleWave(1)),
        '3' => KeyAction::Param(ParamEdit::CycleWave(2)),
        '[' => KeyAction::Param(ParamEdit::CutoffDown),
        ']' => KeyAction::Param(ParamEdit::CutoffUp),
        ';' => KeyAction::Param(ParamEdit::ResonanceDown),
        '\'' => KeyAction::Param(ParamEdit::ResonanceUp),
        'b' => KeyAction::Param(ParamEdit::CycleFilterType),
        'l' => KeyAction::Param(ParamEdit::CycleLfoTarget),
        'n' => KeyAction::Param(ParamEdit::ToggleUnison),
        'v' => KeyAction::Param(ParamEdit::ToggleSub),
        ',' => KeyAction::Param(ParamEdit::GainDown),
        '.' => KeyAction::Param(ParamEdit::GainUp),
        _ => return None,
    };
    Some(action)
}

pub fn shift_octave(octave: i8, up: bool) -> i8 {
    let next = if up { octave + 1 } else { octave - 1 };
    next.clamp(MIN_OCTAVE, MAX_OCTAVE)
}

/// Apply a shortcut to the shared parameters.
pub fn apply_edit(params: &ParamSnapshot, edit: ParamEdit) {
    match edit {
        ParamEdit::CycleWave(slot) => {
            let id = [ParamId::Osc1Wave, ParamId::Osc2Wave, ParamId::Osc3Wave][slot.min(2)];
            let next = (params.choice(id) + 1) % Waveform::ALL.len();
            params.set(id, next as f32);
        }
        ParamEdit::CutoffDown => {
            params.set(ParamId::Cutoff, params.get(ParamId::Cutoff) * 0.85);
        }
        ParamEdit::CutoffUp => {
            params.set(ParamId::Cutoff, params.get(ParamId::Cutoff) / 0.85);
        }
        ParamEdit::ResonanceDown => {
            params.nudge(ParamId::Resonance, -0.25);
        }
        ParamEdit::ResonanceUp => {
            params.nudge(ParamId::Resonance, 0.25);
        }
        ParamEdit::CycleFilterType => {
            let next = (params.choice(ParamId::FilterType) + 1) % 3;
            params.set(ParamId::FilterType, FilterType::from_index(next).index() as f32);
        }
        ParamEdit::CycleLfoTarget => {
            let next = (params.choice(ParamId::LfoTarget) + 1) % LfoTarget::ALL.len();
            params.set(ParamId::LfoTarget, next as f32);
        }
        ParamEdit::ToggleUnison => toggle(params, ParamId::UniOn),
        ParamEdit::ToggleSub => toggle(params, ParamId::SubOn),
        ParamEdit::GainDown => {
            params.nudge(ParamId::Gain, -1.0);
        }
        ParamEdit::GainUp => {
            params.nudge(ParamId::Gain, 1.0);
        }
    }
}

fn toggle(params: &ParamSnapshot, id: ParamId) {
    let on = params.flag(id);
    params.set(id, if on { 0.0 } else { 1.0 });
}
