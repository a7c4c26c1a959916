//! Patch panel - the parameters the keyboard shortcuts touch

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_synth::{
    dsp::{FilterType, LfoTarget, Waveform},
    ParamId, ParamSnapshot,
};

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn entry<'a>(key: &'a str, label: &'a str, value: String) -> Vec<Span<'a>> {
    vec![
        Span::styled(format!("[{key}] "), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{label}: ")),
        Span::styled(value, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
    ]
}

/// Lines shown in the panel, one group per row.
pub fn panel_lines(params: &ParamSnapshot) -> Vec<Line<'static>> {
    let waves = [ParamId::Osc1Wave, ParamId::Osc2Wave, ParamId::Osc3Wave]
        .map(|id| Waveform::from_index(params.choice(id)).name());

    let mut osc = Vec::new();
    let slots = ["1", "2", "3"].into_iter().zip(["Osc1", "Osc2", "Osc3"]);
    for ((key, label), name) in slots.zip(waves) {
        osc.extend(entry(key, label, name.to_string()));
    }
    osc.extend(entry("n", "Unison", on_off(params.flag(ParamId::UniOn)).to_string()));
    osc.extend(entry("v", "Sub", on_off(params.flag(ParamId::SubOn)).to_string()));

    let mut filter = Vec::new();
    filter.extend(entry(
        "b",
        "Filter",
        FilterType::from_index(params.choice(ParamId::FilterType))
            .name()
            .to_string(),
    ));
    filter.extend(entry(
        "[ ]",
        "Cutoff",
        format!("{:.0}Hz", params.get(ParamId::Cutoff)),
    ));
    filter.extend(entry(
        "; '",
        "Q",
        format!("{:.2}", params.get(ParamId::Resonance)),
    ));

    let mut modulation = Vec::new();
    modulation.extend(entry(
        "l",
        "LFO1",
        LfoTarget::from_index(params.choice(ParamId::LfoTarget))
            .name()
            .to_string(),
    ));
    modulation.extend(entry(
        ", .",
        "Gain",
        format!("{:.1}dB", params.get(ParamId::Gain)),
    ));

    vec![Line::from(osc), Line::from(filter), Line::from(modulation)]
}

pub fn render_panel(frame: &mut Frame, area: Rect, params: &ParamSnapshot) {
    let block = Block::default().title(" Patch ").borders(Borders::ALL);
    let paragraph = Paragraph::new(panel_lines(params)).block(block);
    frame.render_widget(paragraph, area);
}
