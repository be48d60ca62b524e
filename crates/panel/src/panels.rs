//! Grupos de controles do painel renderizados com egui.

use crate::theme_egui::EguiTheme;
use egui::{RichText, Ui};
use gpu_control_core::presets::{self, Preset};
use gpu_control_core::types::{
    CORE_OFFSET_RANGE, CORE_OFFSET_STEP, MEMORY_OFFSET_RANGE, MEMORY_OFFSET_STEP,
};
use gpu_control_core::{GpuCapabilities, GpuSettings};
use std::ops::RangeInclusive;

// ──────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────

fn group_frame(ui: &mut Ui, title: &str, theme: &EguiTheme, add_body: impl FnOnce(&mut Ui)) {
    egui::Frame::new()
        .fill(theme.panel)
        .stroke(egui::Stroke::new(1.0, theme.border))
        .corner_radius(6.0)
        .inner_margin(10.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).strong().size(14.0));
            ui.add_space(6.0);
            add_body(ui);
        });
}

/// Equivalente a um spin box: `−` / valor / `+` com passo fixo.
fn stepper(
    ui: &mut Ui,
    value: &mut i32,
    range: RangeInclusive<i32>,
    step: i32,
    suffix: &str,
) {
    let (min, max) = (*range.start(), *range.end());
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
        // Layout da direita para a esquerda: ordem invertida
        if ui.add_sized([28.0, 28.0], egui::Button::new("+")).clicked() {
            *value = value.saturating_add(step).min(max);
        }
        ui.add_sized(
            [140.0, 28.0],
            egui::DragValue::new(&mut *value)
                .range(range)
                .speed(f64::from(step.max(1)) / 4.0)
                .suffix(suffix),
        );
        if ui.add_sized([28.0, 28.0], egui::Button::new("−")).clicked() {
            *value = value.saturating_sub(step).max(min);
        }
    });
}

fn control_row(ui: &mut Ui, label: &str, add_control: impl FnOnce(&mut Ui)) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(label).size(13.0));
        add_control(ui);
    });
}

// ──────────────────────────────────────────
// Power Limit
// ──────────────────────────────────────────

pub fn render_power(ui: &mut Ui, settings: &mut GpuSettings, caps: &GpuCapabilities, theme: &EguiTheme) {
    group_frame(ui, "Power Limit", theme, |ui: &mut Ui| {
        control_row(ui, "Power Limit:", |ui: &mut Ui| {
            stepper(ui, &mut settings.power_limit, caps.power_range(), 1, " W");
        });
        ui.label(
            RichText::new(presets::power_ratio(settings.power_limit, caps.max_power_limit))
                .color(theme.dim)
                .size(12.0),
        );
    });
}

// ──────────────────────────────────────────
// Memory Clock Offset
// ──────────────────────────────────────────

pub fn render_memory(ui: &mut Ui, settings: &mut GpuSettings, theme: &EguiTheme) {
    group_frame(ui, "Memory Clock Offset", theme, |ui: &mut Ui| {
        control_row(ui, "Offset:", |ui: &mut Ui| {
            stepper(
                ui,
                &mut settings.memory_offset,
                MEMORY_OFFSET_RANGE,
                MEMORY_OFFSET_STEP,
                " MHz",
            );
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new("Afterburner equivalent:").color(theme.dim).size(12.0));
            ui.label(
                RichText::new(presets::afterburner_equivalent(settings.memory_offset))
                    .color(theme.dim)
                    .strong()
                    .size(12.0),
            );
        });
    });
}

// ──────────────────────────────────────────
// Core Clock Offset
// ──────────────────────────────────────────

pub fn render_core(ui: &mut Ui, settings: &mut GpuSettings, theme: &EguiTheme) {
    group_frame(ui, "Core Clock Offset", theme, |ui: &mut Ui| {
        control_row(ui, "Offset:", |ui: &mut Ui| {
            stepper(
                ui,
                &mut settings.core_offset,
                CORE_OFFSET_RANGE,
                CORE_OFFSET_STEP,
                " MHz",
            );
        });
    });
}

// ──────────────────────────────────────────
// Presets
// ──────────────────────────────────────────

/// Retorna o preset clicado, se houver.
pub fn render_presets(ui: &mut Ui, caps: &GpuCapabilities, theme: &EguiTheme) -> Option<Preset> {
    let mut clicked = None;
    group_frame(ui, "Presets", theme, |ui: &mut Ui| {
        ui.columns(Preset::ALL.len(), |cols| {
            for (col, preset) in cols.iter_mut().zip(Preset::ALL) {
                let button = egui::Button::new(RichText::new(preset.label(caps)).size(12.0))
                    .corner_radius(6.0)
                    .min_size(egui::vec2(col.available_width(), 50.0));
                if col.add(button).clicked() {
                    clicked = Some(preset);
                }
            }
        });
    });
    clicked
}
