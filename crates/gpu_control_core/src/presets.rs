//! Presets de potência e textos derivados dos controles.

use crate::types::{FALLBACK_POWER_LIMIT, GpuCapabilities, GpuSettings};

/// Presets oferecidos no painel. Todos zeram os offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Default,
    LowPower,
    FullPower,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Default, Preset::LowPower, Preset::FullPower];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "Default",
            Preset::LowPower => "Low Power",
            Preset::FullPower => "Full Power",
        }
    }

    /// Limite de potência do preset (W).
    pub fn power_limit(self, caps: &GpuCapabilities) -> i32 {
        match self {
            Preset::Default => caps.default_power_limit,
            // 75% do padrão, truncado
            Preset::LowPower => caps.default_power_limit * 3 / 4,
            Preset::FullPower => caps.max_power_limit,
        }
    }

    /// Texto do botão, em duas linhas.
    pub fn label(self, caps: &GpuCapabilities) -> String {
        format!("{}\n{}W / +0", self.name(), self.power_limit(caps))
    }

    /// Aplica o preset aos controles; o checkbox de startup é preservado.
    pub fn apply_to(self, settings: &mut GpuSettings, caps: &GpuCapabilities) {
        settings.power_limit = self.power_limit(caps);
        settings.memory_offset = 0;
        settings.core_offset = 0;
    }
}

/// Equivalente do offset de memória no MSI Afterburner.
///
/// O `nvidia-settings` trabalha com taxa de transferência (DDR), o
/// Afterburner com clock real: metade do valor.
pub fn afterburner_equivalent(memory_offset: i32) -> String {
    let half = memory_offset / 2;
    if half >= 0 {
        format!("+{half}")
    } else {
        half.to_string()
    }
}

/// Linha "atual / máximo" abaixo do controle de potência.
pub fn power_ratio(power: i32, max: i32) -> String {
    let max = if max > 0 { max } else { FALLBACK_POWER_LIMIT };
    if power == 0 {
        format!("0 / {max} W")
    } else {
        let pct = power * 100 / max;
        format!("{power} / {max} W  ({pct}%)")
    }
}
