//! Tipos compartilhados entre o core e o painel.

use std::ops::RangeInclusive;

/// Limite de potência usado quando o driver não responde (W).
pub const FALLBACK_POWER_LIMIT: i32 = 450;
/// Nome exibido quando `nvidia-smi` não devolve nada.
pub const FALLBACK_GPU_NAME: &str = "NVIDIA GPU";

/// Menor limite de potência aceito pelo painel (W).
pub const MIN_POWER_LIMIT: i32 = 100;
/// Faixa do offset de memória (MHz).
pub const MEMORY_OFFSET_RANGE: RangeInclusive<i32> = -2000..=6000;
/// Faixa do offset de core (MHz).
pub const CORE_OFFSET_RANGE: RangeInclusive<i32> = -1000..=1000;
/// Passo do controle de offset de memória (MHz).
pub const MEMORY_OFFSET_STEP: i32 = 100;
/// Passo do controle de offset de core (MHz).
pub const CORE_OFFSET_STEP: i32 = 15;

// ──────────────────────────────────────────────
// Capacidades
// ──────────────────────────────────────────────

/// Limites reportados pelo driver na inicialização.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuCapabilities {
    pub name: String,
    /// `power.max_limit` (W)
    pub max_power_limit: i32,
    /// `power.default_limit` (W)
    pub default_power_limit: i32,
}

impl Default for GpuCapabilities {
    fn default() -> Self {
        Self {
            name: FALLBACK_GPU_NAME.into(),
            max_power_limit: FALLBACK_POWER_LIMIT,
            default_power_limit: FALLBACK_POWER_LIMIT,
        }
    }
}

impl GpuCapabilities {
    /// Faixa válida do controle de potência.
    ///
    /// Uma GPU com limite máximo abaixo de [`MIN_POWER_LIMIT`] colapsa a
    /// faixa para o próprio máximo.
    pub fn power_range(&self) -> RangeInclusive<i32> {
        let max = self.max_power_limit.max(1);
        MIN_POWER_LIMIT.min(max)..=max
    }
}

// ──────────────────────────────────────────────
// Configuração aplicável
// ──────────────────────────────────────────────

/// Valores do painel: o que o Apply envia ao driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuSettings {
    /// Limite de potência (W)
    pub power_limit: i32,
    /// Offset de memória (MHz, taxa de transferência)
    pub memory_offset: i32,
    /// Offset do clock gráfico (MHz)
    pub core_offset: i32,
    /// Reaplicar no boot via systemd
    pub apply_on_startup: bool,
}

impl GpuSettings {
    /// Retorna uma cópia com todos os campos dentro das faixas do painel.
    pub fn clamped(self, caps: &GpuCapabilities) -> Self {
        let power = caps.power_range();
        Self {
            power_limit: self.power_limit.clamp(*power.start(), *power.end()),
            memory_offset: self
                .memory_offset
                .clamp(*MEMORY_OFFSET_RANGE.start(), *MEMORY_OFFSET_RANGE.end()),
            core_offset: self
                .core_offset
                .clamp(*CORE_OFFSET_RANGE.start(), *CORE_OFFSET_RANGE.end()),
            apply_on_startup: self.apply_on_startup,
        }
    }
}

/// Formata um offset com sinal explícito (`+0`, `+150`, `-100`).
pub fn signed(value: i32) -> String {
    format!("{value:+}")
}
