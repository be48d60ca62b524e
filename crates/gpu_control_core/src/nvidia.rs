//! Consultas ao driver NVIDIA via `nvidia-smi` e `nvidia-settings`.
//!
//! Sempre a GPU 0. Nenhuma consulta falha: sem driver, o painel segue com
//! os valores de fallback.

use crate::process::{CommandOutput, CommandRunner, QUERY_TIMEOUT, SHORT_TIMEOUT};
use crate::types::{FALLBACK_GPU_NAME, FALLBACK_POWER_LIMIT, GpuCapabilities, GpuSettings, signed};
use tracing::{debug, info, warn};

pub const NVIDIA_SMI: &str = "nvidia-smi";
pub const NVIDIA_SETTINGS: &str = "nvidia-settings";

/// Atributo do offset de memória (todas as performance levels).
pub const MEMORY_OFFSET_ATTR: &str = "[gpu:0]/GPUMemoryTransferRateOffsetAllPerformanceLevels";
/// Atributo do offset do clock gráfico.
pub const CORE_OFFSET_ATTR: &str = "[gpu:0]/GPUGraphicsClockOffsetAllPerformanceLevels";

const CSV_NOUNITS: &str = "--format=csv,noheader,nounits";

/// Executa uma consulta e devolve stdout sem espaços; erro vira string vazia.
fn smi_query(runner: &dyn CommandRunner, field: &str, format: &str) -> String {
    let query = format!("--query-gpu={field}");
    match runner.run(NVIDIA_SMI, &[&query, format], QUERY_TIMEOUT) {
        Ok(out) => out.stdout_trimmed().to_string(),
        Err(e) => {
            warn!("Consulta {field} falhou: {e}");
            String::new()
        }
    }
}

/// Parte inteira de um valor como `"450.00"`.
pub fn integer_part(text: &str) -> Option<i32> {
    text.trim().split('.').next()?.trim().parse().ok()
}

fn power_or_fallback(text: &str) -> i32 {
    match integer_part(text) {
        Some(v) if v > 0 => v,
        _ => FALLBACK_POWER_LIMIT,
    }
}

pub fn query_max_power_limit(runner: &dyn CommandRunner) -> i32 {
    power_or_fallback(&smi_query(runner, "power.max_limit", CSV_NOUNITS))
}

pub fn query_default_power_limit(runner: &dyn CommandRunner) -> i32 {
    power_or_fallback(&smi_query(runner, "power.default_limit", CSV_NOUNITS))
}

pub fn query_gpu_name(runner: &dyn CommandRunner) -> String {
    let name = smi_query(runner, "name", "--format=csv,noheader");
    if name.is_empty() {
        FALLBACK_GPU_NAME.into()
    } else {
        name
    }
}

/// Lê limites e nome da GPU.
pub fn query_capabilities(runner: &dyn CommandRunner) -> GpuCapabilities {
    let caps = GpuCapabilities {
        max_power_limit: query_max_power_limit(runner),
        default_power_limit: query_default_power_limit(runner),
        name: query_gpu_name(runner),
    };
    info!(
        "GPU: {} (padrão {}W, máximo {}W)",
        caps.name, caps.default_power_limit, caps.max_power_limit
    );
    caps
}

// ──────────────────────────────────────────────
// Valores atuais
// ──────────────────────────────────────────────

/// Resultado bruto de uma consulta `nvidia-settings -q`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetQuery {
    pub text: String,
    pub ok: bool,
}

impl OffsetQuery {
    fn from_result(result: Result<CommandOutput, crate::ProcessError>) -> Self {
        match result {
            Ok(out) => Self {
                text: out.stdout_trimmed().to_string(),
                ok: out.success(),
            },
            Err(e) => {
                debug!("Consulta de offset indisponível: {e}");
                Self::default()
            }
        }
    }

    /// Valor numérico, apenas se o comando terminou com sucesso.
    pub fn value(&self) -> Option<i32> {
        if self.ok { self.text.parse().ok() } else { None }
    }

    fn display(&self) -> String {
        match self.text.parse::<i32>() {
            Ok(v) => signed(v),
            Err(_) if self.text.is_empty() => signed(0),
            Err(_) => self.text.clone(),
        }
    }
}

/// Estado atual da GPU lido na inicialização.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentReading {
    /// `power.limit,clocks.current.memory,clocks.current.graphics` (CSV)
    pub smi_summary: String,
    pub memory_offset: OffsetQuery,
    pub core_offset: OffsetQuery,
    /// `power.limit`, parte inteira
    pub power_limit: Option<i32>,
}

impl CurrentReading {
    /// Linha de status; `None` quando `nvidia-smi` não respondeu.
    pub fn status_line(&self) -> Option<String> {
        if self.smi_summary.is_empty() {
            return None;
        }
        let power = self
            .smi_summary
            .split(',')
            .next()
            .map(|p| format!("{}W", p.trim().split('.').next().unwrap_or_default()))
            .unwrap_or_else(|| "?".into());
        Some(format!(
            "Current: {power} | Mem {} | Core {}",
            self.memory_offset.display(),
            self.core_offset.display()
        ))
    }

    /// Preenche os controles a partir da GPU (usado só sem arquivo de config).
    pub fn seed_settings(&self, settings: &mut GpuSettings) {
        if let Some(v) = self.memory_offset.value() {
            settings.memory_offset = v;
        }
        if let Some(v) = self.core_offset.value() {
            settings.core_offset = v;
        }
        if let Some(p) = self.power_limit.filter(|p| *p > 0) {
            settings.power_limit = p;
        }
    }
}

fn query_offset(runner: &dyn CommandRunner, attr: &str) -> OffsetQuery {
    OffsetQuery::from_result(runner.run(NVIDIA_SETTINGS, &["-t", "-q", attr], SHORT_TIMEOUT))
}

/// Lê limite de potência, clocks e offsets atuais.
pub fn read_current_values(runner: &dyn CommandRunner) -> CurrentReading {
    let smi_summary = smi_query(
        runner,
        "power.limit,clocks.current.memory,clocks.current.graphics",
        CSV_NOUNITS,
    );
    let memory_offset = query_offset(runner, MEMORY_OFFSET_ATTR);
    let core_offset = query_offset(runner, CORE_OFFSET_ATTR);
    let power_limit = integer_part(&smi_query(runner, "power.limit", CSV_NOUNITS));

    let reading = CurrentReading {
        smi_summary,
        memory_offset,
        core_offset,
        power_limit,
    };
    debug!("Leitura atual: {reading:?}");
    reading
}
