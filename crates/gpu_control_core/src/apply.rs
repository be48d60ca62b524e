//! Sequência do botão Apply.
//!
//! Passos independentes, sempre na mesma ordem: potência, offset de
//! memória, offset de core, serviço de startup, arquivo de config. Uma
//! falha não interrompe os passos seguintes; tudo vai para o
//! [`ApplyReport`].

use crate::config::AppConfig;
use crate::nvidia::{CORE_OFFSET_ATTR, MEMORY_OFFSET_ATTR, NVIDIA_SETTINGS, NVIDIA_SMI};
use crate::paths::AppPaths;
use crate::process::{CommandRunner, QUERY_TIMEOUT};
use crate::startup;
use crate::types::{GpuSettings, signed};
use tracing::{info, warn};

/// Passo da sequência que falhou.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStep {
    PowerLimit,
    MemoryOffset,
    CoreOffset,
    StartupService,
    SaveConfig,
}

impl ApplyStep {
    pub fn label(self) -> &'static str {
        match self {
            ApplyStep::PowerLimit => "Power limit",
            ApplyStep::MemoryOffset => "Memory offset",
            ApplyStep::CoreOffset => "Core offset",
            ApplyStep::StartupService => "Startup service",
            ApplyStep::SaveConfig => "Config",
        }
    }
}

/// Uma falha com a mensagem do comando.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyFailure {
    pub step: ApplyStep,
    pub message: String,
}

impl std::fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.step.label(), self.message)
    }
}

/// Resultado de um Apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub settings: GpuSettings,
    pub failures: Vec<ApplyFailure>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Applied: 350W | Mem +1000 | Core +150`
    pub fn status_line(&self) -> String {
        format!(
            "Applied: {}W | Mem {} | Core {}",
            self.settings.power_limit,
            signed(self.settings.memory_offset),
            signed(self.settings.core_offset)
        )
    }

    /// Texto do diálogo de erros, uma falha por linha.
    pub fn error_text(&self) -> String {
        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&mut self, step: ApplyStep, message: impl Into<String>) {
        let message = message.into();
        warn!("{}: {message}", step.label());
        self.failures.push(ApplyFailure { step, message });
    }
}

/// Roda um comando privilegiado; `Err` carrega a mensagem para o relatório.
fn sudo(runner: &dyn CommandRunner, args: &[&str]) -> Result<(), String> {
    match runner.run("sudo", args, QUERY_TIMEOUT) {
        Ok(out) if out.success() => Ok(()),
        Ok(out) => Err(out.stderr_trimmed().to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Aplica os valores na GPU, atualiza o serviço e salva a configuração.
pub fn apply_settings(
    runner: &dyn CommandRunner,
    settings: &GpuSettings,
    paths: &AppPaths,
    theme: &str,
) -> ApplyReport {
    let mut report = ApplyReport {
        settings: *settings,
        failures: Vec::new(),
    };

    let power = settings.power_limit.to_string();
    if let Err(e) = sudo(runner, &[NVIDIA_SMI, "-pl", &power]) {
        report.push(ApplyStep::PowerLimit, e);
    }

    let mem = format!("{MEMORY_OFFSET_ATTR}={}", settings.memory_offset);
    if let Err(e) = sudo(runner, &[NVIDIA_SETTINGS, "-a", &mem]) {
        report.push(ApplyStep::MemoryOffset, e);
    }

    let core = format!("{CORE_OFFSET_ATTR}={}", settings.core_offset);
    if let Err(e) = sudo(runner, &[NVIDIA_SETTINGS, "-a", &core]) {
        report.push(ApplyStep::CoreOffset, e);
    }

    let service = if settings.apply_on_startup {
        startup::install_startup_service(runner, paths, settings)
    } else {
        startup::remove_startup_service(runner)
    };
    if let Err(e) = service {
        report.push(ApplyStep::StartupService, e.to_string());
    }

    if let Err(e) = AppConfig::from_settings(settings, theme).save(&paths.config_file) {
        report.push(ApplyStep::SaveConfig, e.to_string());
    }

    if report.is_success() {
        info!("{}", report.status_line());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::FakeRunner;

    fn settings(startup: bool) -> GpuSettings {
        GpuSettings {
            power_limit: 350,
            memory_offset: 1000,
            core_offset: -45,
            apply_on_startup: startup,
        }
    }

    #[test]
    fn runs_steps_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_home(dir.path());
        let runner = FakeRunner::new();

        let report = apply_settings(&runner, &settings(false), &paths, "dark");

        assert!(report.is_success());
        assert_eq!(
            runner.lines(),
            vec![
                "sudo nvidia-smi -pl 350".to_string(),
                "sudo nvidia-settings -a [gpu:0]/GPUMemoryTransferRateOffsetAllPerformanceLevels=1000".into(),
                "sudo nvidia-settings -a [gpu:0]/GPUGraphicsClockOffsetAllPerformanceLevels=-45".into(),
                "sudo bash -c systemctl disable gpu-control.service; rm -f /etc/systemd/system/gpu-control.service; systemctl daemon-reload".into(),
            ]
        );
        assert_eq!(report.status_line(), "Applied: 350W | Mem +1000 | Core -45");

        let saved = AppConfig::load(&paths.config_file);
        assert_eq!(saved.power, Some(350));
        assert_eq!(saved.startup, Some(false));
    }

    #[test]
    fn failures_do_not_stop_later_steps() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_home(dir.path());
        let runner = FakeRunner::new()
            .fail("sudo nvidia-smi", 4, "Insufficient Permissions\n")
            .missing("sudo nvidia-settings");

        let report = apply_settings(&runner, &settings(true), &paths, "dark");

        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.failures[0].to_string(), "Power limit: Insufficient Permissions");
        assert_eq!(report.failures[1].step, ApplyStep::MemoryOffset);
        assert_eq!(report.failures[2].step, ApplyStep::CoreOffset);
        assert!(report.error_text().starts_with("Power limit: Insufficient Permissions\nMemory offset: "));

        // Serviço instalado e config salva mesmo com falhas
        assert!(paths.startup_script.exists());
        assert!(runner.lines().last().unwrap().starts_with("sudo bash "));
        assert_eq!(AppConfig::load(&paths.config_file).startup, Some(true));
    }

    #[test]
    fn service_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_home(dir.path());
        let runner = FakeRunner::new().fail("sudo bash -c", 1, "Unit not loaded");

        let report = apply_settings(&runner, &settings(false), &paths, "dark");

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, ApplyStep::StartupService);
    }

    #[test]
    fn gpu_commands_use_query_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_home(dir.path());
        let runner = FakeRunner::new();

        apply_settings(&runner, &settings(false), &paths, "dark");

        let calls = runner.calls.lock().unwrap();
        assert!(calls[..3].iter().all(|c| c.timeout == QUERY_TIMEOUT));
    }

    #[test]
    fn config_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_home(dir.path());
        // Um arquivo no lugar de ~/.config impede criar o diretório
        std::fs::write(dir.path().join(".config"), "").unwrap();
        let runner = FakeRunner::new();

        let report = apply_settings(&runner, &settings(false), &paths, "dark");

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, ApplyStep::SaveConfig);
        assert!(report.error_text().starts_with("Config: "));
        assert!(!paths.config_file.exists());
    }
}
