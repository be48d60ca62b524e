//! Estado do painel e reação aos eventos da thread de trabalho.
//!
//! Separado da janela para ser testável sem contexto egui.

use crate::worker::WorkerEvent;
use gpu_control_core::apply::ApplyReport;
use gpu_control_core::{CurrentReading, GpuCapabilities, GpuSettings, Preset};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
}

/// Linha de status abaixo do nome da GPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub level: StatusLevel,
}

impl Status {
    pub fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

/// Diálogo modal aberto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    FirstRun,
    SetupFailed,
    Errors(String),
}

/// Atalho de teclado da janela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    NextTheme,
    Quit,
}

impl Shortcut {
    pub const KEYS: [egui::Key; 3] = [egui::Key::T, egui::Key::Q, egui::Key::Escape];

    /// Atalho da tecla; nenhum enquanto um campo de texto tem o foco.
    pub fn from_key(key: egui::Key, editing: bool) -> Option<Self> {
        if editing {
            return None;
        }
        match key {
            egui::Key::T => Some(Shortcut::NextTheme),
            egui::Key::Q | egui::Key::Escape => Some(Shortcut::Quit),
            _ => None,
        }
    }
}

pub struct PanelState {
    /// O arquivo de config existia na inicialização (ou após o último Apply)
    pub config_existed: bool,
    pub caps: Option<GpuCapabilities>,
    pub settings: GpuSettings,
    pub status: Status,
    /// Job em andamento: botões desabilitados
    pub busy: bool,
    pub dialog: Option<Dialog>,
}

impl PanelState {
    /// Estado inicial: aguardando as capacidades e a leitura atual.
    pub fn new(settings: GpuSettings, config_existed: bool) -> Self {
        Self {
            config_existed,
            caps: None,
            settings,
            status: Status::new("Reading current values...", StatusLevel::Info),
            busy: true,
            dialog: None,
        }
    }

    /// Aplica um evento da thread de trabalho.
    pub fn handle(&mut self, event: WorkerEvent, config_file: &Path) {
        match event {
            WorkerEvent::Capabilities(caps) => {
                self.settings = self.settings.clamped(&caps);
                self.caps = Some(caps);
            }
            WorkerEvent::SudoMissing => {
                self.dialog = Some(Dialog::FirstRun);
            }
            WorkerEvent::SetupFinished(result) => {
                if result.is_err() {
                    self.dialog = Some(Dialog::SetupFailed);
                }
            }
            WorkerEvent::Current(reading) => self.on_current(reading),
            WorkerEvent::Applied { report, reset } => {
                self.on_applied(report, reset);
                self.config_existed = config_file.exists();
            }
        }
    }

    fn on_current(&mut self, reading: CurrentReading) {
        // Sem config salva, os controles partem do estado da GPU
        if !self.config_existed {
            reading.seed_settings(&mut self.settings);
            if let Some(caps) = &self.caps {
                self.settings = self.settings.clamped(caps);
            }
        }
        if let Some(line) = reading.status_line() {
            self.status = Status::new(line, StatusLevel::Info);
        }
        self.busy = false;
    }

    fn on_applied(&mut self, report: ApplyReport, reset: bool) {
        if report.is_success() {
            self.status = Status::new(report.status_line(), StatusLevel::Success);
        } else {
            self.dialog = Some(Dialog::Errors(report.error_text()));
        }
        if reset {
            self.status = Status::new("Reset to stock defaults", StatusLevel::Warning);
        }
        self.busy = false;
    }

    /// Ajusta os valores às capacidades e marca o Apply em andamento.
    /// `None` enquanto as capacidades não chegaram.
    pub fn begin_apply(&mut self) -> Option<GpuSettings> {
        let caps = self.caps.as_ref()?;
        self.settings = self.settings.clamped(caps);
        info!(
            "Aplicando: {}W | mem {} | core {} | startup {}",
            self.settings.power_limit,
            self.settings.memory_offset,
            self.settings.core_offset,
            self.settings.apply_on_startup
        );
        self.busy = true;
        Some(self.settings)
    }

    /// Preset Default seguido de Apply.
    pub fn begin_reset(&mut self) -> Option<GpuSettings> {
        let caps = self.caps.as_ref()?;
        Preset::Default.apply_to(&mut self.settings, caps);
        self.begin_apply()
    }

    /// Controles e botões habilitados.
    pub fn interactive(&self) -> bool {
        !self.busy && self.dialog.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpu_control_core::apply::{ApplyFailure, ApplyStep};
    use gpu_control_core::nvidia::OffsetQuery;

    fn caps() -> GpuCapabilities {
        GpuCapabilities {
            name: "NVIDIA GeForce RTX 4080".into(),
            max_power_limit: 400,
            default_power_limit: 320,
        }
    }

    fn saved() -> GpuSettings {
        GpuSettings {
            power_limit: 300,
            memory_offset: 500,
            core_offset: 30,
            apply_on_startup: true,
        }
    }

    fn reading() -> CurrentReading {
        CurrentReading {
            smi_summary: "350.00, 10501, 2520".into(),
            memory_offset: OffsetQuery {
                text: "1000".into(),
                ok: true,
            },
            core_offset: OffsetQuery {
                text: "-45".into(),
                ok: true,
            },
            power_limit: Some(350),
        }
    }

    fn report(failures: Vec<ApplyFailure>) -> ApplyReport {
        ApplyReport {
            settings: saved(),
            failures,
        }
    }

    fn missing_config() -> std::path::PathBuf {
        std::path::PathBuf::from("/definitely/missing/gpu-control.conf")
    }

    #[test]
    fn current_values_seed_controls_without_config() {
        let mut state = PanelState::new(GpuSettings::default(), false);
        state.handle(WorkerEvent::Capabilities(caps()), &missing_config());
        state.handle(WorkerEvent::Current(reading()), &missing_config());

        assert_eq!(state.settings.power_limit, 350);
        assert_eq!(state.settings.memory_offset, 1000);
        assert_eq!(state.settings.core_offset, -45);
        assert_eq!(state.status.text, "Current: 350W | Mem +1000 | Core -45");
        assert_eq!(state.status.level, StatusLevel::Info);
        assert!(!state.busy);
    }

    #[test]
    fn saved_config_wins_over_current_values() {
        let mut state = PanelState::new(saved(), true);
        state.handle(WorkerEvent::Capabilities(caps()), &missing_config());
        state.handle(WorkerEvent::Current(reading()), &missing_config());

        assert_eq!(state.settings, saved());
        assert_eq!(state.status.text, "Current: 350W | Mem +1000 | Core -45");
        assert!(!state.busy);
    }

    #[test]
    fn seeded_power_is_clamped_to_capabilities() {
        let mut state = PanelState::new(GpuSettings::default(), false);
        state.handle(WorkerEvent::Capabilities(caps()), &missing_config());
        let mut r = reading();
        r.power_limit = Some(600);
        state.handle(WorkerEvent::Current(r), &missing_config());
        assert_eq!(state.settings.power_limit, 400);
    }

    #[test]
    fn successful_apply_shows_applied_values() {
        let mut state = PanelState::new(saved(), true);
        state.busy = true;
        state.handle(
            WorkerEvent::Applied {
                report: report(Vec::new()),
                reset: false,
            },
            &missing_config(),
        );
        assert_eq!(state.status.text, "Applied: 300W | Mem +500 | Core +30");
        assert_eq!(state.status.level, StatusLevel::Success);
        assert_eq!(state.dialog, None);
        assert!(!state.busy);
        assert!(!state.config_existed);
    }

    #[test]
    fn reset_ends_with_warning_status() {
        let mut state = PanelState::new(saved(), true);
        state.handle(
            WorkerEvent::Applied {
                report: report(Vec::new()),
                reset: true,
            },
            &missing_config(),
        );
        assert_eq!(
            state.status,
            Status::new("Reset to stock defaults", StatusLevel::Warning)
        );
    }

    #[test]
    fn failed_reset_opens_errors_and_keeps_warning_status() {
        let mut state = PanelState::new(saved(), true);
        let failure = ApplyFailure {
            step: ApplyStep::PowerLimit,
            message: "Insufficient Permissions".into(),
        };
        state.handle(
            WorkerEvent::Applied {
                report: report(vec![failure]),
                reset: true,
            },
            &missing_config(),
        );
        assert_eq!(
            state.dialog,
            Some(Dialog::Errors("Power limit: Insufficient Permissions".into()))
        );
        assert_eq!(
            state.status,
            Status::new("Reset to stock defaults", StatusLevel::Warning)
        );
        assert!(!state.interactive());
    }

    #[test]
    fn apply_marks_config_as_existing() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("gpu-control.conf");
        std::fs::write(&config, "power=300\n").unwrap();

        let mut state = PanelState::new(GpuSettings::default(), false);
        state.handle(
            WorkerEvent::Applied {
                report: report(Vec::new()),
                reset: false,
            },
            &config,
        );
        assert!(state.config_existed);
    }

    #[test]
    fn reset_applies_default_preset() {
        let mut state = PanelState::new(saved(), true);
        assert_eq!(state.begin_reset(), None);

        state.handle(WorkerEvent::Capabilities(caps()), &missing_config());
        state.busy = false;
        let applied = state.begin_reset().unwrap();
        assert_eq!(applied.power_limit, 320);
        assert_eq!(applied.memory_offset, 0);
        assert_eq!(applied.core_offset, 0);
        assert!(applied.apply_on_startup);
        assert!(state.busy);
    }

    #[test]
    fn shortcuts_map_keys() {
        assert_eq!(Shortcut::from_key(egui::Key::T, false), Some(Shortcut::NextTheme));
        assert_eq!(Shortcut::from_key(egui::Key::Q, false), Some(Shortcut::Quit));
        assert_eq!(Shortcut::from_key(egui::Key::Escape, false), Some(Shortcut::Quit));
        assert_eq!(Shortcut::from_key(egui::Key::A, false), None);
    }

    #[test]
    fn shortcuts_ignored_while_editing_a_value() {
        for key in Shortcut::KEYS {
            assert_eq!(Shortcut::from_key(key, true), None);
        }
    }

    #[test]
    fn missing_sudo_opens_first_run_dialog() {
        let mut state = PanelState::new(GpuSettings::default(), false);
        state.handle(WorkerEvent::SudoMissing, &missing_config());
        assert_eq!(state.dialog, Some(Dialog::FirstRun));

        state.dialog = None;
        state.handle(WorkerEvent::SetupFinished(Err("denied".into())), &missing_config());
        assert_eq!(state.dialog, Some(Dialog::SetupFailed));
    }
}
