//! Janela principal – App eframe/egui.

use crate::panels;
use crate::state::{Dialog, PanelState, Shortcut, StatusLevel};
use crate::theme_egui::{self, EguiTheme};
use crate::worker::{self, Job, Worker};
use egui::{Color32, RichText};
use gpu_control_core::{AppConfig, AppPaths, CommandRunner, GpuSettings};
use std::sync::Arc;
use tracing::{info, warn};

/// Opções de linha de comando.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchOptions {
    /// `--no-setup`: não verificar/instalar a regra sudoers
    pub skip_setup: bool,
}

/// Janela do painel.
pub struct GpuControlApp {
    paths: AppPaths,

    theme: EguiTheme,
    theme_index: usize,
    all_themes: Vec<EguiTheme>,

    worker: Worker,
    state: PanelState,
}

impl GpuControlApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runner: Arc<dyn CommandRunner>,
        paths: AppPaths,
        options: LaunchOptions,
    ) -> Self {
        // ── Config ──
        let config_existed = paths.config_file.exists();
        let config = AppConfig::load(&paths.config_file);
        for problem in config.validate() {
            warn!("Config: {problem}");
        }
        let mut settings = GpuSettings::default();
        config.apply_to(&mut settings);

        // ── Tema ──
        let all_themes = theme_egui::all_themes();
        let theme_index = config
            .theme
            .as_deref()
            .and_then(|name| all_themes.iter().position(|t| t.name == name))
            .unwrap_or(0);
        let theme = all_themes[theme_index].clone();

        // ── Worker: capacidades → sudo → valores atuais ──
        let worker = worker::spawn_worker(runner, paths.clone(), cc.egui_ctx.clone());
        worker.send(Job::Probe {
            check_sudo: !options.skip_setup,
        });

        Self {
            paths,
            theme,
            theme_index,
            all_themes,
            worker,
            state: PanelState::new(settings, config_existed),
        }
    }

    /// Processa eventos pendentes da thread de trabalho.
    fn poll_worker(&mut self) {
        while let Ok(event) = self.worker.events.try_recv() {
            self.state.handle(event, &self.paths.config_file);
        }
    }

    fn start_apply(&mut self, reset: bool) {
        let settings = if reset {
            self.state.begin_reset()
        } else {
            self.state.begin_apply()
        };
        if let Some(settings) = settings {
            self.state.busy = self.worker.send(Job::Apply {
                settings,
                theme: self.theme.name.clone(),
                reset,
            });
        }
    }

    fn status_color(&self) -> Color32 {
        match self.state.status.level {
            StatusLevel::Info => self.theme.dim,
            StatusLevel::Success => self.theme.success,
            StatusLevel::Warning => self.theme.warning,
        }
    }

    /// Renderiza o diálogo aberto, se houver.
    fn render_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.state.dialog.clone() else {
            return;
        };
        let (title, body) = match &dialog {
            Dialog::FirstRun => (
                "First Run Setup",
                "GPU Control needs one-time permission to manage your GPU.\n\
                 You'll be asked for your password once."
                    .to_string(),
            ),
            Dialog::SetupFailed => (
                "Setup Failed",
                "Could not set up permissions. The app will still work but may ask for your password."
                    .to_string(),
            ),
            Dialog::Errors(text) => ("Errors", text.clone()),
        };

        let mut acknowledged = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui: &mut egui::Ui| {
                ui.label(body);
                ui.add_space(8.0);
                ui.vertical_centered(|ui: &mut egui::Ui| {
                    acknowledged = ui.button("  OK  ").clicked();
                });
            });

        if acknowledged {
            self.state.dialog = None;
            if dialog == Dialog::FirstRun {
                self.worker.send(Job::InstallSudoers);
            }
        }
    }
}

impl eframe::App for GpuControlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Poll worker ──
        self.poll_worker();

        ctx.set_visuals(self.theme.visuals());

        // ── Atalhos de teclado ──
        let editing = ctx.wants_keyboard_input();
        let pressed: Vec<egui::Key> = ctx.input(|i: &egui::InputState| {
            Shortcut::KEYS
                .into_iter()
                .filter(|k| i.key_pressed(*k))
                .collect()
        });
        for shortcut in pressed.into_iter().filter_map(|k| Shortcut::from_key(k, editing)) {
            match shortcut {
                Shortcut::NextTheme => {
                    self.theme_index = (self.theme_index + 1) % self.all_themes.len();
                    self.theme = self.all_themes[self.theme_index].clone();
                    info!("Tema: {}", self.theme.name);
                }
                Shortcut::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            }
        }

        self.render_dialog(ctx);

        // ── Painel central ──
        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            ui.spacing_mut().item_spacing.y = 10.0;

            // ── Título ──
            ui.vertical_centered(|ui: &mut egui::Ui| {
                ui.label(RichText::new("NVIDIA GPU Control").size(24.0).strong());
                let name = self
                    .state
                    .caps
                    .as_ref()
                    .map_or("NVIDIA GPU", |c| c.name.as_str());
                ui.label(RichText::new(name).color(self.theme.accent).size(12.0));

                // ── Status ──
                ui.horizontal(|ui: &mut egui::Ui| {
                    if self.state.busy {
                        ui.spinner();
                    }
                    let text = RichText::new(&self.state.status.text)
                        .color(self.status_color())
                        .size(13.0);
                    let text = if self.state.status.level == StatusLevel::Info {
                        text
                    } else {
                        text.strong()
                    };
                    ui.label(text);
                });
            });

            ui.separator();

            let Some(caps) = self.state.caps.clone() else {
                return;
            };

            ui.add_enabled_ui(self.state.interactive(), |ui: &mut egui::Ui| {
                panels::render_power(ui, &mut self.state.settings, &caps, &self.theme);
                panels::render_memory(ui, &mut self.state.settings, &self.theme);
                panels::render_core(ui, &mut self.state.settings, &self.theme);

                if let Some(preset) = panels::render_presets(ui, &caps, &self.theme) {
                    preset.apply_to(&mut self.state.settings, &caps);
                }

                ui.checkbox(
                    &mut self.state.settings.apply_on_startup,
                    RichText::new("Apply on startup").size(13.0),
                );

                let width = ui.available_width();
                let apply = egui::Button::new(
                    RichText::new("Apply").color(Color32::WHITE).size(16.0).strong(),
                )
                .fill(self.theme.success)
                .corner_radius(8.0)
                .min_size(egui::vec2(width, 48.0));
                if ui.add(apply).clicked() {
                    self.start_apply(false);
                }

                // Fundo neutro, vermelho no hover
                let reset = ui.scope(|ui: &mut egui::Ui| {
                    self.theme.danger_button(&mut ui.visuals_mut().widgets);
                    ui.add(
                        egui::Button::new(
                            RichText::new("Reset to Defaults").color(self.theme.text).size(13.0),
                        )
                        .corner_radius(6.0)
                        .min_size(egui::vec2(width, 36.0)),
                    )
                });
                if reset.inner.on_hover_text("Default preset, then Apply").clicked() {
                    self.start_apply(true);
                }
            });

            // ── Help bar (fundo) ──
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("[T] Theme | [Q/Esc] Quit")
                        .color(self.theme.dim)
                        .monospace()
                        .size(10.0),
                );
            });
        });
    }
}
