//! # GPU Control
//!
//! Painel para limite de potência e offsets de clock de GPUs NVIDIA no
//! Linux. Aplica via `nvidia-smi`/`nvidia-settings`, salva as preferências
//! em `~/.config/gpu-control.conf` e opcionalmente instala um serviço
//! systemd que reaplica tudo no boot.
//!
//! ## Uso
//! ```bash
//! gpu-control              # Normal (configura sudo no primeiro uso)
//! gpu-control --no-setup   # Sem verificar/instalar a regra sudoers
//! ```
//!
//! ## Atalhos
//! - `T`: Alternar tema
//! - `Q` / `Esc`: Sair

mod app;
mod panels;
mod state;
mod theme_egui;
mod worker;

use app::{GpuControlApp, LaunchOptions};
use gpu_control_core::{AppPaths, SystemRunner};
use std::sync::Arc;
use tracing::info;

fn main() -> eframe::Result<()> {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let options = LaunchOptions {
        skip_setup: std::env::args().any(|a| a == "--no-setup"),
    };
    let paths = AppPaths::default_paths();
    info!("Config: {}", paths.config_file.display());

    // ── Janela eframe ──
    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("GPU Control")
            .with_inner_size([520.0, 780.0])
            .with_min_inner_size([520.0, 780.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GPU Control",
        native,
        Box::new(move |cc| {
            Ok(Box::new(GpuControlApp::new(
                cc,
                Arc::new(SystemRunner),
                paths,
                options,
            )))
        }),
    )
}
