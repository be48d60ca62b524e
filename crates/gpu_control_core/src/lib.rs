//! # GPU Control Core
//!
//! Tudo que o painel faz fora da UI: consultar o driver NVIDIA, aplicar
//! potência e offsets, persistir preferências e instalar o serviço de
//! boot. Sem dependência de GUI.
//!
//! ## Módulos
//! - [`process`] – Execução de comandos externos com timeout
//! - [`nvidia`] – Consultas via `nvidia-smi` / `nvidia-settings`
//! - [`types`] – Capacidades da GPU e valores do painel
//! - [`presets`] – Presets e textos derivados
//! - [`config`] – Arquivo `~/.config/gpu-control.conf`
//! - [`privilege`] – Regra sudoers no primeiro uso
//! - [`apply`] – Sequência do botão Apply
//! - [`startup`] – Serviço systemd de boot
//! - [`theme`] – Temas de cores

pub mod apply;
pub mod config;
pub mod nvidia;
pub mod paths;
pub mod presets;
pub mod privilege;
pub mod process;
pub mod startup;
pub mod theme;
pub mod types;

// Re-exports convenientes
pub use apply::{ApplyReport, apply_settings};
pub use config::AppConfig;
pub use nvidia::CurrentReading;
pub use paths::AppPaths;
pub use presets::Preset;
pub use process::{CommandRunner, ProcessError, SystemRunner};
pub use types::{GpuCapabilities, GpuSettings};
