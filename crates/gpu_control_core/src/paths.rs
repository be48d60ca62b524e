//! Caminhos derivados do `$HOME` do usuário.

use std::path::{Path, PathBuf};

/// Nome do unit systemd instalado.
pub const SERVICE_NAME: &str = "gpu-control.service";
/// Caminho do unit em `/etc`.
pub const SERVICE_PATH: &str = "/etc/systemd/system/gpu-control.service";
/// Regra sudoers gerada no primeiro uso.
pub const SUDOERS_PATH: &str = "/etc/sudoers.d/gpu-control";

/// Todos os arquivos que o painel lê ou escreve no home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub home: PathBuf,
    /// `~/.config/gpu-control.conf`
    pub config_file: PathBuf,
    /// `~/.local/bin`
    pub bin_dir: PathBuf,
    /// Script executado pelo serviço no boot
    pub startup_script: PathBuf,
    /// Script que instala o unit (executado via sudo)
    pub setup_script: PathBuf,
}

impl AppPaths {
    pub fn from_home(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref().to_path_buf();
        let bin_dir = home.join(".local").join("bin");
        Self {
            config_file: home.join(".config").join("gpu-control.conf"),
            startup_script: bin_dir.join("gpu-control-startup.sh"),
            setup_script: bin_dir.join("gpu-control-setup.sh"),
            bin_dir,
            home,
        }
    }

    /// Caminhos do usuário atual (`$HOME`, ou `.` se não definido).
    pub fn default_paths() -> Self {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_home(home)
    }
}
