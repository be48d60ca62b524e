//! Serviço systemd que reaplica as configurações no boot.
//!
//! Dois scripts vão para `~/.local/bin`:
//! - `gpu-control-startup.sh`: executado pelo serviço, espera o driver e o
//!   X subirem e aplica potência e offsets;
//! - `gpu-control-setup.sh`: grava o unit em `/etc/systemd/system` e o
//!   habilita (executado via `sudo`).

use crate::nvidia::{CORE_OFFSET_ATTR, MEMORY_OFFSET_ATTR};
use crate::paths::{AppPaths, SERVICE_NAME, SERVICE_PATH};
use crate::process::{CommandRunner, ProcessError, SERVICE_TIMEOUT};
use crate::types::GpuSettings;
use std::fmt::Write as _;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// UID usado no caminho do XAUTHORITY quando o dono do home é desconhecido.
const DEFAULT_UID: u32 = 1000;

/// Erros de instalação/remoção do serviço.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("não foi possível escrever {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{action} do serviço falhou ({code:?}): {stderr}")]
    Command {
        action: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// `XAUTHORITY` da sessão GDM do dono do home.
pub fn xauthority_for(home: &Path) -> String {
    let uid = std::fs::metadata(home)
        .map(|m| m.uid())
        .unwrap_or(DEFAULT_UID);
    format!("/run/user/{uid}/gdm/Xauthority")
}

/// Script executado no boot pelo serviço.
pub fn startup_script(settings: &GpuSettings, xauthority: &str) -> String {
    let mut s = String::new();
    // write! em String não falha
    let _ = write!(
        s,
        r#"#!/bin/bash
# GPU Control startup script
# This script applies saved GPU settings on boot

export DISPLAY=:0
export XAUTHORITY={xauthority}

# Wait for nvidia driver to be ready
for i in {{1..30}}; do
    if nvidia-smi -L >/dev/null 2>&1; then
        break
    fi
    sleep 1
done

# Apply power limit
nvidia-smi -pl {power}

# Wait for X display to be ready and apply clock offsets
sleep 5
for i in {{1..30}}; do
    if [ -n "$DISPLAY" ] && nvidia-settings -q {mem_attr} >/dev/null 2>&1; then
        nvidia-settings -a {mem_attr}={mem}
        nvidia-settings -a {core_attr}={core}
        logger "GPU Control: Settings applied successfully"
        exit 0
    fi
    sleep 2
done

logger "GPU Control: Failed to apply settings"
exit 1
"#,
        power = settings.power_limit,
        mem = settings.memory_offset,
        core = settings.core_offset,
        mem_attr = MEMORY_OFFSET_ATTR,
        core_attr = CORE_OFFSET_ATTR,
    );
    s
}

/// Unit systemd apontando para o script de boot.
pub fn service_unit(startup_path: &Path) -> String {
    format!(
        "[Unit]
Description=GPU Control - Power and Clock Offsets
After=nvidia-persistenced.service display-manager.service
After=graphical-session.target
Wants=display-manager.service

[Service]
Type=oneshot
RemainAfterExit=yes
ExecStart={}

[Install]
WantedBy=graphical.target
",
        startup_path.display()
    )
}

/// Script que instala e habilita o unit.
pub fn setup_script(startup_path: &Path) -> String {
    format!(
        "#!/bin/bash
cat > {SERVICE_PATH} << 'SERVICEEOF'
{unit}SERVICEEOF
systemctl daemon-reload
systemctl enable {SERVICE_NAME}
",
        unit = service_unit(startup_path)
    )
}

fn write_executable(path: &Path, content: &str) -> Result<(), StartupError> {
    let err = |source| StartupError::Write {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(path, content).map_err(err)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(err)?;
    Ok(())
}

/// Gera os dois scripts em `~/.local/bin`.
pub fn write_scripts(paths: &AppPaths, settings: &GpuSettings) -> Result<(), StartupError> {
    std::fs::create_dir_all(&paths.bin_dir).map_err(|source| StartupError::Write {
        path: paths.bin_dir.clone(),
        source,
    })?;

    let xauthority = xauthority_for(&paths.home);
    write_executable(&paths.startup_script, &startup_script(settings, &xauthority))?;
    write_executable(&paths.setup_script, &setup_script(&paths.startup_script))?;
    Ok(())
}

/// Gera os scripts e instala o serviço com `sudo bash`.
pub fn install_startup_service(
    runner: &dyn CommandRunner,
    paths: &AppPaths,
    settings: &GpuSettings,
) -> Result<(), StartupError> {
    write_scripts(paths, settings)?;

    let setup = paths.setup_script.to_string_lossy();
    let out = runner.run("sudo", &["bash", setup.as_ref()], SERVICE_TIMEOUT)?;
    if !out.success() {
        warn!("Instalação do serviço falhou: {}", out.stderr_trimmed());
        return Err(StartupError::Command {
            action: "instalação",
            code: out.status,
            stderr: out.stderr_trimmed().into(),
        });
    }

    info!("Serviço {SERVICE_NAME} instalado");
    Ok(())
}

/// Desabilita e remove o unit.
pub fn remove_startup_service(runner: &dyn CommandRunner) -> Result<(), StartupError> {
    let script = format!(
        "systemctl disable {SERVICE_NAME}; rm -f {SERVICE_PATH}; systemctl daemon-reload"
    );
    let out = runner.run("sudo", &["bash", "-c", &script], SERVICE_TIMEOUT)?;
    if !out.success() {
        return Err(StartupError::Command {
            action: "remoção",
            code: out.status,
            stderr: out.stderr_trimmed().into(),
        });
    }

    info!("Serviço {SERVICE_NAME} removido");
    Ok(())
}
