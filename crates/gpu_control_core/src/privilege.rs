//! Acesso sem senha às ferramentas NVIDIA via regra sudoers.
//!
//! Na primeira execução o painel grava `/etc/sudoers.d/gpu-control` com
//! `pkexec`. Depois disso o Apply roda `sudo` sem pedir senha.

use crate::nvidia::NVIDIA_SMI;
use crate::paths::SUDOERS_PATH;
use crate::process::{CommandRunner, PKEXEC_TIMEOUT, ProcessError, SHORT_TIMEOUT, WHOAMI_TIMEOUT};
use tracing::{info, warn};

/// Erros do bootstrap de privilégios.
#[derive(Debug, thiserror::Error)]
pub enum PrivilegeError {
    #[error("usuário atual desconhecido")]
    UnknownUser,

    #[error("nome de usuário inválido para sudoers: {0:?}")]
    InvalidUser(String),

    #[error("pkexec falhou ({code:?}): {stderr}")]
    Denied { code: Option<i32>, stderr: String },

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// `sudo -n nvidia-smi -L` funciona sem senha?
pub fn check_sudo_access(runner: &dyn CommandRunner) -> bool {
    match runner.run("sudo", &["-n", NVIDIA_SMI, "-L"], SHORT_TIMEOUT) {
        Ok(out) => out.success(),
        Err(e) => {
            warn!("Verificação de sudo falhou: {e}");
            false
        }
    }
}

/// `$USER`, ou a saída de `whoami`.
pub fn current_user(runner: &dyn CommandRunner) -> Option<String> {
    if let Ok(user) = std::env::var("USER") {
        if !user.is_empty() {
            return Some(user);
        }
    }
    runner
        .run("whoami", &[], WHOAMI_TIMEOUT)
        .ok()
        .map(|out| out.stdout_trimmed().to_string())
        .filter(|u| !u.is_empty())
}

/// Regra sudoers liberando as ferramentas usadas pelo Apply.
pub fn sudoers_rule(user: &str) -> String {
    format!(
        "{user} ALL=(ALL) NOPASSWD: /usr/bin/nvidia-smi, /usr/bin/nvidia-settings, /usr/bin/bash, /usr/bin/systemctl"
    )
}

fn valid_user(user: &str) -> bool {
    !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Grava a regra sudoers via `pkexec` (pede a senha uma vez).
pub fn install_sudoers_rule(runner: &dyn CommandRunner, user: &str) -> Result<(), PrivilegeError> {
    if !valid_user(user) {
        return Err(PrivilegeError::InvalidUser(user.into()));
    }

    let script = format!(
        "echo '{}' > {SUDOERS_PATH} && chmod 440 {SUDOERS_PATH}",
        sudoers_rule(user)
    );
    let out = runner.run("pkexec", &["bash", "-c", &script], PKEXEC_TIMEOUT)?;
    if !out.success() {
        return Err(PrivilegeError::Denied {
            code: out.status,
            stderr: out.stderr_trimmed().into(),
        });
    }

    info!("Regra sudoers instalada para {user}");
    Ok(())
}
