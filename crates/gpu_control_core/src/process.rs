//! Execução de comandos externos com timeout.
//!
//! Toda interação com o driver passa por aqui: `nvidia-smi`,
//! `nvidia-settings`, `sudo`, `pkexec`, `systemctl`. O trait
//! [`CommandRunner`] permite trocar a execução real por um fake nos testes.

use crossbeam_channel::{Receiver, bounded};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Timeout padrão para consultas e passos do Apply.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout para `sudo -n` e `nvidia-settings -q`.
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(3);
/// Timeout para `whoami`.
pub const WHOAMI_TIMEOUT: Duration = Duration::from_secs(2);
/// Timeout para instalar/remover o serviço systemd.
pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout do `pkexec` (usuário digitando a senha).
pub const PKEXEC_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Erros de execução de processo.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("falha ao executar {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} não terminou em {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("erro aguardando {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Saída capturada de um processo que terminou.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Código de saída (`None` se morto por sinal)
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Executa programas externos.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], timeout: Duration)
        -> Result<CommandOutput, ProcessError>;
}

/// Execução real via [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, ProcessError> {
        debug!("$ {program} {}", args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.into(),
                source,
            })?;

        // Drena os pipes em threads separadas para o filho nunca bloquear
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    warn!("{program} excedeu {}s, matando processo", timeout.as_secs());
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ProcessError::Timeout {
                        program: program.into(),
                        timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(ProcessError::Wait {
                        program: program.into(),
                        source,
                    });
                }
            }
        };

        // Um neto pode herdar os pipes e mantê-los abertos: o prazo vale também aqui
        let timed_out = || {
            warn!("{program} terminou mas a saída não fechou em {}s", timeout.as_secs());
            ProcessError::Timeout {
                program: program.into(),
                timeout,
            }
        };
        let stdout = collect(stdout, deadline).ok_or_else(timed_out)?;
        let stderr = collect(stderr, deadline).ok_or_else(timed_out)?;

        let output = CommandOutput {
            status: status.code(),
            stdout,
            stderr,
        };

        if !output.success() {
            debug!("{program} saiu com {:?}: {}", output.status, output.stderr_trimmed());
        }
        Ok(output)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        // Receptor descartado após timeout: nada a fazer
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Texto drenado até o prazo; `None` se o pipe continuou aberto.
fn collect(rx: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    match rx {
        Some(rx) => rx.recv_deadline(deadline).ok(),
        None => Some(String::new()),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Runner roteirizado para testes.

    use super::*;
    use std::sync::Mutex;

    /// Uma chamada registrada pelo [`FakeRunner`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Invocation {
        pub program: String,
        pub args: Vec<String>,
        pub timeout: Duration,
    }

    impl Invocation {
        /// Linha de comando completa, separada por espaços.
        pub fn line(&self) -> String {
            std::iter::once(self.program.as_str())
                .chain(self.args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    type Responder = Box<dyn Fn(&str) -> Result<CommandOutput, ProcessError> + Send + Sync>;

    /// Responde por prefixo da linha de comando; sem regra, sucesso vazio.
    #[derive(Default)]
    pub struct FakeRunner {
        rules: Vec<(String, Responder)>,
        pub calls: Mutex<Vec<Invocation>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(self, prefix: &str, stdout: &str) -> Self {
            let stdout = stdout.to_string();
            self.respond(prefix, move |_| {
                Ok(CommandOutput {
                    status: Some(0),
                    stdout: stdout.clone(),
                    stderr: String::new(),
                })
            })
        }

        pub fn fail(self, prefix: &str, code: i32, stderr: &str) -> Self {
            let stderr = stderr.to_string();
            self.respond(prefix, move |_| {
                Ok(CommandOutput {
                    status: Some(code),
                    stdout: String::new(),
                    stderr: stderr.clone(),
                })
            })
        }

        pub fn missing(self, prefix: &str) -> Self {
            self.respond(prefix, |line| {
                Err(ProcessError::Spawn {
                    program: line.split(' ').next().unwrap_or_default().into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            })
        }

        fn respond(
            mut self,
            prefix: &str,
            f: impl Fn(&str) -> Result<CommandOutput, ProcessError> + Send + Sync + 'static,
        ) -> Self {
            self.rules.push((prefix.to_string(), Box::new(f)));
            self
        }

        pub fn lines(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(Invocation::line).collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            program: &str,
            args: &[&str],
            timeout: Duration,
        ) -> Result<CommandOutput, ProcessError> {
            let inv = Invocation {
                program: program.into(),
                args: args.iter().map(|a| a.to_string()).collect(),
                timeout,
            };
            let line = inv.line();
            self.calls.lock().unwrap().push(inv);

            // A regra mais recente tem prioridade
            match self.rules.iter().rev().find(|(p, _)| line.starts_with(p.as_str())) {
                Some((_, f)) => f(&line),
                None => Ok(CommandOutput {
                    status: Some(0),
                    ..Default::default()
                }),
            }
        }
    }
}
