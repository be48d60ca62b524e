//! Thread de trabalho: roda os comandos bloqueantes fora da UI.
//!
//! A UI envia [`Job`]s e drena [`WorkerEvent`]s a cada frame.

use crossbeam_channel::{Receiver, Sender, unbounded};
use gpu_control_core::apply::{ApplyReport, apply_settings};
use gpu_control_core::{AppPaths, CommandRunner, CurrentReading, GpuCapabilities, GpuSettings};
use gpu_control_core::{nvidia, privilege};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pedido da UI para a thread de trabalho.
#[derive(Debug, Clone)]
pub enum Job {
    /// Inicialização: capacidades, sudo (opcional) e valores atuais.
    Probe { check_sudo: bool },
    /// Grava a regra sudoers via pkexec e continua a inicialização.
    InstallSudoers,
    /// Sequência do Apply. `reset` marca o botão "Reset to Defaults".
    Apply {
        settings: GpuSettings,
        theme: String,
        reset: bool,
    },
}

/// Resposta da thread de trabalho.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Capabilities(GpuCapabilities),
    /// `sudo -n` pediu senha: a UI mostra o diálogo de primeiro uso.
    SudoMissing,
    /// Resultado do pkexec (`Err` com a mensagem).
    SetupFinished(Result<(), String>),
    Current(CurrentReading),
    Applied { report: ApplyReport, reset: bool },
}

/// Canais da UI para a thread de trabalho.
pub struct Worker {
    pub jobs: Sender<Job>,
    pub events: Receiver<WorkerEvent>,
}

impl Worker {
    /// Envia um job; falha só se a thread morreu.
    pub fn send(&self, job: Job) -> bool {
        if let Err(e) = self.jobs.send(job) {
            warn!("Thread de trabalho indisponível: {e}");
            return false;
        }
        true
    }
}

/// Inicia a thread de trabalho. `ctx` é usado para acordar a UI.
pub fn spawn_worker(
    runner: Arc<dyn CommandRunner>,
    paths: AppPaths,
    ctx: egui::Context,
) -> Worker {
    let (job_tx, job_rx) = unbounded::<Job>();
    let (event_tx, event_rx) = unbounded::<WorkerEvent>();

    std::thread::Builder::new()
        .name("gpu-worker".into())
        .spawn(move || {
            let emit = |event: WorkerEvent| {
                debug!("→ UI: {event:?}");
                // UI fechada: nada a fazer
                let _ = event_tx.send(event);
                ctx.request_repaint();
            };
            for job in job_rx.iter() {
                run_job(runner.as_ref(), &paths, job, &emit);
            }
            info!("Thread de trabalho encerrada");
        })
        .expect("Falha ao criar thread de trabalho");

    Worker {
        jobs: job_tx,
        events: event_rx,
    }
}

fn run_job(
    runner: &dyn CommandRunner,
    paths: &AppPaths,
    job: Job,
    emit: &dyn Fn(WorkerEvent),
) {
    match job {
        Job::Probe { check_sudo } => {
            emit(WorkerEvent::Capabilities(nvidia::query_capabilities(runner)));

            if check_sudo && !privilege::check_sudo_access(runner) {
                info!("Sem acesso sudo sem senha, pedindo setup");
                emit(WorkerEvent::SudoMissing);
                return;
            }
            emit(WorkerEvent::Current(nvidia::read_current_values(runner)));
        }
        Job::InstallSudoers => {
            let result = match privilege::current_user(runner) {
                Some(user) => privilege::install_sudoers_rule(runner, &user),
                None => Err(privilege::PrivilegeError::UnknownUser),
            }
            .map_err(|e| {
                warn!("Setup de permissões falhou: {e}");
                e.to_string()
            });
            emit(WorkerEvent::SetupFinished(result));
            emit(WorkerEvent::Current(nvidia::read_current_values(runner)));
        }
        Job::Apply {
            settings,
            theme,
            reset,
        } => {
            let report = apply_settings(runner, &settings, paths, &theme);
            emit(WorkerEvent::Applied { report, reset });
        }
    }
}
