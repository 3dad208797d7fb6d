//! Async single-owner wrapper around the [`Reconciler`]
//!
//! All signals and edits funnel through one mpsc queue into one task, so
//! list state is only ever touched from a single timeline. A periodic tick
//! drives auto save, and changed settings or lists are written after every
//! command.

use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, oneshot};

use crate::context::AppConfig;
use crate::engine::{InventorySignal, Reconciler, ShutdownReport, SignalOutcome};
use crate::filters::FilterConfiguration;

/// How long shutdown waits for the final inventory write
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

const COMMAND_BUFFER: usize = 256;

pub enum ServiceCommand {
    /// Feed a signal, optionally asking for its outcome
    Signal(InventorySignal, Option<oneshot::Sender<SignalOutcome>>),
    /// Replace the settings and resync trackers with them
    UpdateConfig(AppConfig),
    SetActiveCraftList(Option<String>, oneshot::Sender<bool>),
    AddCraftList {
        name: Option<String>,
        ephemeral: bool,
        reply: oneshot::Sender<String>,
    },
    RemoveList(String, oneshot::Sender<bool>),
    Lists(oneshot::Sender<Vec<FilterConfiguration>>),
    Config(oneshot::Sender<AppConfig>),
    Shutdown(oneshot::Sender<ShutdownReport>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Service Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Cloneable handle for talking to a running [`ReconcilerService`]
#[derive(Clone)]
pub struct ServiceHandle {
    pub cmd_tx: mpsc::Sender<ServiceCommand>,
}

impl ServiceHandle {
    /// Queue a signal without waiting for it to be handled
    pub async fn send(&self, signal: InventorySignal) -> Result<(), String> {
        self.cmd_tx
            .send(ServiceCommand::Signal(signal, None))
            .await
            .map_err(|e| e.to_string())
    }

    /// Queue a signal and wait for its outcome
    pub async fn dispatch(&self, signal: InventorySignal) -> Result<SignalOutcome, String> {
        let (tx, rx) = oneshot::channel();
        self.request(ServiceCommand::Signal(signal, Some(tx)), rx).await
    }

    pub async fn update_config(&self, config: AppConfig) -> Result<(), String> {
        self.cmd_tx
            .send(ServiceCommand::UpdateConfig(config))
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn config(&self) -> Result<AppConfig, String> {
        let (tx, rx) = oneshot::channel();
        self.request(ServiceCommand::Config(tx), rx).await
    }

    pub async fn set_active_craft_list(&self, key: Option<String>) -> Result<bool, String> {
        let (tx, rx) = oneshot::channel();
        self.request(ServiceCommand::SetActiveCraftList(key, tx), rx)
            .await
    }

    /// Create a craft list and return its key
    pub async fn add_craft_list(
        &self,
        name: Option<String>,
        ephemeral: bool,
    ) -> Result<String, String> {
        let (tx, rx) = oneshot::channel();
        self.request(
            ServiceCommand::AddCraftList {
                name,
                ephemeral,
                reply: tx,
            },
            rx,
        )
        .await
    }

    pub async fn remove_list(&self, key: String) -> Result<bool, String> {
        let (tx, rx) = oneshot::channel();
        self.request(ServiceCommand::RemoveList(key, tx), rx).await
    }

    /// Snapshot of every list
    pub async fn lists(&self) -> Result<Vec<FilterConfiguration>, String> {
        let (tx, rx) = oneshot::channel();
        self.request(ServiceCommand::Lists(tx), rx).await
    }

    /// Stop the service after the final save
    pub async fn shutdown(&self) -> Result<ShutdownReport, String> {
        let (tx, rx) = oneshot::channel();
        self.request(ServiceCommand::Shutdown(tx), rx).await
    }

    async fn request<T>(
        &self,
        command: ServiceCommand,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, String> {
        self.cmd_tx.send(command).await.map_err(|e| e.to_string())?;
        rx.await.map_err(|e| e.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

pub struct ReconcilerService {
    reconciler: Reconciler,
    cmd_rx: mpsc::Receiver<ServiceCommand>,
    tick_interval: Duration,
}

impl ReconcilerService {
    pub fn new(reconciler: Reconciler, tick_interval: Duration) -> (Self, ServiceHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let service = Self {
            reconciler,
            cmd_rx,
            tick_interval,
        };
        (service, ServiceHandle { cmd_tx })
    }

    /// Run the startup sequence, then serve until a shutdown command arrives
    /// or every handle is dropped
    pub async fn run(mut self) {
        self.reconciler.start();
        self.flush();
        let mut ticker = tokio::time::interval(self.tick_interval);
        tracing::info!("Reconciler service started");

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(ServiceCommand::Shutdown(reply)) => {
                        let report = self.reconciler.shutdown(SHUTDOWN_TIMEOUT).await;
                        let _ = reply.send(report);
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        tracing::debug!("All service handles dropped");
                        self.reconciler.shutdown(SHUTDOWN_TIMEOUT).await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.reconciler.tick(Local::now().naive_local());
                }
            }
            self.flush();
        }

        self.cmd_rx.close();
        tracing::info!("Reconciler service stopped");
    }

    fn handle_command(&mut self, cmd: ServiceCommand) {
        match cmd {
            ServiceCommand::Signal(signal, reply) => {
                let outcome = self.reconciler.handle_signal(signal);
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            ServiceCommand::UpdateConfig(mut config) => {
                config.is_dirty = true;
                *self.reconciler.config_mut() = config;
                self.reconciler.on_configuration_changed();
            }
            ServiceCommand::SetActiveCraftList(key, reply) => {
                let ok = self
                    .reconciler
                    .lists_mut()
                    .set_active_craft_list(key.as_deref());
                let _ = reply.send(ok);
            }
            ServiceCommand::AddCraftList {
                name,
                ephemeral,
                reply,
            } => {
                let (lists, columns) = self.reconciler.lists_and_columns();
                let key = match (name, ephemeral) {
                    (Some(name), true) => lists.add_ephemeral_craft_list(&name, columns),
                    (None, true) => {
                        lists.add_ephemeral_craft_list(crate::lists::NEW_CRAFT_LIST_NAME, columns)
                    }
                    (name, false) => lists.add_new_craft_list(name.as_deref(), columns),
                };
                let _ = reply.send(key);
            }
            ServiceCommand::RemoveList(key, reply) => {
                let removed = self.reconciler.lists_mut().remove_list(&key).is_some();
                let _ = reply.send(removed);
            }
            ServiceCommand::Lists(reply) => {
                let _ = reply.send(self.reconciler.lists().lists().to_vec());
            }
            ServiceCommand::Config(reply) => {
                let _ = reply.send(self.reconciler.config().clone());
            }
            ServiceCommand::Shutdown(_) => {}
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.reconciler.flush() {
            tracing::warn!(error = %e, "Failed to save");
        }
    }
}
