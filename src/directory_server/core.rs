//! The single-writer scheduler.
//!
//! One worker task owns the [`Dit`]. Every request is a unit of work sent
//! over a bounded queue together with a oneshot reply channel, so requests
//! are executed one at a time in arrival order and no lock guards the tree.

use crate::directory_server::builder::DirectoryConfig;
use crate::dit::{Dit, Filter, SearchScope};
use crate::dn::{Dn, Rdn};
use crate::entry::{ChangeOperation, Entry};
use crate::error::{DirectoryError, DirectoryResult};
use crate::schema::Schema;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

type Unit = Box<dyn FnOnce(&mut Dit) + Send>;

enum Command {
    Run { name: &'static str, unit: Unit },
    Shutdown { ack: oneshot::Sender<()> },
}

/// Lifecycle of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Consuming the request queue
    Running,
    /// Queue closed; requests fail with `Unavailable`
    Closed,
}

/// Handle to a running directory.
///
/// Handles are cheap to clone and may be shared between tasks. Dropping the
/// last handle stops the worker once the queue is empty.
///
/// # Examples
///
/// ```rust
/// use ldap_dit::{ChangeOperation, DirectoryServer, Dit, Dn, Entry, EntryOptions, Schema};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = Arc::new(Schema::core()?);
/// let server = DirectoryServer::new(Dit::new(schema.clone()))?;
///
/// let dn = Dn::parse(&schema, "dc=dev")?;
/// server.add_entry(Entry::new(&schema, dn.clone(), EntryOptions::new("domain"))?).await?;
/// server
///     .modify_entry(&dn, vec![ChangeOperation::add("description", ["Development"])])
///     .await?;
/// assert!(server.compare(&dn, "description", "development").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DirectoryServer {
    sender: mpsc::Sender<Command>,
    schema: Arc<Schema>,
    config: DirectoryConfig,
}

impl DirectoryServer {
    /// Start a scheduler over `dit` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when called outside a Tokio runtime.
    pub fn new(dit: Dit) -> DirectoryResult<Self> {
        Self::start(dit, DirectoryConfig::default())
    }

    /// Start a scheduler with the given configuration.
    ///
    /// This is the constructor used by the builder.
    pub fn start(dit: Dit, config: DirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| DirectoryError::Configuration {
            message: format!("Directory server requires a Tokio runtime: {e}"),
        })?;
        let schema = dit.schema().clone();
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        runtime.spawn(run_worker(dit, receiver));
        log::info!(
            "Directory scheduler started (queue capacity {}, size limit {})",
            config.queue_capacity,
            config.size_limit
        );
        Ok(Self {
            sender,
            schema,
            config,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        if self.sender.is_closed() {
            SchedulerState::Closed
        } else {
            SchedulerState::Running
        }
    }

    /// Normalise DN text against the server's schema.
    ///
    /// Runs on the caller's task; the schema is immutable and needs no
    /// scheduling.
    pub fn parse_dn(&self, text: &str) -> DirectoryResult<Dn> {
        Dn::parse(&self.schema, text)
    }

    /// Run an arbitrary unit of work against the tree and wait for its result.
    ///
    /// The unit runs to completion once dequeued even if the caller stops
    /// waiting.
    ///
    /// # Errors
    ///
    /// * `Unavailable` once the scheduler has shut down
    /// * whatever the unit itself returns
    pub async fn submit<T, F>(&self, unit: F) -> DirectoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Dit) -> DirectoryResult<T> + Send + 'static,
    {
        self.run("submit", unit).await
    }

    async fn run<T, F>(&self, name: &'static str, unit: F) -> DirectoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Dit) -> DirectoryResult<T> + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let unit: Unit = Box::new(move |dit| {
            // the submitter may have stopped waiting
            let _ = reply.send(unit(dit));
        });
        self.sender
            .send(Command::Run { name, unit })
            .await
            .map_err(|_| DirectoryError::Unavailable)?;
        response
            .await
            .map_err(|_| DirectoryError::internal(format!("{name} dropped its reply channel")))?
    }

    pub async fn get_entry(&self, dn: &Dn) -> DirectoryResult<Entry> {
        let dn = dn.clone();
        self.run("get_entry", move |dit| dit.get_entry(&dn).cloned()).await
    }

    /// Insert `entry` at `dn`; see [`Dit::insert_entry`].
    pub async fn insert_entry(&self, dn: &Dn, entry: Entry) -> DirectoryResult<()> {
        let dn = dn.clone();
        self.run("insert_entry", move |dit| dit.insert_entry(&dn, entry)).await
    }

    /// Insert `entry` at its own DN.
    pub async fn add_entry(&self, entry: Entry) -> DirectoryResult<()> {
        self.run("add_entry", move |dit| {
            let dn = entry.dn().clone();
            dit.insert_entry(&dn, entry)
        })
        .await
    }

    pub async fn modify_entry(&self, dn: &Dn, changes: Vec<ChangeOperation>) -> DirectoryResult<()> {
        let dn = dn.clone();
        self.run("modify_entry", move |dit| dit.modify_entry(&dn, &changes)).await
    }

    pub async fn modify_entry_dn(
        &self,
        dn: &Dn,
        new_rdn: Rdn,
        delete_old_rdn: bool,
        new_superior: Option<Dn>,
    ) -> DirectoryResult<()> {
        let dn = dn.clone();
        self.run("modify_entry_dn", move |dit| {
            dit.modify_entry_dn(&dn, new_rdn, delete_old_rdn, new_superior.as_ref())
        })
        .await
    }

    pub async fn delete_entry(&self, dn: &Dn) -> DirectoryResult<()> {
        let dn = dn.clone();
        self.run("delete_entry", move |dit| dit.delete_entry(&dn)).await
    }

    /// Search with the configured size limit.
    pub async fn search(&self, base: &Dn, scope: SearchScope, filter: Filter) -> DirectoryResult<Vec<Entry>> {
        let base = base.clone();
        let limit = self.config.size_limit;
        self.run("search", move |dit| dit.search_limited(&base, scope, &filter, limit))
            .await
    }

    pub async fn compare(&self, dn: &Dn, attribute: &str, value: &str) -> DirectoryResult<bool> {
        let dn = dn.clone();
        let attribute = attribute.to_string();
        let value = value.to_string();
        self.run("compare", move |dit| dit.compare(&dn, &attribute, &value)).await
    }

    /// Stop accepting requests, finish everything already queued and wait
    /// for the worker to acknowledge.
    ///
    /// Calling it again after the scheduler has closed is a no-op.
    pub async fn shutdown(&self) -> DirectoryResult<()> {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Shutdown { ack }).await.is_err() {
            return Ok(());
        }
        done.await
            .map_err(|_| DirectoryError::internal("scheduler stopped without acknowledging shutdown"))
    }
}

async fn run_worker(mut dit: Dit, mut receiver: mpsc::Receiver<Command>) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Run { name, unit } => {
                log::trace!("Running {name}");
                unit(&mut dit);
            }
            Command::Shutdown { ack } => {
                receiver.close();
                let mut drained = 0usize;
                while let Some(pending) = receiver.recv().await {
                    match pending {
                        Command::Run { name, unit } => {
                            log::trace!("Running {name} while draining");
                            unit(&mut dit);
                            drained += 1;
                        }
                        Command::Shutdown { ack } => {
                            let _ = ack.send(());
                        }
                    }
                }
                log::info!("Directory scheduler closed after draining {drained} request(s)");
                let _ = ack.send(());
                return;
            }
        }
    }
    log::debug!("Directory scheduler stopped: all handles dropped");
}
