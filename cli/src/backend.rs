//! Where the CLI's todo list lives: a local directory or a remote service.

use anyhow::{bail, Result};
use todo_core::{
    FileStore, HttpTodoService, PersistedTodos, SyncedTodos, TitlePolicy, TodoCollection, TodoId,
    UreqTransport,
};

pub enum Backend {
    Local(PersistedTodos<FileStore>),
    Remote {
        todos: SyncedTodos,
        service: HttpTodoService<UreqTransport>,
    },
}

impl Backend {
    pub fn local(store: FileStore, policy: TitlePolicy) -> Self {
        tracing::debug!(dir = %store.dir().display(), "using local store");
        Backend::Local(PersistedTodos::open(store, policy))
    }

    /// Connect and fetch the current list.
    pub fn remote(base_url: &str, policy: TitlePolicy) -> Result<Self> {
        tracing::debug!(base_url, "using remote service");
        let service = HttpTodoService::new(base_url, UreqTransport::new());
        let mut todos = SyncedTodos::new(policy);
        if !todos.load(&service) {
            bail!(sync_error(&todos));
        }
        Ok(Backend::Remote { todos, service })
    }

    pub fn todos(&self) -> &TodoCollection {
        match self {
            Backend::Local(todos) => todos.todos(),
            Backend::Remote { todos, .. } => todos.todos(),
        }
    }

    /// Returns the id of the added item.
    pub fn add(&mut self, title: &str) -> Result<TodoId> {
        let policy = self.policy();
        if let Err(e) = policy.validate(title) {
            bail!("{e}");
        }
        match self {
            Backend::Local(todos) => match todos.add(title) {
                Some(item) => Ok(item.id),
                None => bail!("todo was not added"),
            },
            Backend::Remote { todos, service } => {
                if !todos.create(&*service, title) {
                    bail!(sync_error(todos));
                }
                todos
                    .todos()
                    .items()
                    .last()
                    .map(|item| item.id)
                    .ok_or_else(|| anyhow::anyhow!("todo was not added"))
            }
        }
    }

    pub fn toggle(&mut self, id: TodoId) -> Result<()> {
        self.require(id)?;
        let ok = match self {
            Backend::Local(todos) => todos.toggle(id),
            Backend::Remote { todos, service } => todos.toggle(&*service, id),
        };
        self.check(ok)
    }

    pub fn remove(&mut self, id: TodoId) -> Result<()> {
        self.require(id)?;
        let ok = match self {
            Backend::Local(todos) => todos.remove(id),
            Backend::Remote { todos, service } => todos.remove(&*service, id),
        };
        self.check(ok)
    }

    /// Returns how many items were cleared.
    pub fn clear_completed(&mut self) -> Result<usize> {
        match self {
            Backend::Local(todos) => Ok(todos.clear_completed()),
            Backend::Remote { todos, service } => {
                let cleared = todos.clear_completed(&*service);
                // failed deletes are gone locally but still on the server
                if let Some(error) = todos.error() {
                    bail!("{error}");
                }
                Ok(cleared)
            }
        }
    }

    fn policy(&self) -> TitlePolicy {
        match self {
            Backend::Local(todos) => *todos.policy(),
            Backend::Remote { todos, .. } => *todos.policy(),
        }
    }

    fn require(&self, id: TodoId) -> Result<()> {
        if !self.todos().contains(id) {
            bail!("no todo with id {id}");
        }
        Ok(())
    }

    fn check(&self, ok: bool) -> Result<()> {
        match self {
            Backend::Remote { todos, .. } if !ok => bail!(sync_error(todos)),
            _ if !ok => bail!("nothing changed"),
            _ => Ok(()),
        }
    }
}

fn sync_error(todos: &SyncedTodos) -> String {
    todos
        .error()
        .unwrap_or("remote service call failed")
        .to_string()
}
