#![forbid(unsafe_code)]

mod backend;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use backend::Backend;
use clap::{Parser, Subcommand};
use todo_core::{FileStore, FilterMode, SortKey, TitlePolicy, TodoId, DEFAULT_MAX_TITLE_LEN};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "todo: a small todo list, kept locally or on a todo server")]
struct Cli {
    /// Base URL of a todo server; the list is kept locally when unset.
    #[arg(long, env = "TODO_REMOTE", global = true)]
    remote: Option<String>,

    /// Directory holding the local list.
    #[arg(long, env = "TODO_DATA_DIR", default_value = ".todos", global = true)]
    data_dir: PathBuf,

    /// Longest accepted title in characters; 0 disables the limit.
    #[arg(long, default_value_t = DEFAULT_MAX_TITLE_LEN, global = true)]
    max_title_len: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List todos.
    List {
        #[arg(long, default_value = "all")]
        filter: FilterMode,
        #[arg(long)]
        sort: Option<SortKey>,
        /// Only titles containing this text, ignoring case.
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a todo.
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Flip a todo between active and completed.
    Toggle { id: TodoId },
    /// Remove a todo.
    Rm { id: TodoId },
    /// Remove every completed todo.
    ClearCompleted,
}

impl Cli {
    fn policy(&self) -> TitlePolicy {
        TitlePolicy::with_limit(self.max_title_len)
    }

    fn open(&self) -> anyhow::Result<Backend> {
        match &self.remote {
            Some(url) => Backend::remote(url, self.policy())
                .with_context(|| format!("connecting to {url}")),
            None => Ok(Backend::local(
                FileStore::new(&self.data_dir),
                self.policy(),
            )),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut backend = cli.open()?;
    match cli.command {
        Command::List {
            filter,
            sort,
            search,
        } => {
            let todos = backend.todos();
            let mut view = todos.filter(filter);
            if let Some(query) = &search {
                view = view.search(query);
            }
            if let Some(key) = sort {
                view = view.sort(key);
            }
            let mut out = std::io::stdout().lock();
            render::write_list(&mut out, view, todos.active_count())
                .context("writing list")?;
        }
        Command::Add { title } => {
            let id = backend.add(&title.join(" "))?;
            println!("added {id}");
        }
        Command::Toggle { id } => {
            backend.toggle(id)?;
            if let Some(item) = backend.todos().get(id) {
                println!("{}", render::item_line(item));
            }
        }
        Command::Rm { id } => {
            backend.remove(id)?;
            println!("removed {id}");
        }
        Command::ClearCompleted => {
            let cleared = backend.clear_completed()?;
            println!("cleared {cleared}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
