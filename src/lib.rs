pub mod util;
pub mod script;
pub mod config;
pub mod events;
pub mod actions;

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use crate::config::{Config, ConfigError, EventSource};
use crate::events::device::{self, DeviceError};
use crate::events::{EventReader, KeyState};
use crate::script::ast::Node;
use crate::script::environment::{Environment, FunctionEnvironment};
use crate::script::evaluator::EvalError;
use crate::script::lexer::{LexerError, Tokenizer};
use crate::script::LoadError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{path}: {source}")]
    Lexer {
        path: String,
        #[source]
        source: LexerError,
    },
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("startup evaluation failed: {0}")]
    Startup(#[source] EvalError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Holds the parsed rules together with the state they run against.
pub struct Engine {
    rules: Node,
    env: Environment,
    fenv: FunctionEnvironment,
}

impl Engine {
    pub fn new(rules: Node, fenv: FunctionEnvironment) -> Engine {
        Engine { rules, env: Environment::new(), fenv }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Runs the rules once with `action = "initialize"`.
    pub fn initialize(&mut self) -> std::result::Result<(), EvalError> {
        self.env.set("action", "initialize");
        self.rules.eval(&mut self.env, &self.fenv).map(|_| ())
    }

    /// Runs the rules for one key event. Variables set by earlier runs stay visible.
    pub fn handle_event(&mut self, key: &str, state: KeyState) -> std::result::Result<(), EvalError> {
        self.env.set("action", "event");
        self.env.set("key", key);
        self.env.set("state", state.as_str());

        debug!("Running event {}: {}", key, state);
        self.rules.eval(&mut self.env, &self.fenv)?;
        debug!("Event ran");

        Ok(())
    }

    /// Feeds every event from `events` through the rules. A failing event is
    /// logged and skipped; only reading errors end the loop.
    pub fn run_events<I>(&mut self, events: I) -> Result<()>
        where I: IntoIterator<Item = std::io::Result<(String, KeyState)>> {
        for event in events {
            let (key, state) = event?;

            if let Err(err) = self.handle_event(&key, state) {
                error!("Rules failed for {} {}: {}", key, state, err);
            }
        }

        Ok(())
    }
}

pub fn run(config: &Config) -> Result<()> {
    let rules = script::load(&config.rules)?;
    let fenv = actions::functions(config)?;

    let mut engine = Engine::new(rules, fenv);
    engine.initialize().map_err(Error::Startup)?;
    info!("Rules loaded from {}", config.rules.display());

    match config.event_source() {
        EventSource::Device(path) => engine.run_events(device::open(path, config.exclusive)?),
        EventSource::DeviceMatch(pattern) => engine.run_events(device::find(pattern, config.exclusive)?),
        EventSource::File(path) => {
            let file = std::fs::File::open(path)?;
            engine.run_events(EventReader::new(std::io::BufReader::new(file)))
        },
        EventSource::Stdin => engine.run_events(EventReader::new(std::io::stdin().lock())),
    }
}

/// Input devices available to `device` / `device_match`, as `(path, name)`.
pub fn list_devices() -> Vec<(PathBuf, String)> {
    device::list()
}

/// Parses the rules file and renders its tree.
pub fn check(path: &Path) -> Result<String> {
    Ok(script::load(path)?.dump())
}

/// Tokenizes the rules file.
pub fn tokens(path: &Path) -> Result<Vec<String>> {
    let mut tokenizer = Tokenizer::from_path(path)?;

    let tokens = tokenizer.tokens()
        .map_err(|source| Error::Lexer { path: path.to_string_lossy().into_owned(), source })?;

    Ok(tokens.iter().map(|token| token.source().to_owned()).collect())
}
