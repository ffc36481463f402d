//! Scripted in-memory sessions for tests.
//!
//! A [`ScriptedProvider`] answers statements from a queue of canned results
//! and records every session it hands out: its access mode, the statements
//! it saw, and how it was released.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use graphgate_core::{AccessMode, Record};

use crate::client::GraphError;
use crate::queries::Statement;
use crate::session::{GraphSession, SessionProvider};

/// What happened to one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLog {
    pub mode: AccessMode,
    pub statements: Vec<String>,
    /// One entry per `release` call, holding the `success` flag.
    pub releases: Vec<bool>,
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<Vec<Record>, String>>,
    sessions: Vec<SessionLog>,
    refuse_sessions: bool,
    latency: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the records returned by the next statement.
    pub fn respond(&self, records: Vec<Record>) -> &Self {
        self.lock().responses.push_back(Ok(records));
        self
    }

    /// Queue a failure for the next statement.
    pub fn fail(&self, message: &str) -> &Self {
        self.lock().responses.push_back(Err(message.to_string()));
        self
    }

    /// Make every later `open` fail, as if the store were unreachable.
    pub fn refuse_sessions(&self) {
        self.lock().refuse_sessions = true;
    }

    /// Make every statement take `latency` before it answers.
    pub fn slow_down(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    pub fn sessions(&self) -> Vec<SessionLog> {
        self.lock().sessions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionProvider for ScriptedProvider {
    type Session = ScriptedSession;

    async fn open(&self, mode: AccessMode) -> Result<ScriptedSession, GraphError> {
        let mut script = self.lock();
        if script.refuse_sessions {
            return Err(GraphError::Connection("connection refused".to_string()));
        }
        script.sessions.push(SessionLog {
            mode,
            statements: Vec::new(),
            releases: Vec::new(),
        });
        Ok(ScriptedSession {
            provider: self.clone(),
            index: script.sessions.len() - 1,
            mode,
        })
    }
}

pub struct ScriptedSession {
    provider: ScriptedProvider,
    index: usize,
    mode: AccessMode,
}

impl ScriptedSession {
    /// Statement texts this session executed, in order.
    pub fn statements(&self) -> Vec<String> {
        self.provider.lock().sessions[self.index].statements.clone()
    }
}

#[async_trait]
impl GraphSession for ScriptedSession {
    fn access_mode(&self) -> AccessMode {
        self.mode
    }

    async fn execute(&mut self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        let latency = {
            let mut script = self.provider.lock();
            script.sessions[self.index]
                .statements
                .push(statement.text().to_string());
            script.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match self.provider.lock().responses.pop_front() {
            Some(Ok(records)) => Ok(records),
            Some(Err(message)) => Err(GraphError::Connection(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn release(self, success: bool) -> Result<(), GraphError> {
        self.provider.lock().sessions[self.index]
            .releases
            .push(success);
        Ok(())
    }
}
