//! Process-wide execution registry.
//!
//! Maps each language to a factory producing policy-bound executions.
//! Registration happens at startup (and from tests or plugins); reads are
//! concurrent and registration-safe behind the lock.

use crate::config::types::{JudgeError, Result};
use crate::judge::execution::{Execution, Request};
use crate::judge::policy::LanguagePolicy;
use crate::judge::Language;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

pub type ExecutionFactory = Box<dyn Fn(Request) -> Result<Execution> + Send + Sync>;

pub struct ExecutionRegistry {
    factories: RwLock<HashMap<Language, ExecutionFactory>>,
}

impl ExecutionRegistry {
    /// An empty registry. Tests that mutate registration state start here.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with every built-in language registered, materializing
    /// workspaces under `workspace_root`.
    pub fn with_defaults(workspace_root: PathBuf) -> Self {
        let registry = Self::new();
        for language in Language::ALL {
            let root = workspace_root.clone();
            let policy = LanguagePolicy::for_language(language);
            registry.register(
                language,
                Box::new(move |request| Execution::new(&root, request, policy)),
            );
        }
        registry
    }

    /// Register (or replace) the factory for a language.
    pub fn register(&self, language: Language, factory: ExecutionFactory) {
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        factories.insert(language, factory);
    }

    /// Create an execution for a request; unknown language fails without
    /// touching the filesystem.
    pub fn create(&self, request: Request) -> Result<Execution> {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let factory = factories
            .get(&request.language)
            .ok_or_else(|| JudgeError::UnknownLanguage(request.language.tag().to_string()))?;
        factory(request)
    }

    /// Registered language tags, sorted for stable output.
    pub fn languages(&self) -> Vec<Language> {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut languages: Vec<Language> = factories.keys().copied().collect();
        languages.sort_by_key(|l| l.tag());
        languages
    }
}

impl Default for ExecutionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
