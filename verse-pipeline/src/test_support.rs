//! In-memory fakes for the generator and index seams.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use ai_llm_service::GenerateOptions;
use verse_store::{PassageHit, PassageMetadata, Speaker};

use crate::backend::{BoxFuture, PassageIndex, TextGenerator};
use crate::error::BackendError;

pub(crate) fn hit(verse_id: &str, variant_index: u32) -> PassageHit {
    hit_with_text(verse_id, variant_index, &format!("{verse_id} variant {variant_index}"))
}

pub(crate) fn hit_with_text(verse_id: &str, variant_index: u32, text: &str) -> PassageHit {
    PassageHit {
        text: text.to_string(),
        metadata: PassageMetadata {
            verse_id: verse_id.to_string(),
            variant_index,
            speaker: Speaker::Krishna,
            sanskrit_text: format!("sanskrit {verse_id}"),
        },
        score: 0.5,
    }
}

/// Replies with the scripted responses in order; errors once exhausted.
pub(crate) struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(String, GenerateOptions)>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, GenerateOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        opts: GenerateOptions,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        self.calls.lock().unwrap().push((prompt.to_string(), opts));
        let next = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(e)) => Err(BackendError::Other(e)),
                None => Err(BackendError::Other("script exhausted".into())),
            }
        })
    }
}

/// Query → fixed hits; unknown queries return nothing.
#[derive(Default)]
pub(crate) struct MapIndex {
    hits: HashMap<String, Vec<PassageHit>>,
    failing: Option<String>,
    seen: Mutex<Vec<String>>,
}

impl MapIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, query: &str, hits: Vec<PassageHit>) -> Self {
        self.hits.insert(query.to_string(), hits);
        self
    }

    pub(crate) fn failing_on(mut self, query: &str) -> Self {
        self.failing = Some(query.to_string());
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl PassageIndex for MapIndex {
    fn search<'a>(
        &'a self,
        query: &'a str,
        k: u64,
    ) -> BoxFuture<'a, Result<Vec<PassageHit>, BackendError>> {
        self.seen.lock().unwrap().push(query.to_string());
        Box::pin(async move {
            if self.failing.as_deref() == Some(query) {
                return Err(BackendError::Other("index offline".into()));
            }
            let mut hits = self.hits.get(query).cloned().unwrap_or_default();
            hits.truncate(k as usize);
            Ok(hits)
        })
    }
}
