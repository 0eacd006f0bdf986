//! In-process TF-IDF index over policy passages.
//!
//! Deterministic and always available. Scores are cosine similarities in
//! `[0, 1]` between TF-IDF weighted term vectors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use ess_core::config::DocumentConfig;
use ess_core::errors::DocumentIndexError;
use ess_core::models::DocumentHit;
use ess_core::traits::IDocumentIndex;

const STOPWORDS: &[&str] = &[
    "about", "an", "and", "any", "are", "as", "at", "be", "by", "can", "do", "does", "for",
    "from", "how", "in", "is", "it", "me", "my", "of", "on", "or", "that", "the", "there", "this",
    "to", "we", "what", "when", "with", "you", "your",
];

/// A policy document as loaded from the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub source: String,
    pub text: String,
}

/// Split text into chunks of at most `size` characters (a single longer word
/// is kept whole), each starting with up to `overlap` characters of the
/// previous chunk's tail. Chunks break on whitespace.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let size = size.max(1);
    let overlap = overlap.min(size / 2);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let mut end = start;
        let mut len = 0;
        while end < words.len() {
            let add = words[end].len() + usize::from(end > start);
            if end > start && len + add > size {
                break;
            }
            len += add;
            end += 1;
        }
        chunks.push(words[start..end].join(" "));
        if end >= words.len() {
            break;
        }

        let mut next = end;
        let mut carried = 0;
        while next > start + 1 {
            let add = words[next - 1].len() + 1;
            if carried + add > overlap {
                break;
            }
            carried += add;
            next -= 1;
        }
        start = next;
    }
    chunks
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| s.len() >= 2)
        .map(|s| s.to_lowercase())
        .filter(|s| !STOPWORDS.contains(&s.as_str()))
        .collect()
}

fn term_counts(text: &str) -> HashMap<String, f32> {
    let mut counts = HashMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0.0) += 1.0;
    }
    counts
}

#[derive(Debug, Clone)]
struct Chunk {
    content: String,
    source: String,
    terms: HashMap<String, f32>,
}

/// TF-IDF keyword index.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    chunks: Vec<Chunk>,
    doc_freq: HashMap<String, usize>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl KeywordIndex {
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            chunks: Vec::new(),
            doc_freq: HashMap::new(),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Build from a JSON array of `{ "source", "text" }` objects.
    pub fn from_json(json: &str, config: &DocumentConfig) -> Result<Self, DocumentIndexError> {
        let documents: Vec<PolicyDocument> =
            serde_json::from_str(json).map_err(|e| DocumentIndexError::Unavailable {
                reason: format!("invalid policy corpus: {e}"),
            })?;
        let mut index = Self::new(config);
        for doc in &documents {
            index.add_document(doc);
        }
        tracing::info!(
            documents = documents.len(),
            chunks = index.len(),
            "policy index built"
        );
        Ok(index)
    }

    /// Chunk and index one document.
    pub fn add_document(&mut self, document: &PolicyDocument) {
        for content in chunk_text(&document.text, self.chunk_size, self.chunk_overlap) {
            let terms = term_counts(&content);
            for term in terms.keys() {
                *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            self.chunks.push(Chunk {
                content,
                source: document.source.clone(),
                terms,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.chunks.len() as f32;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    fn weights(&self, counts: &HashMap<String, f32>) -> HashMap<String, f32> {
        counts
            .iter()
            .map(|(term, tf)| (term.clone(), tf * self.idf(term)))
            .collect()
    }

    fn cosine(a: &HashMap<String, f32>, b: &HashMap<String, f32>) -> f32 {
        let dot: f32 = a
            .iter()
            .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
            .sum();
        let norm_a = a.values().map(|w| w * w).sum::<f32>().sqrt();
        let norm_b = b.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
            return 0.0;
        }
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

impl IDocumentIndex for KeywordIndex {
    fn search(&self, phrase: &str, k: usize) -> Result<Vec<DocumentHit>, DocumentIndexError> {
        let query = self.weights(&term_counts(phrase));
        if query.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| (i, Self::cosine(&query, &self.weights(&chunk.terms))))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(i, score)| {
                let chunk = &self.chunks[i];
                DocumentHit::new(chunk.content.clone(), score).with_source(chunk.source.clone())
            })
            .collect())
    }

    fn name(&self) -> &str {
        "keyword-tfidf"
    }
}
