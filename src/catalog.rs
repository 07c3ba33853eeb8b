use crate::traits::{ChapterId, Term, TermId, TrainerError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A chapter groups related terms for catalog scoped sessions and quizzes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
}

/// Representation on disk. Very much intended to be machine readable only.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TermCatalogStorage {
    name: String,
    chapters: Vec<Chapter>,
    terms: Vec<Term>,
}

/// The read-only term catalog the trainer studies from.
#[derive(Debug, Default, Clone)]
pub struct TermCatalog {
    name: String,
    chapters: HashMap<ChapterId, Chapter>,
    terms: Vec<Term>,
}

impl TermCatalog {
    /// Build a catalog, rejecting terms that refer to an unknown chapter.
    pub fn new(name: &str, chapters: &[Chapter], terms: &[Term]) -> Result<Self, TrainerError> {
        let chapters: HashMap<ChapterId, Chapter> =
            chapters.iter().map(|c| (c.id, c.clone())).collect();
        for term in terms {
            if !chapters.contains_key(&term.chapter) {
                return Err(TrainerError::UnknownChapter {
                    term: term.id,
                    chapter: term.chapter,
                });
            }
        }
        Ok(TermCatalog {
            name: name.to_owned(),
            chapters,
            terms: terms.to_vec(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All terms across all chapters.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn term(&self, id: TermId) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    /// The terms of one chapter, in catalog order.
    pub fn chapter_terms(&self, chapter: ChapterId) -> Vec<&Term> {
        self.terms.iter().filter(|t| t.chapter == chapter).collect()
    }

    /// Chapters sorted by id for stable presentation.
    pub fn chapters(&self) -> Vec<&Chapter> {
        let mut chapters: Vec<&Chapter> = self.chapters.values().collect();
        chapters.sort_by_key(|c| c.id);
        chapters
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.get(&id)
    }
}

/// Load a term catalog from a yaml file.
pub fn load_term_catalog(filename: &str) -> Result<TermCatalog, TrainerError> {
    if !(filename.ends_with("yaml") || filename.ends_with("yml")) {
        return Err(TrainerError::UnsupportedFile(filename.to_owned()));
    }
    let file = std::fs::File::open(filename)?;
    let yaml: serde_yaml::Value = serde_yaml::from_reader(file)?;
    let storage: TermCatalogStorage = serde_yaml::from_value(yaml)?;
    TermCatalog::new(&storage.name, &storage.chapters, &storage.terms)
}

/// Write a term catalog to a yaml file, chapters and terms sorted by id.
pub fn save_term_catalog(filename: &str, catalog: &TermCatalog) -> Result<(), TrainerError> {
    let mut storage = TermCatalogStorage {
        name: catalog.name.clone(),
        ..Default::default()
    };
    let mut chapters: Vec<Chapter> = catalog.chapters.values().cloned().collect();
    chapters.sort_by_key(|c| c.id);
    storage.chapters = chapters;
    storage.terms = catalog.terms.clone();
    storage.terms.sort_by_key(|t| t.id);

    use std::fs::OpenOptions;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(filename)?;
    serde_yaml::to_writer(file, &storage)?;
    Ok(())
}
