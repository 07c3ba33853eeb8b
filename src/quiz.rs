use crate::traits::{Term, TrainerError};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of terms in a catalog scoped quiz unless the caller asks otherwise.
pub const DEFAULT_QUIZ_SIZE: usize = 10;

/// Options shown for a multiple choice question, one correct plus distractors.
pub const CHOICE_COUNT: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice,
    FreeText,
}

/// One generated quiz question. Multiple choice questions carry a shuffled
/// option set with exactly one correct entry, free text questions are graded
/// with [`crate::answer::verify`].
#[derive(Debug, Clone)]
pub struct Question {
    pub term: Term,
    pub kind: QuestionKind,
    pub options: Vec<String>,
}

impl Question {
    /// Index of the correct entry in `options`, `None` for free text.
    pub fn correct_option(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.term.term)
    }
}

/// Build a quiz of `min(size, |pool|)` questions from a term pool.
///
/// Question kinds are assigned 50/50 from `rng`. A pool smaller than
/// [`CHOICE_COUNT`] cannot produce fair distractor sets, every question is
/// forced to free text in that case.
pub fn build_quiz<R: Rng>(
    pool: &[Term],
    size: usize,
    rng: &mut R,
) -> Result<Vec<Question>, TrainerError> {
    if pool.is_empty() {
        return Err(TrainerError::EmptyPool);
    }

    let mut selected: Vec<&Term> = pool.iter().collect();
    selected.shuffle(rng);
    selected.truncate(size.min(pool.len()));

    let mut questions = Vec::with_capacity(selected.len());
    for term in selected {
        let kind = if pool.len() < CHOICE_COUNT {
            QuestionKind::FreeText
        } else if rng.gen_bool(0.5) {
            QuestionKind::MultipleChoice
        } else {
            QuestionKind::FreeText
        };

        let options = match kind {
            QuestionKind::FreeText => vec![],
            QuestionKind::MultipleChoice => {
                let others: Vec<&Term> = pool.iter().filter(|t| t.id != term.id).collect();
                let mut options: Vec<String> = others
                    .choose_multiple(rng, CHOICE_COUNT - 1)
                    .map(|t| t.term.clone())
                    .collect();
                options.push(term.term.clone());
                options.shuffle(rng);
                options
            }
        };

        questions.push(Question {
            term: term.clone(),
            kind,
            options,
        });
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChapterId, TermId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(n: usize) -> Vec<Term> {
        (0..n)
            .map(|i| Term {
                id: TermId(i as u64),
                chapter: ChapterId(0),
                term: format!("term {i}"),
                definition: format!("definition {i}"),
                explanation: None,
            })
            .collect()
    }

    #[test]
    fn empty_pool_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            build_quiz(&[], 10, &mut rng),
            Err(TrainerError::EmptyPool)
        ));
    }

    #[test]
    fn quiz_size_is_capped_by_the_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = pool(6);
        assert_eq!(build_quiz(&pool, 10, &mut rng).unwrap().len(), 6);
        assert_eq!(build_quiz(&pool, 4, &mut rng).unwrap().len(), 4);
    }

    #[test]
    fn selected_terms_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let questions = build_quiz(&pool(20), 20, &mut rng).unwrap();
        let mut ids: Vec<_> = questions.iter().map(|q| q.term.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn small_pools_force_free_text() {
        let mut rng = StdRng::seed_from_u64(2);
        let questions = build_quiz(&pool(3), 3, &mut rng).unwrap();
        assert!(questions
            .iter()
            .all(|q| q.kind == QuestionKind::FreeText && q.options.is_empty()));
    }

    #[test]
    fn multiple_choice_has_one_correct_among_four_distinct_options() {
        let mut rng = StdRng::seed_from_u64(3);
        let questions = build_quiz(&pool(30), 30, &mut rng).unwrap();
        let choice_questions: Vec<_> = questions
            .iter()
            .filter(|q| q.kind == QuestionKind::MultipleChoice)
            .collect();
        // With 30 questions at 50/50 odds a seed that yields none would be
        // astronomically unlucky, the fixed seed keeps this deterministic.
        assert!(!choice_questions.is_empty());
        for q in choice_questions {
            assert_eq!(q.options.len(), CHOICE_COUNT);
            let correct = q.options.iter().filter(|o| **o == q.term.term).count();
            assert_eq!(correct, 1);
            let mut unique = q.options.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), CHOICE_COUNT);
        }
    }

    #[test]
    fn both_kinds_show_up_over_a_large_quiz() {
        let mut rng = StdRng::seed_from_u64(4);
        let questions = build_quiz(&pool(40), 40, &mut rng).unwrap();
        assert!(questions.iter().any(|q| q.kind == QuestionKind::FreeText));
        assert!(questions
            .iter()
            .any(|q| q.kind == QuestionKind::MultipleChoice));
    }
}
