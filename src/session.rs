use crate::algorithm;
use crate::traits::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

/*
One interactive review session;

    start: load progress, select terms for the queue
    loop:
        present current term
        learner rates the recall
            -> scheduler advances the progress
            -> progress is persisted
            -> failed terms are recycled to the queue tail
    until the cursor passes the end, or the learner exits early.

Elapsed time is handed to the study time sink exactly once either way.
*/

/// How the queue is selected from the term pool at session start.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Only terms the due predicate accepts right now.
    DueOnly,
    /// The whole pool, for a deliberate full review.
    ForceAll,
    /// A shuffled subset of at most `n` terms irrespective of due status.
    RandomSample(usize),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Complete,
}

/// Runs one review session over a queue of terms.
///
/// Terms rated below [`Rating::Good`] are appended to the tail of the queue
/// and come around again later in the same session, so the queue grows while
/// the learner struggles and the session only completes once every queued
/// term got a passing rating. There is deliberately no cap on recycling.
#[derive(Debug)]
pub struct StudySession {
    store: Box<dyn ProgressStore>,
    study_time: Box<dyn StudyTimeSink>,
    progress: ProgressMap,
    queue: Vec<Term>,
    cursor: usize,
    started_at: Option<SystemTime>,
    state: SessionState,
}

impl StudySession {
    pub fn new(store: Box<dyn ProgressStore>, study_time: Box<dyn StudyTimeSink>) -> Self {
        StudySession {
            store,
            study_time,
            progress: Default::default(),
            queue: vec![],
            cursor: 0,
            started_at: None,
            state: SessionState::Idle,
        }
    }

    /// Begin a session over `pool`, reading progress from the store once.
    ///
    /// An empty pool is rejected. A [`SessionMode::DueOnly`] start that finds
    /// nothing due reports [`TrainerError::NothingDue`] and stays idle so the
    /// caller can fall back to a full review or abandon.
    pub fn start<R: Rng>(
        &mut self,
        pool: &[Term],
        mode: SessionMode,
        now: SystemTime,
        rng: &mut R,
    ) -> Result<(), TrainerError> {
        if self.state == SessionState::Active {
            return Err(TrainerError::SessionActive);
        }
        if pool.is_empty() {
            return Err(TrainerError::EmptyPool);
        }

        let progress = self.store.load()?;
        let queue = match mode {
            SessionMode::DueOnly => {
                let due: Vec<Term> = pool
                    .iter()
                    .filter(|t| algorithm::is_due(progress.get(&t.id), now))
                    .cloned()
                    .collect();
                if due.is_empty() {
                    return Err(TrainerError::NothingDue);
                }
                due
            }
            SessionMode::ForceAll => pool.to_vec(),
            SessionMode::RandomSample(n) => {
                let mut sample: Vec<Term> = pool.to_vec();
                sample.shuffle(rng);
                sample.truncate(n.min(pool.len()));
                sample
            }
        };

        self.progress = progress;
        self.queue = queue;
        self.cursor = 0;
        self.started_at = Some(now);
        self.state = SessionState::Active;
        Ok(())
    }

    /// The term at the cursor, if the session is active.
    pub fn current(&self) -> Option<&Term> {
        if self.state != SessionState::Active {
            return None;
        }
        self.queue.get(self.cursor)
    }

    /// Rate the current term and advance the queue.
    ///
    /// The new progress is persisted before the cursor moves, a failing
    /// rating recycles the term to the tail of the queue first.
    pub fn rate(&mut self, rating: Rating, now: SystemTime) -> Result<(), TrainerError> {
        if self.state != SessionState::Active {
            return Err(TrainerError::SessionNotActive);
        }
        let term = self.queue[self.cursor].clone();

        let advanced = algorithm::advance(term.id, self.progress.get(&term.id), rating, now);
        self.progress.insert(term.id, advanced);
        self.store.save(&self.progress)?;

        if !rating.is_success() {
            self.queue.push(term);
        }
        self.cursor += 1;
        if self.cursor >= self.queue.len() {
            self.finish_accounting(now)?;
            self.state = SessionState::Complete;
        }
        Ok(())
    }

    /// Abandon an active session, accounting the elapsed time exactly like a
    /// natural completion would.
    pub fn exit(&mut self, now: SystemTime) -> Result<(), TrainerError> {
        if self.state != SessionState::Active {
            return Err(TrainerError::SessionNotActive);
        }
        self.finish_accounting(now)?;
        self.state = SessionState::Idle;
        self.queue.clear();
        self.cursor = 0;
        Ok(())
    }

    fn finish_accounting(&mut self, now: SystemTime) -> Result<(), TrainerError> {
        if let Some(started) = self.started_at.take() {
            let elapsed = now.duration_since(started).unwrap_or_default();
            self.study_time.add_elapsed(elapsed.as_secs())?;
        }
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of terms rated so far, including recycled appearances.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Current queue length, grows when failed terms are recycled.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Progress known for a term, for display next to the prompt.
    pub fn progress_of(&self, term: TermId) -> Option<&ProgressRecord> {
        self.progress.get(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryProgressStore, MemoryStudyLog};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Store handing out a shared map so tests can observe persisted writes.
    #[derive(Debug, Default, Clone)]
    struct SharedStore {
        inner: Rc<RefCell<ProgressMap>>,
        saves: Rc<RefCell<usize>>,
    }

    impl ProgressStore for SharedStore {
        fn load(&self) -> Result<ProgressMap, TrainerError> {
            Ok(self.inner.borrow().clone())
        }
        fn save(&mut self, progress: &ProgressMap) -> Result<(), TrainerError> {
            *self.inner.borrow_mut() = progress.clone();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    #[derive(Debug, Default, Clone)]
    struct SharedSink {
        seconds: Rc<RefCell<Vec<u64>>>,
    }

    impl StudyTimeSink for SharedSink {
        fn add_elapsed(&mut self, seconds: u64) -> Result<(), TrainerError> {
            self.seconds.borrow_mut().push(seconds);
            Ok(())
        }
    }

    fn t0() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000)
    }

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

    fn session_with(store: SharedStore, sink: SharedSink) -> StudySession {
        StudySession::new(Box::new(store), Box::new(sink))
    }

    fn plain_session() -> StudySession {
        StudySession::new(
            Box::new(MemoryProgressStore::new()),
            Box::new(MemoryStudyLog::new()),
        )
    }

    #[test]
    fn empty_pool_is_rejected() {
        let mut session = plain_session();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            session.start(&[], SessionMode::ForceAll, t0(), &mut rng),
            Err(TrainerError::EmptyPool)
        ));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn due_only_reports_nothing_due_and_stays_idle() {
        let store = SharedStore::default();
        let pool = pool(3);
        // Everything freshly rated as perfect, nothing is due for days.
        {
            let mut map = store.inner.borrow_mut();
            for t in &pool {
                map.insert(t.id, algorithm::advance(t.id, None, Rating::Perfect, t0()));
            }
        }
        let mut session = session_with(store, SharedSink::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            session.start(&pool, SessionMode::DueOnly, t0(), &mut rng),
            Err(TrainerError::NothingDue)
        ));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current().is_none());
    }

    #[test]
    fn due_only_selects_only_due_terms() {
        let store = SharedStore::default();
        let pool = pool(4);
        // Terms 0 and 1 are scheduled into the future, 2 has a lapsed
        // schedule and 3 was never studied.
        {
            let mut map = store.inner.borrow_mut();
            map.insert(
                pool[0].id,
                algorithm::advance(pool[0].id, None, Rating::Perfect, t0()),
            );
            map.insert(
                pool[1].id,
                algorithm::advance(pool[1].id, None, Rating::Good, t0()),
            );
            map.insert(
                pool[2].id,
                algorithm::advance(pool[2].id, None, Rating::Good, t0() - Duration::from_secs(86_400 * 2)),
            );
        }
        let mut session = session_with(store, SharedSink::default());
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool, SessionMode::DueOnly, t0(), &mut rng)
            .unwrap();
        assert_eq!(session.queue_len(), 2);
        assert_eq!(session.current().unwrap().id, pool[2].id);
    }

    #[test]
    fn random_sample_caps_at_the_pool_size() {
        let mut session = plain_session();
        let mut rng = StdRng::seed_from_u64(5);
        session
            .start(&pool(3), SessionMode::RandomSample(10), t0(), &mut rng)
            .unwrap();
        assert_eq!(session.queue_len(), 3);
        session.exit(t0()).unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        session
            .start(&pool(8), SessionMode::RandomSample(4), t0(), &mut rng)
            .unwrap();
        assert_eq!(session.queue_len(), 4);
    }

    #[test]
    fn passing_every_term_completes_the_session() {
        let mut session = plain_session();
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool(3), SessionMode::ForceAll, t0(), &mut rng)
            .unwrap();
        for _ in 0..3 {
            assert_eq!(session.state(), SessionState::Active);
            session.rate(Rating::Good, t0()).unwrap();
        }
        assert_eq!(session.state(), SessionState::Complete);
        assert!(session.current().is_none());
        assert!(matches!(
            session.rate(Rating::Good, t0()),
            Err(TrainerError::SessionNotActive)
        ));
    }

    #[test]
    fn failing_the_last_term_keeps_the_session_active() {
        let mut session = plain_session();
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool(1), SessionMode::ForceAll, t0(), &mut rng)
            .unwrap();
        session.rate(Rating::Again, t0()).unwrap();
        // The failed term was recycled to the tail, the queue grew.
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.queue_len(), 2);
        session.rate(Rating::Good, t0()).unwrap();
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[test]
    fn recycled_terms_come_back_in_fifo_order() {
        let pool = pool(3);
        let mut session = plain_session();
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool, SessionMode::ForceAll, t0(), &mut rng)
            .unwrap();
        // Fail terms 0 and 1, pass term 2.
        session.rate(Rating::Again, t0()).unwrap();
        session.rate(Rating::Wrong, t0()).unwrap();
        session.rate(Rating::Good, t0()).unwrap();
        // The failures come back in the order they were missed.
        assert_eq!(session.current().unwrap().id, pool[0].id);
        session.rate(Rating::Good, t0()).unwrap();
        assert_eq!(session.current().unwrap().id, pool[1].id);
        session.rate(Rating::Good, t0()).unwrap();
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[test]
    fn progress_is_persisted_after_every_rating() {
        let store = SharedStore::default();
        let pool = pool(2);
        let mut session = session_with(store.clone(), SharedSink::default());
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool, SessionMode::ForceAll, t0(), &mut rng)
            .unwrap();

        session.rate(Rating::Perfect, t0()).unwrap();
        assert_eq!(*store.saves.borrow(), 1);
        let stored = store.inner.borrow()[&pool[0].id];
        assert_eq!(stored.repetition, 1);
        assert_eq!(stored.interval, 4);

        session.rate(Rating::Again, t0()).unwrap();
        assert_eq!(*store.saves.borrow(), 2);
        assert_eq!(store.inner.borrow()[&pool[1].id].interval, 1);
    }

    #[test]
    fn natural_completion_accounts_study_time_once() {
        let sink = SharedSink::default();
        let mut session = session_with(SharedStore::default(), sink.clone());
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool(2), SessionMode::ForceAll, t0(), &mut rng)
            .unwrap();
        session.rate(Rating::Good, t0() + Duration::from_secs(30)).unwrap();
        session.rate(Rating::Good, t0() + Duration::from_secs(90)).unwrap();
        assert_eq!(*sink.seconds.borrow(), vec![90]);
    }

    #[test]
    fn exit_accounts_study_time_and_returns_to_idle() {
        let sink = SharedSink::default();
        let mut session = session_with(SharedStore::default(), sink.clone());
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool(5), SessionMode::ForceAll, t0(), &mut rng)
            .unwrap();
        session.rate(Rating::Good, t0() + Duration::from_secs(10)).unwrap();
        session.exit(t0() + Duration::from_secs(45)).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(*sink.seconds.borrow(), vec![45]);
        // Exit is only valid while a session is running.
        assert!(matches!(
            session.exit(t0()),
            Err(TrainerError::SessionNotActive)
        ));
    }

    #[test]
    fn starting_twice_is_rejected() {
        let mut session = plain_session();
        let mut rng = StdRng::seed_from_u64(1);
        session
            .start(&pool(2), SessionMode::ForceAll, t0(), &mut rng)
            .unwrap();
        assert!(matches!(
            session.start(&pool(2), SessionMode::ForceAll, t0(), &mut rng),
            Err(TrainerError::SessionActive)
        ));
    }
}
