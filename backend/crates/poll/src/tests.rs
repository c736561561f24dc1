//! Unit tests for poll crate
//!
//! The store contract is checked against every backend: `MemoryStore` and a
//! `KvStore` over the in-process `FakeKv`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;

use tokio::sync::Mutex;

use crate::error::{PollError, PollResult};
use crate::infra::key_value::KeyValue;

#[derive(Default)]
struct FakeData {
    hashes: HashMap<String, HashMap<String, String>>,
    sets: HashMap<String, BTreeSet<String>>,
    lists: HashMap<String, Vec<String>>,
}

/// In-process key/value service. Every command is atomic; `fail(true)` makes
/// each later command fail like a dropped connection, and `fail_once` fails
/// only the next call of one command, before it touches any data.
#[derive(Clone, Default)]
pub(crate) struct FakeKv {
    data: Arc<Mutex<FakeData>>,
    failing: Arc<AtomicBool>,
    fail_next: Arc<StdMutex<Option<&'static str>>>,
}

impl FakeKv {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn fail_once(&self, command: &'static str) {
        *self.fail_next.lock().unwrap() = Some(command);
    }

    pub(crate) async fn hash(&self, key: &str) -> HashMap<String, String> {
        self.data
            .lock()
            .await
            .hashes
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Set members in sorted order
    pub(crate) async fn set(&self, key: &str) -> Vec<String> {
        self.data
            .lock()
            .await
            .sets
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) async fn list(&self, key: &str) -> Vec<String> {
        self.data
            .lock()
            .await
            .lists
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, command: &'static str) -> PollResult<()> {
        let mut fail_next = self.fail_next.lock().unwrap();
        if *fail_next == Some(command) {
            *fail_next = None;
            return Err(PollError::BackendUnavailable("connection reset".into()));
        }
        if self.failing.load(Ordering::SeqCst) {
            Err(PollError::BackendUnavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValue for FakeKv {
    async fn hset_multiple(&self, key: &str, fields: &[(&str, &str)]) -> PollResult<()> {
        self.check("hset_multiple")?;
        let mut data = self.data.lock().await;
        let hash = data.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> PollResult<()> {
        self.hset_multiple(key, &[(field, value)]).await
    }

    async fn hexists(&self, key: &str, field: &str) -> PollResult<bool> {
        self.check("hexists")?;
        let data = self.data.lock().await;
        Ok(data.hashes.get(key).is_some_and(|h| h.contains_key(field)))
    }

    async fn hgetall(&self, key: &str) -> PollResult<HashMap<String, String>> {
        self.check("hgetall")?;
        Ok(self.hash(key).await)
    }

    async fn sadd(&self, key: &str, member: &str) -> PollResult<bool> {
        self.check("sadd")?;
        let mut data = self.data.lock().await;
        Ok(data
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn toggle_member(&self, key: &str, member: &str) -> PollResult<bool> {
        self.check("toggle_member")?;
        let mut data = self.data.lock().await;
        let set = data.sets.entry(key.to_string()).or_default();
        if set.remove(member) {
            Ok(false)
        } else {
            Ok(set.insert(member.to_string()))
        }
    }

    async fn smembers(&self, key: &str) -> PollResult<Vec<String>> {
        self.check("smembers")?;
        Ok(self.set(key).await)
    }

    async fn lrange_all(&self, key: &str) -> PollResult<Vec<String>> {
        self.check("lrange_all")?;
        Ok(self.list(key).await)
    }

    async fn publish_once(
        &self,
        key: &str,
        guard: &str,
        fields: &[(&str, &str)],
        list_key: &str,
        item: &str,
    ) -> PollResult<bool> {
        self.check("publish_once")?;
        let mut data = self.data.lock().await;
        let hash = data.hashes.entry(key.to_string()).or_default();
        if hash.contains_key(guard) {
            return Ok(false);
        }
        for (field, value) in fields {
            hash.insert(field.to_string(), value.to_string());
        }
        data.lists
            .entry(list_key.to_string())
            .or_default()
            .push(item.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod store_contract_tests {
    use super::*;
    use crate::domain::entity::{answer::Answer, user::User};
    use crate::domain::repository::Store;
    use crate::domain::value_object::answer_id::AnswerId;
    use crate::infra::{kv::KvStore, memory::MemoryStore};

    fn alice() -> User {
        User::new("alice", "Alice")
    }

    fn bob() -> User {
        User::new("bob", "Bob")
    }

    fn carol() -> User {
        User::new("carol", "Carol")
    }

    async fn merge_pr_scenario<S: Store + Sync>(store: &S) {
        let answer = Answer::new("Will you merge this PR?", alice(), Some(bob()), false);
        store.add_answer(&alice(), &answer).await.unwrap();

        let stored = store.get_answer_by_id(answer.id()).await.unwrap();
        assert_eq!(stored.votes(), 1);
        assert!(stored.has_voted(&alice()));
        assert!(!stored.has_voted(&bob()));

        assert!(store.toggle_vote(&bob(), &stored).await.unwrap());
        assert_eq!(store.get_answer_by_id(answer.id()).await.unwrap().votes(), 2);

        assert!(!store.toggle_vote(&bob(), &stored).await.unwrap());
        let stored = store.get_answer_by_id(answer.id()).await.unwrap();
        assert_eq!(stored.votes(), 1);
        assert!(stored.has_voted(&alice()));
    }

    #[tokio::test]
    async fn test_merge_pr_scenario() {
        merge_pr_scenario(&MemoryStore::new()).await;
        merge_pr_scenario(&KvStore::new(FakeKv::new())).await;
    }

    async fn round_trip<S: Store + Sync>(store: &S) {
        let answer = Answer::new("Round trip?", alice(), Some(bob()), false);
        store.add_answer(&alice(), &answer).await.unwrap();

        let stored = store.get_answer_by_id(answer.id()).await.unwrap();
        assert_eq!(stored.id(), answer.id());
        assert_eq!(stored.content(), "Round trip?");
        assert_eq!(stored.asker(), &alice());
        assert_eq!(stored.asker().name(), "Alice");
        assert_eq!(stored.addressee(), &bob());
        assert_eq!(stored.addressee().login(), "bob");
        assert_eq!(stored.response(), "");
        assert_eq!(stored.timestamp(), answer.timestamp());
        assert!(!stored.is_anonymous());
        assert!(stored.viewer().is_none());
    }

    #[tokio::test]
    async fn test_round_trip() {
        round_trip(&MemoryStore::new()).await;
        round_trip(&KvStore::new(FakeKv::new())).await;
    }

    async fn anonymous_round_trip<S: Store + Sync>(store: &S) {
        let answer = Answer::new("Who broke CI?", alice(), Some(bob()), true);
        store.add_answer(&alice(), &answer).await.unwrap();

        let stored = store.get_answer_by_id(answer.id()).await.unwrap();
        assert!(stored.is_anonymous());
        assert_eq!(stored.asker(), &User::anonymous());
        assert!(!stored.has_voted(&alice()));
        assert_eq!(stored.votes(), 0);
        assert!(store.find_user(alice().id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_anonymous_round_trip() {
        anonymous_round_trip(&MemoryStore::new()).await;
        anonymous_round_trip(&KvStore::new(FakeKv::new())).await;
    }

    async fn missing_answer<S: Store + Sync>(store: &S) {
        let ghost = Answer::new("Never stored", alice(), None, false);
        let id = AnswerId::new("no-such-id");

        let err = store.get_answer_by_id(&id).await.unwrap_err();
        assert!(matches!(err, PollError::AnswerNotFound(ref got) if got == "no-such-id"));
        assert_eq!(err.to_string(), "No answer with id: no-such-id");

        let err = store.toggle_vote(&bob(), &ghost).await.unwrap_err();
        assert!(matches!(err, PollError::AnswerNotFound(_)));

        let err = store
            .respond(&bob(), &ghost.clone().with_response("?"))
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::AnswerNotFound(_)));

        assert!(store.list_answers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_answer() {
        missing_answer(&MemoryStore::new()).await;
        missing_answer(&KvStore::new(FakeKv::new())).await;
    }

    async fn insertion_order<S: Store + Sync>(store: &S) {
        let contents = ["first", "second", "third", "fourth"];
        for content in contents {
            let answer = Answer::new(content, alice(), None, false);
            store.add_answer(&alice(), &answer).await.unwrap();
        }

        let listed: Vec<String> = store
            .list_answers()
            .await
            .unwrap()
            .iter()
            .map(|a| a.content().to_string())
            .collect();
        assert_eq!(listed, contents);
    }

    #[tokio::test]
    async fn test_insertion_order() {
        insertion_order(&MemoryStore::new()).await;
        insertion_order(&KvStore::new(FakeKv::new())).await;
    }

    async fn re_add_merges_voters<S: Store + Sync>(store: &S) {
        let first = Answer::new("Dup", alice(), Some(bob()), false);
        store.add_answer(&alice(), &first).await.unwrap();

        let second = Answer::new("Dup", carol(), None, false).with_response("sneaky");
        store.add_answer(&carol(), &second).await.unwrap();
        // Re-asking the same question twice changes nothing more
        store.add_answer(&carol(), &second).await.unwrap();

        let listed = store.list_answers().await.unwrap();
        assert_eq!(listed.len(), 1);

        let stored = &listed[0];
        assert_eq!(stored.asker(), &alice());
        assert_eq!(stored.addressee(), &bob());
        assert_eq!(stored.response(), "");
        assert_eq!(stored.timestamp(), first.timestamp());
        assert_eq!(stored.votes(), 2);
        assert!(stored.has_voted(&carol()));
    }

    #[tokio::test]
    async fn test_re_add_merges_voters() {
        re_add_merges_voters(&MemoryStore::new()).await;
        re_add_merges_voters(&KvStore::new(FakeKv::new())).await;
    }

    async fn respond_overwrites<S: Store + Sync>(store: &S) {
        let answer = Answer::new("Ship it?", alice(), Some(bob()), false);
        store.add_answer(&alice(), &answer).await.unwrap();

        store
            .respond(&bob(), &answer.clone().with_response("Maybe"))
            .await
            .unwrap();
        // Authorization is the caller's job
        store
            .respond(&carol(), &answer.clone().with_response("Yes"))
            .await
            .unwrap();

        let stored = store.get_answer_by_id(answer.id()).await.unwrap();
        assert_eq!(stored.response(), "Yes");
        assert_eq!(stored.votes(), 1);
    }

    #[tokio::test]
    async fn test_respond_overwrites() {
        respond_overwrites(&MemoryStore::new()).await;
        respond_overwrites(&KvStore::new(FakeKv::new())).await;
    }

    async fn unidentified_voter_rejected<S: Store + Sync>(store: &S) {
        let answer = Answer::new("Ghost vote?", alice(), None, false);
        store.add_answer(&alice(), &answer).await.unwrap();

        for ghost in [User::anonymous(), User::new("", "Nobody")] {
            let err = store.toggle_vote(&ghost, &answer).await.unwrap_err();
            assert!(matches!(err, PollError::UnidentifiedVoter));
            assert_eq!(err.status_code(), 400);
        }

        assert_eq!(store.get_answer_by_id(answer.id()).await.unwrap().votes(), 1);
    }

    #[tokio::test]
    async fn test_unidentified_voter_rejected() {
        unidentified_voter_rejected(&MemoryStore::new()).await;
        unidentified_voter_rejected(&KvStore::new(FakeKv::new())).await;
    }

    async fn users_are_recorded<S: Store + Sync>(store: &S) {
        let answer = Answer::new("Who's there?", alice(), Some(bob()), false);
        store.add_answer(&alice(), &answer).await.unwrap();
        assert!(store.find_user(carol().id()).await.unwrap().is_none());

        store.toggle_vote(&carol(), &answer).await.unwrap();

        for user in [alice(), bob(), carol()] {
            let found = store.find_user(user.id()).await.unwrap().unwrap();
            assert_eq!(found.login(), user.login());
            assert_eq!(found.name(), user.name());
        }
        assert!(store.find_user(User::anonymous().id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_are_recorded() {
        users_are_recorded(&MemoryStore::new()).await;
        users_are_recorded(&KvStore::new(FakeKv::new())).await;
    }

    /// Two simultaneous toggles by `voter` must cancel out, whatever the
    /// starting state. Repeated to give interleavings a chance to show.
    async fn concurrent_same_user_toggles<S: Store + Sync + Send + 'static>(
        store: Arc<S>,
        voter: User,
    ) {
        let answer = Answer::new("Race?", alice(), None, false);
        store.add_answer(&alice(), &answer).await.unwrap();
        let was_voted = store
            .get_answer_by_id(answer.id())
            .await
            .unwrap()
            .has_voted(&voter);

        for _ in 0..25 {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let store = store.clone();
                    let answer = answer.clone();
                    let voter = voter.clone();
                    tokio::spawn(async move { store.toggle_vote(&voter, &answer).await })
                })
                .collect();

            let mut outcomes = Vec::new();
            for handle in handles {
                outcomes.push(handle.await.unwrap().unwrap());
            }
            outcomes.sort();
            assert_eq!(outcomes, vec![false, true]);

            let stored = store.get_answer_by_id(answer.id()).await.unwrap();
            assert_eq!(stored.has_voted(&voter), was_voted);
            assert_eq!(stored.votes(), 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_toggles_from_not_voted() {
        concurrent_same_user_toggles(Arc::new(MemoryStore::new()), bob()).await;
        concurrent_same_user_toggles(Arc::new(KvStore::new(FakeKv::new())), bob()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_toggles_from_voted() {
        concurrent_same_user_toggles(Arc::new(MemoryStore::new()), alice()).await;
        concurrent_same_user_toggles(Arc::new(KvStore::new(FakeKv::new())), alice()).await;
    }

    #[tokio::test]
    async fn test_backend_failures_propagate() {
        let kv = FakeKv::new();
        let store = KvStore::new(kv.clone());
        let answer = Answer::new("Is anyone there?", alice(), None, false);
        store.add_answer(&alice(), &answer).await.unwrap();

        kv.fail(true);
        let errors = [
            store.add_answer(&bob(), &Answer::new("New", bob(), None, false)).await.unwrap_err(),
            store.list_answers().await.unwrap_err(),
            store.get_answer_by_id(answer.id()).await.unwrap_err(),
            store.toggle_vote(&bob(), &answer).await.unwrap_err(),
            store.respond(&bob(), &answer).await.unwrap_err(),
            store.find_user(alice().id()).await.unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, PollError::BackendUnavailable(_)));
            assert_eq!(err.status_code(), 503);
            assert!(err.is_transient());
        }

        kv.fail(false);
        assert_eq!(store.list_answers().await.unwrap().len(), 1);
    }
}

#[cfg(test)]
mod poll_tests {
    use super::*;
    use crate::application::poll::Poll;
    use crate::domain::entity::{answer::Answer, user::User};
    use crate::infra::kv::KvStore;
    use crate::infra::roster::FileRoster;
    use crate::presentation::dto::{AddAnswerRequest, AnswerView, RespondRequest};
    use kernel::error::{app_error::AppError, kind::ErrorKind};

    #[tokio::test]
    async fn test_request_to_view_flow() {
        let roster = FileRoster::from_pairs([("alice", "Alice"), ("bob", "Bob")]);
        let poll = Poll::new(Arc::new(KvStore::new(FakeKv::new())));
        let alice = User::new("alice", "Alice");
        let bob = User::new("bob", "Bob");

        let request: AddAnswerRequest = serde_json::from_str(
            r#"{"content":"Will you merge this PR?","anonymous":false,"addressee":2}"#,
        )
        .unwrap();
        let answer = request.into_answer(alice.clone(), &roster).unwrap();
        poll.add_answer(&alice, &answer).await.unwrap();
        poll.vote_by_id(&bob, answer.id()).await.unwrap();

        let respond: RespondRequest = serde_json::from_str(r#"{"response":"Tomorrow"}"#).unwrap();
        poll.respond_by_id(&bob, answer.id(), respond.response)
            .await
            .unwrap();

        let views = AnswerView::render_all(poll.list_answers().await.unwrap(), &bob, &roster);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].asker, "Alice");
        assert_eq!(views[0].addressee, 2);
        assert_eq!(views[0].response, "Tomorrow");
        assert_eq!(views[0].votes, 2);
        assert!(views[0].upvoted);
    }

    #[tokio::test]
    async fn test_failures_convert_to_app_errors() {
        let kv = FakeKv::new();
        let poll = Poll::new(Arc::new(KvStore::new(kv.clone())));
        kv.fail(true);

        let err: AppError = poll.list_answers().await.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(err.action().is_some());

        kv.fail(false);
        let missing = Answer::new("Missing", User::new("alice", "Alice"), None, false);
        let err: AppError = poll.get_answer_by_id(missing.id()).await.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.action().is_none());
    }
}

#[cfg(test)]
mod logging_tests {
    use super::*;
    use crate::domain::entity::{answer::Answer, user::User};
    use crate::domain::repository::Store;
    use crate::infra::{kv::KvStore, memory::MemoryStore};

    #[derive(Clone, Default)]
    struct Capture(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    async fn ask_anonymously<S: Store + Sync>(store: &S) -> Answer {
        let alice = User::new("alice", "Alice");
        let answer = Answer::new("Who broke CI?", alice.clone(), None, true);
        store.add_answer(&alice, &answer).await.unwrap();
        store.list_answers().await.unwrap();
        answer
    }

    #[tokio::test]
    async fn test_anonymous_ask_does_not_log_asker() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let answer = ask_anonymously(&MemoryStore::new()).await;
        ask_anonymously(&KvStore::new(FakeKv::new())).await;

        let logs = capture.text();
        assert!(logs.contains("Answer added"));
        assert!(logs.contains(answer.id().as_str()));
        assert!(!logs.contains(User::new("alice", "Alice").id().as_str()));
        assert!(!logs.contains("alice"));
        assert!(!logs.contains("Alice"));
    }
}
