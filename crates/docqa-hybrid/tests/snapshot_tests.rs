mod common;

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use common::{corpus, ids, topic_vector, SubstringModel, TopicEmbedder, PETS};
use docqa_core::config::Bm25Config;
use docqa_core::traits::{Embedder, RelevanceModel};
use docqa_hybrid::{HybridRetriever, RetrieverState};

type Gate = Mutex<Option<(Sender<()>, Receiver<()>)>>;

/// Blocks the first call until released, reporting when it is parked.
fn wait_at(gate: &Gate) {
    let taken = gate.lock().unwrap().take();
    if let Some((entered, release)) = taken {
        entered.send(()).unwrap();
        release.recv().unwrap();
    }
}

struct GatedEmbedder {
    gate: Gate,
}

impl Embedder for GatedEmbedder {
    fn dim(&self) -> usize { 3 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        wait_at(&self.gate);
        Ok(texts.iter().map(|t| topic_vector(t)).collect())
    }
}

struct GatedModel {
    gate: Gate,
    inner: SubstringModel,
}

impl RelevanceModel for GatedModel {
    fn predict(&self, pairs: &[(&str, &str)]) -> anyhow::Result<Vec<f32>> {
        wait_at(&self.gate);
        self.inner.predict(pairs)
    }
}

fn roomy_thread_pool() {
    // A parked build occupies one worker; the other build needs a free one.
    let _ = rayon::ThreadPoolBuilder::new().num_threads(4).build_global();
}

#[test]
fn stale_build_is_discarded_when_a_newer_one_finishes_first() {
    roomy_thread_pool();
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let embedder = Arc::new(GatedEmbedder { gate: Mutex::new(Some((entered_tx, release_rx))) });
    let retriever = Arc::new(HybridRetriever::new(embedder, Arc::new(SubstringModel::new()), Bm25Config::default()));

    let slow = {
        let r = Arc::clone(&retriever);
        thread::spawn(move || r.build(corpus(&["An outdated cat document."])))
    };
    entered_rx.recv().unwrap();
    let fresh = retriever.build(corpus(&PETS)).expect("fresh build");
    release_tx.send(()).unwrap();
    let stale = slow.join().unwrap().expect("stale build");

    assert_eq!((fresh.generation, fresh.published), (2, true));
    assert_eq!((stale.generation, stale.published), (1, false));
    assert_eq!(retriever.state(), RetrieverState::Ready { generation: 2, chunks: 3 });
    assert_eq!(ids(&retriever.retrieve("cat", 2).unwrap()), vec![0, 2]);
}

#[test]
fn in_flight_query_finishes_on_the_snapshot_it_started_with() {
    roomy_thread_pool();
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let model = Arc::new(GatedModel { gate: Mutex::new(Some((entered_tx, release_rx))), inner: SubstringModel::new() });
    let retriever = Arc::new(HybridRetriever::new(Arc::new(TopicEmbedder::new()), model, Bm25Config::default()));
    retriever.build(corpus(&["The old cat.", "An old dog."])).expect("first build");

    let query = {
        let r = Arc::clone(&retriever);
        thread::spawn(move || r.retrieve("cat", 1))
    };
    entered_rx.recv().unwrap();
    retriever.build(corpus(&["A new dog.", "A new cat.", "Another cat."])).expect("second build");
    release_tx.send(()).unwrap();

    let in_flight = query.join().unwrap().expect("query");
    assert_eq!(in_flight.len(), 1);
    assert_eq!(in_flight[0].text, "The old cat.");

    let fresh = retriever.retrieve("cat", 1).expect("query");
    assert_eq!(fresh[0].text, "A new cat.");
}
