use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use signa_core::source::ScriptedSource;
use signa_core::{
    AnnouncementQueue, ComposerEvent, EngineConfig, EngineStatus, FrequencyDictionary,
    PhraseCorrector, QueueConfig, SignaEngine, Speaker,
};

struct RecordingSpeaker {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl Speaker for RecordingSpeaker {
    fn speak(&mut self, text: &str) -> signa_core::error::Result<()> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn scripted_word_is_composed_spoken_and_stops_engine() {
    let config = EngineConfig::default();
    let source = ScriptedSource::spell("ciao", &config.composer, 30).expect("script");
    let corrector =
        PhraseCorrector::new(FrequencyDictionary::italian().expect("built-in vocabulary"));

    let spoken = Arc::new(Mutex::new(Vec::new()));
    let queue = AnnouncementQueue::spawn(
        RecordingSpeaker {
            spoken: Arc::clone(&spoken),
        },
        QueueConfig::default(),
    )
    .expect("queue");

    let engine = SignaEngine::new(config);
    let mut events = engine.subscribe_events();
    engine
        .start(source, corrector, queue.sender())
        .expect("engine start");

    tokio::time::timeout(Duration::from_secs(10), engine.join())
        .await
        .expect("replay should finish");
    assert_eq!(engine.status(), EngineStatus::Stopped);

    let mut letters = String::new();
    let mut finalized = None;
    while let Ok(ev) = events.try_recv() {
        match ev.event {
            ComposerEvent::LetterCommitted { letter, .. } => letters.push(letter),
            ComposerEvent::PhraseFinalized {
                phrase,
                corrected_phrase,
                corrections,
                ..
            } => finalized = Some((phrase, corrected_phrase, corrections.len())),
            _ => {}
        }
    }
    assert_eq!(letters, "CIAO");
    assert_eq!(finalized, Some(("CIAO".into(), "CIAO".into(), 0)));

    let diag = engine.diagnostics_snapshot();
    assert_eq!(diag.letters, 4);
    assert_eq!(diag.phrases, 1);
    assert_eq!(diag.resets, 0);

    assert!(queue.flush(Duration::from_secs(2)));
    assert_eq!(&*spoken.lock(), &["C", "I", "A", "O", "CIAO"]);
}

#[tokio::test]
async fn engine_can_be_restarted_after_source_ends() {
    let config = EngineConfig::default();
    let queue = AnnouncementQueue::spawn(
        RecordingSpeaker {
            spoken: Arc::new(Mutex::new(Vec::new())),
        },
        QueueConfig::default(),
    )
    .expect("queue");
    let engine = SignaEngine::new(config.clone());

    for word in ["si", "no"] {
        let source = ScriptedSource::spell(word, &config.composer, 30).expect("script");
        engine
            .start(source, PhraseCorrector::unavailable(), queue.sender())
            .expect("engine start");
        engine.join().await;
        assert_eq!(engine.status(), EngineStatus::Stopped);
        assert_eq!(engine.diagnostics_snapshot().phrases, 1);
    }
}
