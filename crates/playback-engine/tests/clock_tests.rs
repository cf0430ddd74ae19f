// FILE: crates/playback-engine/tests/clock_tests.rs

//! Real-time behaviour of the threaded clock under the engine

use std::time::{Duration, Instant};
use storyreel_core::{MediaRef, Slide, Story, StoryCatalog};
use storyreel_engine::{
    EngineSettings, NullMediaBackend, PlaybackPosition, SimulatedMediaBackend, StoryEngine,
    ThreadClock,
};

fn fast_settings() -> EngineSettings {
    EngineSettings {
        image_tick: Duration::from_millis(10),
        video_poll: Duration::from_millis(10),
        autoplay: true,
    }
}

fn catalog(slides: Vec<Vec<Slide>>) -> StoryCatalog {
    StoryCatalog::new(
        slides
            .into_iter()
            .map(|s| Story::new(s).unwrap())
            .collect(),
    )
    .unwrap()
}

fn image(name: &str, secs: f64) -> Slide {
    Slide::image(MediaRef::new(name).unwrap(), secs)
}

#[test]
fn test_thread_clock_drives_auto_advance() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = StoryEngine::with_settings(
        catalog(vec![vec![image("a.jpg", 0.05), image("b.jpg", 60.0)]]),
        fast_settings(),
        ThreadClock::new(),
        NullMediaBackend,
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while engine.current_slide_index() == 0 && Instant::now() < deadline {
        engine.process_for(Duration::from_millis(50));
    }

    assert_eq!(engine.state().position(), PlaybackPosition::new(0, 1));
}

#[test]
fn test_paused_engine_receives_no_ticks() {
    let mut engine = StoryEngine::with_settings(
        catalog(vec![vec![image("a.jpg", 60.0)]]),
        fast_settings(),
        ThreadClock::new(),
        NullMediaBackend,
    );
    engine.process_for(Duration::from_millis(50));
    engine.pause().unwrap();
    engine.process_pending();

    let events = engine.events();
    std::thread::sleep(Duration::from_millis(60));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_simulated_video_resolves_and_advances() {
    let mut engine = StoryEngine::with_settings(
        catalog(vec![vec![
            Slide::video(MediaRef::new("clip.mp4").unwrap()),
            image("b.jpg", 60.0),
        ]]),
        fast_settings(),
        ThreadClock::new(),
        SimulatedMediaBackend::new(0.1),
    );

    engine.process_pending();
    assert_eq!(engine.state().duration(), Some(0.1));

    let deadline = Instant::now() + Duration::from_secs(5);
    while engine.current_slide_index() == 0 && Instant::now() < deadline {
        engine.process_for(Duration::from_millis(50));
    }
    assert_eq!(engine.current_slide_index(), 1);
}
