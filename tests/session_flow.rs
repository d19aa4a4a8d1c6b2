//! End-to-end walk through all four stages with the offline backend.

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;

use strongroom::audio::{AudioEngine, AudioState, HapticSink, NullBackend, OfflineBackend};
use strongroom::media::TimedClip;
use strongroom::params::{ExperienceConfig, MusicSourceConfig};
use strongroom::session::Session;
use strongroom::stage::{DoorPhase, StageId};
use strongroom::timeline::Millis;

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Vec<u32>>>>);

impl HapticSink for Recorder {
    fn vibrate(&mut self, pattern_ms: &[u32]) {
        self.0.lock().push(pattern_ms.to_vec());
    }
}

fn write_loop(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..800 {
        let t = i as f32 / 8_000.0;
        let s = (t * 220.0 * std::f32::consts::TAU).sin() * 0.5;
        writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn config_with_music(path: &Path) -> ExperienceConfig {
    let mut config = ExperienceConfig::default();
    config.audio.music = MusicSourceConfig::WavFile(path.to_path_buf());
    config
}

/// Solve the three challenges starting at `now`; returns when step 4 is current
fn solve_challenges(session: &mut Session, mut now: Millis) -> Millis {
    for _ in 0..3 {
        session.enter_code("23", now);
        now += 500;
        session.tick(now);
    }
    now
}

#[test]
fn test_full_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let music = dir.path().join("loop.wav");
    write_loop(&music);

    let recorder = Recorder::default();
    let config = config_with_music(&music);
    let audio = AudioEngine::new(
        Box::new(OfflineBackend::new(8_000)),
        Box::new(recorder.clone()),
        config.audio.clone(),
    );
    let mut session = Session::new(config, audio, Box::new(TimedClip::new(1000)), 5);

    session.pointer_down();
    assert_eq!(session.audio().state(), AudioState::Ready);

    // A wrong answer flags the step and leaves it current
    session.enter_code("22", 0);
    assert!(session.entry_lock().has_error(1));
    assert_eq!(session.entry_lock().step(), 1);

    let now = solve_challenges(&mut session, 100);
    assert_eq!(now, 1600);
    assert_eq!(session.entry_lock().step(), 4);
    assert_eq!(session.entry_lock().dial_rotation_deg(), 360.0);

    session.enter_code("232323", 1600);
    assert!(session.entry_lock().is_unlocked());
    session.tick(2899);
    assert_eq!(session.orchestrator().exiting(), None);

    // Unlock tone and slam, then the cross-fade
    session.tick(2900);
    assert_eq!(session.orchestrator().exiting(), Some(StageId::EntryLock));
    session.tick(3100);
    assert_eq!(session.orchestrator().active(), StageId::Voucher);

    session.proceed(3100);
    session.tick(3300);
    assert_eq!(session.orchestrator().active(), StageId::MediaReveal);
    assert!(!session.media().clip_paused());

    session.tick(4300);
    assert!(session.media().tag_dropped());
    session.click_tag(4400);
    session.tick(4600);
    assert_eq!(session.orchestrator().active(), StageId::FinalReveal);
    assert!(session.orchestrator().is_finished());

    session.tick(7899);
    assert_eq!(session.final_reveal().phase(), DoorPhase::Opening);
    assert!(!session.final_reveal().panel_visible());
    session.tick(7900);
    assert_eq!(session.final_reveal().phase(), DoorPhase::Revealed);
    assert!(session.final_reveal().panel_visible());

    // Repeated cheers extend the toast
    session.cheers(8000, Vec2::new(200.0, 400.0));
    session.cheers(8100, Vec2::new(100.0, 100.0));
    assert!(session.final_reveal().is_toast_visible(10_050));
    assert!(!session.final_reveal().is_toast_visible(10_200));

    session.toggle_music(8200);
    assert!(session.audio().is_music_playing());
    let graph = session.audio().graph().unwrap();
    assert!(graph.lock().has_music_source());
    assert!(graph.lock().music_running());

    let expected: Vec<Vec<u32>> = vec![
        vec![50],         // wrong answer click
        vec![50],         // challenge 1
        vec![50],         // challenge 2
        vec![50],         // challenge 3
        vec![50],         // final code
        vec![30, 50, 30], // unlock
        vec![200],        // slam
        vec![50],         // voucher
        vec![200],        // door slam
        vec![30, 50, 30], // handle
        vec![100],        // grind
        vec![30],         // clink
        vec![30],         // clink
    ];
    assert_eq!(*recorder.0.lock(), expected);

    session.request_reset(8300);
    assert_eq!(session.orchestrator().active(), StageId::EntryLock);
    assert_eq!(session.entry_lock().step(), 1);
    assert!(!session.audio().is_music_playing());
    assert_eq!(session.audio().state(), AudioState::Ready);
    assert_eq!(session.final_reveal().phase(), DoorPhase::Hidden);

    // The second run works just like the first
    let now = solve_challenges(&mut session, 8400);
    assert_eq!(session.entry_lock().step(), 4);
    session.enter_code("232323", now);
    session.tick(now + 1300);
    session.tick(now + 1500);
    assert_eq!(session.orchestrator().active(), StageId::Voucher);
}

#[test]
fn test_sequence_completes_without_audio_device() {
    let recorder = Recorder::default();
    let config = ExperienceConfig::default();
    let audio = AudioEngine::new(
        Box::new(NullBackend),
        Box::new(recorder.clone()),
        config.audio.clone(),
    );
    let mut session = Session::new(
        config,
        audio,
        Box::new(TimedClip::new(1000).with_blocked_autoplay()),
        9,
    );

    session.pointer_down();
    assert_eq!(session.audio().state(), AudioState::Unavailable);

    let now = solve_challenges(&mut session, 0);
    session.enter_code("232323", now);
    session.tick(now + 1300);
    session.tick(now + 1500);
    assert_eq!(session.orchestrator().active(), StageId::Voucher);

    session.proceed(now + 1500);
    session.tick(now + 1700);
    assert_eq!(session.orchestrator().active(), StageId::MediaReveal);
    assert!(session.media().overlay_visible());

    session.toggle_clip(now + 1800);
    assert!(!session.media().clip_paused());
    session.click_tag(now + 1900);
    session.tick(now + 2099);
    assert_eq!(session.orchestrator().active(), StageId::MediaReveal);
    assert!(!session.media().clip_paused());

    // The clip pauses with the hand-over, before the delayed pause is due
    session.tick(now + 2100);
    assert_eq!(session.orchestrator().active(), StageId::FinalReveal);
    assert!(session.media().clip_paused());

    session.tick(now + 5500);
    assert!(session.final_reveal().panel_visible());
    session.toggle_music(now + 5600);
    assert!(!session.audio().is_music_playing());

    // Nothing ever reached the haptic sink
    assert!(recorder.0.lock().is_empty());
}

#[test]
fn test_out_of_turn_input_is_ignored() {
    let config = ExperienceConfig::default();
    let audio = AudioEngine::new(
        Box::new(NullBackend),
        Box::new(Recorder::default()),
        config.audio.clone(),
    );
    let mut session = Session::new(config, audio, Box::new(TimedClip::new(1000)), 1);

    session.proceed(0);
    session.click_tag(0);
    session.cheers(0, Vec2::ZERO);
    session.request_reset(0);
    session.tick(1000);

    assert_eq!(session.orchestrator().active(), StageId::EntryLock);
    assert_eq!(session.entry_lock().step(), 1);
}
