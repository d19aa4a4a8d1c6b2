//! Plain-text rendering of the session for the terminal driver.

use std::fmt::Write;

use crate::audio::AudioState;
use crate::session::Session;
use crate::stage::{DoorPhase, ExitState, StageId, StageLifecycle, FINAL_STEP};
use crate::timeline::Millis;

/// Render what a viewer would currently see. Two calls with no state
/// change in between return identical text.
pub fn render(session: &Session, now: Millis) -> String {
    let mut out = String::new();
    let orchestrator = session.orchestrator();
    let active = orchestrator.active();

    let _ = write!(out, "[{}]", active.name());
    if orchestrator.exit_state(active) == ExitState::Up {
        out.push_str(" (leaving)");
    }
    out.push('\n');

    match active {
        StageId::EntryLock => render_entry_lock(session, &mut out),
        StageId::Voucher => render_voucher(session, &mut out),
        StageId::MediaReveal => render_media(session, &mut out),
        StageId::FinalReveal => render_final(session, now, &mut out),
    }

    let audio = match session.audio().state() {
        AudioState::Uninitialized => "audio: waiting for first interaction",
        AudioState::Ready => "audio: ready",
        AudioState::Unavailable => "audio: unavailable",
    };
    out.push_str(audio);
    out.push('\n');
    out
}

fn render_entry_lock(session: &Session, out: &mut String) {
    let lock = session.entry_lock();
    let _ = writeln!(
        out,
        "dial {:>4.0} deg | handle {:>4.0} deg",
        lock.dial_rotation_deg(),
        lock.handle_rotation_deg()
    );

    match lock.prompt() {
        Some((title, prompt)) => {
            let step = lock.step();
            let label = if step == FINAL_STEP {
                "final".to_string()
            } else {
                format!("{}/3", step)
            };
            let _ = writeln!(out, "{} ({})", title, label);
            let _ = writeln!(out, "  {}", prompt);
            if lock.has_error(step) {
                out.push_str("  ** wrong **\n");
            }
            out.push_str("> type an answer and press enter\n");
        }
        None => out.push_str("UNLOCKED\n"),
    }
}

fn render_voucher(session: &Session, out: &mut String) {
    if session.voucher().is_active() {
        out.push_str("A voucher is waiting for you.\n");
        out.push_str("> press enter to continue\n");
    }
}

fn render_media(session: &Session, out: &mut String) {
    let media = session.media();
    if media.dropped_out() {
        out.push_str("(the clip drops away)\n");
        return;
    }
    let state = if media.clip_paused() { "paused" } else { "playing" };
    let _ = writeln!(out, "clip {}", state);
    if media.overlay_visible() {
        let label = if media.is_replay() { "replay" } else { "play" };
        let _ = writeln!(out, "  [{}]", label);
    }
    if media.tag_dropped() {
        out.push_str("  a tag hangs down\n");
    }
    out.push_str("> p play/pause, t pull the tag\n");
}

fn render_final(session: &Session, now: Millis, out: &mut String) {
    let reveal = session.final_reveal();
    let door = match reveal.phase() {
        DoorPhase::Hidden => "door: ...",
        DoorPhase::Slammed => "door: SLAM",
        DoorPhase::Opening => "door: opening",
        DoorPhase::Revealed => "door: open",
    };
    let _ = writeln!(out, "{} | handle {:.0} deg", door, reveal.handle_rotation_deg());

    if reveal.content_revealed() {
        let bump = if reveal.is_bumping(now) { " *" } else { "" };
        let _ = writeln!(out, "  the prize is inside{}", bump);
    }
    if reveal.is_toast_visible(now) {
        out.push_str("  Cheers!\n");
    }
    let live = reveal.particles().live(now).count();
    if live > 0 {
        let _ = writeln!(out, "  particles: {}", live);
    }
    if reveal.panel_visible() {
        let music = if session.audio().is_music_playing() {
            "playing"
        } else {
            "paused"
        };
        let _ = writeln!(out, "  music {}", music);
        out.push_str("> x [col row] cheers, m music, r start over\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioEngine, LogHaptics, NullBackend};
    use crate::media::TimedClip;
    use crate::params::ExperienceConfig;

    fn session() -> Session {
        let config = ExperienceConfig::default();
        let audio = AudioEngine::new(
            Box::new(NullBackend),
            Box::new(LogHaptics),
            config.audio.clone(),
        );
        Session::new(config, audio, Box::new(TimedClip::new(2000)), 7)
    }

    #[test]
    fn test_entry_lock_view() {
        let mut session = session();
        let text = render(&session, 0);
        assert!(text.starts_with("[entry-lock]"));
        assert!(text.contains("(1/3)"));
        assert!(text.contains("audio: waiting"));

        session.enter_code("22", 0);
        assert!(render(&session, 0).contains("wrong"));
    }

    #[test]
    fn test_view_is_stable_without_changes() {
        let session = session();
        assert_eq!(render(&session, 10), render(&session, 20));
    }
}
