//! Strongroom - a staged vault-door unlock in the terminal
//!
//! Answer the three challenges, enter the opening code and watch the
//! door swing open. Every sound is synthesized on the fly.

use std::io::BufRead;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use glam::Vec2;

use strongroom::audio::{render_effect_to_wav, AudioEngine, Effect, LogHaptics};
use strongroom::cli::Args;
use strongroom::session::Session;
use strongroom::stage::StageId;
use strongroom::timeline::Millis;
use strongroom::view;

/// Main loop wake-up interval (roughly one display frame)
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.load_config().context("Failed to load configuration")?;

    if let Some(name) = &args.render_effect {
        let effect: Effect = name.parse()?;
        let out = args.out.as_ref().context("--render-effect needs --out")?;
        let frames = render_effect_to_wav(effect, out, &config.audio)
            .with_context(|| format!("Failed to render {} to {}", effect, out.display()))?;
        println!("Wrote {} frames of '{}' to {}", frames, effect, out.display());
        return Ok(());
    }

    let audio = AudioEngine::new(
        args.create_backend(),
        Box::new(LogHaptics),
        config.audio.clone(),
    );
    let session = Session::new(config, audio, args.create_clip(), args.seed);

    println!("Strongroom - type commands and press enter ('q' quits)\n");
    run(session, spawn_reader());
    Ok(())
}

/// Forward stdin lines to the main loop; the channel closes on EOF
fn spawn_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run(mut session: Session, input: Receiver<String>) {
    let start = Instant::now();
    let mut last_view = String::new();

    loop {
        let received = input.recv_timeout(FRAME);
        let now = start.elapsed().as_millis() as Millis;

        match received {
            Ok(line) => {
                session.pointer_down();
                if !handle_command(&mut session, line.trim(), now) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        session.tick(now);

        let frame = view::render(&session, now);
        if frame != last_view {
            println!("{}", frame);
            last_view = frame;
        }
    }

    println!("Bye.");
}

/// Route one input line to the active stage. Returns `false` to quit.
fn handle_command(session: &mut Session, line: &str, now: Millis) -> bool {
    if line == "q" {
        return false;
    }

    match session.orchestrator().active() {
        StageId::EntryLock => session.enter_code(line, now),
        StageId::Voucher => {
            if line.is_empty() || line == "c" {
                session.proceed(now);
            }
        }
        StageId::MediaReveal => match line {
            "p" => session.toggle_clip(now),
            "t" => session.click_tag(now),
            _ => {}
        },
        StageId::FinalReveal => {
            let mut words = line.split_whitespace();
            match words.next() {
                Some("x") => {
                    let at = parse_point(words).unwrap_or_else(|| {
                        let p = &session.config().particles;
                        Vec2::new(p.view_width / 2.0, p.view_height / 2.0)
                    });
                    session.cheers(now, at);
                }
                Some("m") => session.toggle_music(now),
                Some("r") => session.request_reset(now),
                _ => {}
            }
        }
    }
    true
}

fn parse_point<'a>(mut words: impl Iterator<Item = &'a str>) -> Option<Vec2> {
    let x = words.next()?.parse().ok()?;
    let y = words.next()?.parse().ok()?;
    Some(Vec2::new(x, y))
}
