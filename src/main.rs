use fretpulse::audio::AudioOutput;
use fretpulse::clock::Clock;
use fretpulse::model::song::Library;
use fretpulse::sequencer::PollDriver;
use fretpulse::session::PracticeSession;
use fretpulse::store::{JsonFileStore, SongStore};
use std::thread;
use std::time::Duration;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("list");

    let store = match JsonFileStore::at_default_location() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return;
        }
    };

    let library = match store.load() {
        Ok(library) => library,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return;
        }
    };

    match command {
        "list" => list(&store, library),
        "metronome" => metronome(&store, library, &args[1..]),
        "play" => play(library, &args[1..]),
        other => {
            eprintln!("Unknown command: {other}");
            usage();
        }
    }
}

fn usage() {
    println!("Usage: fretpulse <command>");
    println!();
    println!("Commands:");
    println!("  list                         Show songs, parts and tempos");
    println!("  metronome [BPM] [SECONDS]    Click at the active part's tempo (or BPM)");
    println!("  play [--loop] [--click] [SECONDS]");
    println!("                               Play the active part's tablature");
}

fn list(store: &JsonFileStore, library: Library) {
    println!("Library: {}", store.path().display());
    for song in &library.songs {
        let marker = if Some(song.id) == library.active_song_id {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {} (goal {}, {} parts)",
            song.title,
            song.goal_tempo,
            song.parts.len()
        );
        for part in &song.parts {
            let marker = if Some(part.id) == library.active_part_id {
                "*"
            } else {
                " "
            };
            println!(
                "    {marker} {} - {} - {} bars [{}]",
                part.title,
                part.working_tempo,
                part.bar_count(),
                part.learnt_state.label()
            );
        }
    }
}

fn metronome(store: &JsonFileStore, library: Library, args: &[String]) {
    let bpm: Option<u32> = args.first().and_then(|a| a.parse().ok());
    let seconds: u64 = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(8);

    let mut session = PracticeSession::new(library);
    if let Some(bpm) = bpm {
        session.set_tempo(0.0, bpm);
        if let Err(e) = store.save(session.library()) {
            eprintln!("Warning: could not save tempo change: {e}");
        }
    }

    let Some(part) = session.library().active_part() else {
        eprintln!("No part selected; nothing to click along to");
        return;
    };
    let tempo = part.working_tempo;
    println!("Metronome at {tempo} for {seconds}s...");

    let (output, mut sink) = match AudioOutput::open() {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return;
        }
    };
    if let Err(e) = output.ensure_started() {
        eprintln!("ERROR: {e}");
        return;
    }

    let clock = output.clock();
    session.toggle_metronome(clock.now());

    let poll_clock = output.clock();
    let driver = PollDriver::spawn(
        move || poll_clock.now(),
        move |now| session.poll(now, &mut sink),
    );

    thread::sleep(Duration::from_secs(seconds));
    driver.stop();
    println!("Done.");
}

fn play(library: Library, args: &[String]) {
    let loop_enabled = args.iter().any(|a| a == "--loop");
    let click = args.iter().any(|a| a == "--click");
    let seconds: u64 = args
        .iter()
        .find_map(|a| a.parse().ok())
        .unwrap_or(16);

    let mut session = PracticeSession::new(library);
    session.set_loop_enabled(loop_enabled);
    session.set_click_while_playing(click);

    let Some(part) = session.library().active_part() else {
        eprintln!("No part selected; nothing to play");
        return;
    };
    println!(
        "Playing \"{}\" at {} ({} bars{})...",
        part.title,
        part.working_tempo,
        part.bar_count(),
        if loop_enabled { ", looped" } else { "" }
    );

    let (output, mut sink) = match AudioOutput::open() {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return;
        }
    };
    if let Err(e) = output.ensure_started() {
        eprintln!("ERROR: {e}");
        return;
    }

    let clock = output.clock();
    if let Err(e) = session.start_playback(clock.now()) {
        eprintln!("ERROR: {e}");
        return;
    }

    let poll_clock = output.clock();
    let driver = PollDriver::spawn(
        move || poll_clock.now(),
        move |now| session.poll(now, &mut sink),
    );

    thread::sleep(Duration::from_secs(seconds));
    driver.stop();
    println!("Done.");
}
