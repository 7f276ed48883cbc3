//! Simple region consumer
//!
//! Allocates the file-backed region, then prints every generation the
//! evbridge binary publishes into it until the producer reports QUIT or
//! FATAL. Start this before the binary.
//! Run with: cargo run --example region_reader [path]

use std::path::PathBuf;
use std::time::Duration;

use evbridge::backend::EventKind;
use evbridge::config::BridgeConfig;
use evbridge::input::pointer::scale_scroll_delta;
use evbridge::protocol::{EventPayload, RegionMemory, RegionReader, RegionSnapshot, WriteState};

fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::from_env()?;
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or(config.region_path);

    println!("Allocating region {}...", path.display());
    let mut reader = RegionReader::new(RegionMemory::create_file(&path, config.region_size)?);
    println!("Mapped! Start evbridge to publish events");

    loop {
        let Some(snapshot) = reader.poll()? else {
            std::thread::sleep(Duration::from_millis(2));
            continue;
        };

        print_snapshot(&snapshot);

        match snapshot.write_state {
            WriteState::Quit => {
                println!("Producer quit");
                return Ok(());
            }
            WriteState::Fatal => anyhow::bail!("Producer reported a fatal error"),
            _ => {}
        }
    }
}

fn print_snapshot(snapshot: &RegionSnapshot) {
    let kind = EventKind::from_code(snapshot.event_type);
    match &snapshot.payload {
        EventPayload::Empty => println!("[{}] {:?}", snapshot.sequence, snapshot.write_state),
        EventPayload::Pointer(event) if event.wheel_delta != 0 => println!(
            "[{}] {:?} at {},{} scrolled {:.2}",
            snapshot.sequence,
            kind,
            event.x,
            event.y,
            scale_scroll_delta(event.wheel_delta)
        ),
        EventPayload::Pointer(event) => println!(
            "[{}] {:?} button {} at {},{}",
            snapshot.sequence, kind, event.button, event.x, event.y
        ),
        EventPayload::Keyboard(event) => {
            println!("[{}] {:?} key {:#04x}", snapshot.sequence, kind, event.key)
        }
        EventPayload::Controllers(slots) => {
            let connected: Vec<usize> = slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.connected)
                .map(|(index, _)| index)
                .collect();
            // Controller snapshots arrive every frame; only show live ones
            if !connected.is_empty() {
                println!("[{}] controllers connected: {:?}", snapshot.sequence, connected);
            }
        }
        EventPayload::Touch(contacts) => {
            println!("[{}] {:?} {} contacts", snapshot.sequence, kind, contacts.len());
            for contact in contacts {
                println!(
                    "    #{} {},{}{}",
                    contact.id,
                    contact.x,
                    contact.y,
                    if contact.active { "" } else { " (lifted)" }
                );
            }
        }
        EventPayload::Fatal(message) => println!("[{}] FATAL: {}", snapshot.sequence, message),
        other => println!(
            "[{}] {:?} {:?} (window {}x{})",
            snapshot.sequence,
            snapshot.write_state,
            other,
            snapshot.window_width,
            snapshot.window_height
        ),
    }
}
