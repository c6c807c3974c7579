//! Raw terminal bytes to playback commands.

use crate::config::ControlsSettings;

/// What the user asked for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    /// Seek by the given number of seconds.
    Seek(i64),
    /// Change the volume by the given number of points.
    Volume(i32),
    SkipCurrent,
    SkipUpcoming,
    Previous,
    ShowCurrent,
    ShowNext,
    Quit,
}

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;

/// Decode one read from a raw-mode stdin. Unrecognized bytes are dropped.
pub fn parse(bytes: &[u8], controls: &ControlsSettings) -> Vec<Command> {
    let small_seek = controls.seek_small as i64;
    let large_seek = controls.seek_large as i64;
    let small_volume = controls.volume_small as i32;
    let large_volume = controls.volume_large as i32;

    let mut commands = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let (command, used) = match rest {
            // Shift + arrows.
            [ESC, b'[', b'1', b';', b'2', b'C', ..] => (Some(Command::Seek(large_seek)), 6),
            [ESC, b'[', b'1', b';', b'2', b'D', ..] => (Some(Command::Seek(-large_seek)), 6),
            [ESC, b'[', b'1', b';', b'2', b'A', ..] => (Some(Command::Volume(large_volume)), 6),
            [ESC, b'[', b'1', b';', b'2', b'B', ..] => (Some(Command::Volume(-large_volume)), 6),
            [ESC, b'[', b'3', b'~', ..] => (Some(Command::SkipUpcoming), 4),
            [ESC, b'[', b'C', ..] => (Some(Command::Seek(small_seek)), 3),
            [ESC, b'[', b'D', ..] => (Some(Command::Seek(-small_seek)), 3),
            [ESC, b'[', b'A', ..] => (Some(Command::Volume(small_volume)), 3),
            [ESC, b'[', b'B', ..] => (Some(Command::Volume(-small_volume)), 3),
            [ESC, b'[', tail @ ..] => (None, 2 + csi_len(tail)),
            [b' ', ..] => (Some(Command::TogglePause), 1),
            [b's', ..] => (Some(Command::SkipCurrent), 1),
            [b'p', ..] => (Some(Command::Previous), 1),
            [b'i', ..] => (Some(Command::ShowCurrent), 1),
            [b't', ..] => (Some(Command::ShowNext), 1),
            [b'q' | CTRL_C | CTRL_D, ..] => (Some(Command::Quit), 1),
            _ => (None, 1),
        };
        commands.extend(command);
        rest = &rest[used.min(rest.len())..];
    }
    commands
}

/// Length of the parameter bytes plus the final byte of an escape sequence.
fn csi_len(tail: &[u8]) -> usize {
    tail.iter()
        .position(|b| (0x40..=0x7e).contains(b))
        .map(|end| end + 1)
        .unwrap_or(tail.len())
}
