//! DMX-512 channel frames.
//!
//! A [`ChannelFrame`] is the 512-byte image of one universe as a console
//! would send it. Frames are built from a compiled [`Console`] with one of
//! the [`Preset`] states.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::types::{Console, Control, MAX_CHANNEL};

/// Number of channels in a universe.
pub const UNIVERSE_SIZE: usize = MAX_CHANNEL as usize;

const DUMP_COLUMNS: usize = 32;

/// Control state a frame is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Values from the document: level `value`, the `active` switch option.
    #[default]
    Initial,
    /// All levels at 0, switches on their first option.
    Minimum,
    /// All levels at 255, switches on their last option.
    Maximum,
}

/// One universe worth of channel values.
#[derive(Clone, PartialEq, Eq)]
pub struct ChannelFrame {
    data: [u8; UNIVERSE_SIZE],
}

impl ChannelFrame {
    /// An all-zero frame.
    pub fn new() -> Self {
        Self {
            data: [0; UNIVERSE_SIZE],
        }
    }

    /// Compute the frame a console produces in the given state.
    ///
    /// Controls are applied in document order, so with overlapping channels
    /// the later control wins.
    pub fn from_console(console: &Console, preset: Preset) -> Self {
        let mut frame = Self::new();
        for control in console.regulators() {
            frame.apply(control, preset);
        }
        frame
    }

    fn apply(&mut self, control: &Control, preset: Preset) {
        match control {
            Control::Level(level) => {
                self.set(level.info.channel, &[preset_level(level.value, preset)]);
            }
            Control::ColorLevel(c) => {
                let level = preset_level(c.level.value, preset);
                self.set(c.level.info.channel, &c.color.scaled(level).to_array());
            }
            Control::Switch(switch) => {
                let option = match preset {
                    Preset::Initial => switch.active_option(),
                    Preset::Minimum => switch.options.first(),
                    Preset::Maximum => switch.options.last(),
                };
                if let Some(option) = option {
                    self.set(switch.info.channel, &option.value);
                }
            }
            Control::Panel(_) => {}
        }
    }

    /// Write values starting at a 1-based channel.
    ///
    /// Values that would land past channel 512 are dropped; channel 0 is
    /// ignored.
    pub fn set(&mut self, channel: u16, values: &[u8]) {
        let Some(start) = (channel as usize).checked_sub(1) else {
            return;
        };
        if start >= UNIVERSE_SIZE {
            return;
        }
        let end = (start + values.len()).min(UNIVERSE_SIZE);
        self.data[start..end].copy_from_slice(&values[..end - start]);
    }

    /// Value of a 1-based channel.
    pub fn get(&self, channel: u16) -> Option<u8> {
        (channel as usize)
            .checked_sub(1)
            .and_then(|i| self.data.get(i))
            .copied()
    }

    pub fn blackout(&mut self) {
        self.data = [0; UNIVERSE_SIZE];
    }

    pub fn as_bytes(&self) -> &[u8; UNIVERSE_SIZE] {
        &self.data
    }

    /// Channels with a non-zero value, as `(channel, value)` pairs.
    pub fn active_channels(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(i, &v)| (i as u16 + 1, v))
    }

    /// Hex dump, 16 rows of 32 channels, each row prefixed with the 0-based
    /// index of its first channel: `000: 00 ff ...`.
    pub fn dump(&self) -> String {
        let mut out = String::with_capacity(UNIVERSE_SIZE * 3 + 16 * 6);
        for (row, chunk) in self.data.chunks(DUMP_COLUMNS).enumerate() {
            if row > 0 {
                out.push('\n');
            }
            let _ = write!(out, "{:03}:", row * DUMP_COLUMNS);
            for value in chunk {
                let _ = write!(out, " {:02x}", value);
            }
        }
        out
    }
}

impl Default for ChannelFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChannelFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.active_channels()).finish()
    }
}

fn preset_level(value: u8, preset: Preset) -> u8 {
    match preset {
        Preset::Initial => value,
        Preset::Minimum => 0,
        Preset::Maximum => u8::MAX,
    }
}
