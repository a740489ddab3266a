//! Built-in room presets for the infinite lift theme.

use roomloop_ir::theme::{InfiniteLiftParams, Theme};

/// A named room preset: a bundled background plus tuned lift parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub image: &'static str,
    pub brightness_boost_milli: u32,
    pub lift_speed_milli: u32,
}

/// Every built-in room, in display order.
pub const ROOM_PRESETS: &[RoomPreset] = &[
    RoomPreset {
        id: "japanese_zen",
        name: "Japanese Zen Room",
        image: "zen-room.jpg",
        brightness_boost_milli: 80,
        lift_speed_milli: 20,
    },
    RoomPreset {
        id: "brutalist_cube",
        name: "Brutalist Concrete Cube",
        image: "brutalist-cube.jpg",
        brightness_boost_milli: 100,
        lift_speed_milli: 25,
    },
    RoomPreset {
        id: "neon_corridor",
        name: "Neon Corridor",
        image: "neon-corridor.jpg",
        brightness_boost_milli: 150,
        lift_speed_milli: 30,
    },
    RoomPreset {
        id: "white_scifi",
        name: "White Sci-Fi Room",
        image: "scifi-room.jpg",
        brightness_boost_milli: 120,
        lift_speed_milli: 30,
    },
];

/// The default room when none is requested.
pub const DEFAULT_ROOM: &str = "white_scifi";

/// Look up a preset by id.
pub fn find(id: &str) -> Option<&'static RoomPreset> {
    ROOM_PRESETS.iter().find(|r| r.id == id)
}

impl RoomPreset {
    /// The preset's theme parameters.
    pub fn theme(&self) -> Theme {
        Theme::InfiniteLift(InfiniteLiftParams {
            lift_speed: self.lift_speed_milli as f64 / 1000.0,
            brightness_boost: self.brightness_boost_milli as f64 / 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_room_exists() {
        assert!(find(DEFAULT_ROOM).is_some());
    }

    #[test]
    fn test_preset_theme_parameters() {
        let preset = find("japanese_zen").unwrap();
        match preset.theme() {
            Theme::InfiniteLift(p) => {
                assert!((p.lift_speed - 0.02).abs() < 1e-9);
                assert!((p.brightness_boost - 0.08).abs() < 1e-9);
            }
            _ => panic!("presets are infinite lift rooms"),
        }
    }

    #[test]
    fn test_preset_ids_are_unique() {
        let mut ids: Vec<_> = ROOM_PRESETS.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), ROOM_PRESETS.len());
    }
}
