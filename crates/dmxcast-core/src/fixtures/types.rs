use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FixtureError {
    #[error("fixture {fixture} has no logical channel {logical:?}")]
    UnknownChannel { fixture: String, logical: String },
    #[error("value {value} out of range for logical channel {logical:?} (0..=255)")]
    ValueOutOfRange { logical: String, value: u32 },
    #[error("dimmer level {level} out of range (0.0..=1.0)")]
    LevelOutOfRange { level: f64 },
    #[error("operation not supported by fixture kind {kind:?}")]
    Unsupported { kind: FixtureKind },
    #[error("unknown color preset {name:?}")]
    UnknownColor { name: String },
}

/// Fixture behavior class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Plain dimmable unit; only generic logical channels.
    Generic,
    /// Additive color mixing over red/green/blue channels.
    ColorMixing,
    /// Moving head with 16-bit pan/tilt split across MSB/LSB channels.
    PanTilt,
}

/// RGB color, either constructed directly or via a named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const AMBER: Color = Color::new(255, 191, 0);
    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const CYAN: Color = Color::new(0, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Look up a named preset ("blue", "amber", ...).
    pub fn preset(name: &str) -> Result<Color, FixtureError> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color::RED),
            "green" => Ok(Color::GREEN),
            "blue" => Ok(Color::BLUE),
            "amber" => Ok(Color::AMBER),
            "magenta" => Ok(Color::MAGENTA),
            "cyan" => Ok(Color::CYAN),
            _ => Err(FixtureError::UnknownColor {
                name: name.to_string(),
            }),
        }
    }
}

/// Split a 16-bit value into (MSB, LSB) for coarse/fine channel pairs.
pub fn split_u16(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, (value & 0xff) as u8)
}

/// One patched lighting fixture.
///
/// `channels` maps logical names to raw 1-based universe channels; `arm`
/// holds the values that bring the unit live (applied by
/// `Controller::arm_fixtures`). Every key in `arm` must also appear in
/// `channels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FixtureKind,
    pub channels: BTreeMap<String, u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arm: BTreeMap<String, u8>,
}

impl Fixture {
    fn channel(&self, logical: &str) -> Result<u16, FixtureError> {
        self.channels
            .get(logical)
            .copied()
            .ok_or_else(|| FixtureError::UnknownChannel {
                fixture: self.id.clone(),
                logical: logical.to_string(),
            })
    }

    /// Map a raw value onto one logical channel.
    pub fn set_value(&self, logical: &str, value: u32) -> Result<Vec<(u16, u8)>, FixtureError> {
        let channel = self.channel(logical)?;
        let value = u8::try_from(value).map_err(|_| FixtureError::ValueOutOfRange {
            logical: logical.to_string(),
            value,
        })?;
        Ok(vec![(channel, value)])
    }

    /// Map a normalized level (0.0..=1.0) onto the `dim` channel.
    pub fn set_dimmer(&self, level: f64) -> Result<Vec<(u16, u8)>, FixtureError> {
        if !(0.0..=1.0).contains(&level) {
            return Err(FixtureError::LevelOutOfRange { level });
        }
        let channel = self.channel("dim")?;
        Ok(vec![(channel, (level * 255.0).round() as u8)])
    }

    /// Map a color onto the red/green/blue channels. Missing color channels
    /// are skipped, matching partially-patched color units.
    pub fn set_color(&self, color: Color) -> Result<Vec<(u16, u8)>, FixtureError> {
        if self.kind != FixtureKind::ColorMixing {
            return Err(FixtureError::Unsupported { kind: self.kind });
        }
        let mut updates = Vec::new();
        for (logical, value) in [
            ("red", color.red),
            ("green", color.green),
            ("blue", color.blue),
        ] {
            if let Some(&channel) = self.channels.get(logical) {
                updates.push((channel, value));
            }
        }
        Ok(updates)
    }

    /// Map 16-bit pan/tilt positions onto their MSB/LSB channel pairs.
    /// Either axis is skipped when its pair is not fully patched.
    pub fn set_pan_tilt(&self, pan: u16, tilt: u16) -> Result<Vec<(u16, u8)>, FixtureError> {
        if self.kind != FixtureKind::PanTilt {
            return Err(FixtureError::Unsupported { kind: self.kind });
        }
        let mut updates = Vec::new();
        for (msb_name, lsb_name, value) in
            [("pan_msb", "pan_lsb", pan), ("tilt_msb", "tilt_lsb", tilt)]
        {
            if let (Some(&msb_ch), Some(&lsb_ch)) =
                (self.channels.get(msb_name), self.channels.get(lsb_name))
            {
                let (msb, lsb) = split_u16(value);
                updates.push((msb_ch, msb));
                updates.push((lsb_ch, lsb));
            }
        }
        Ok(updates)
    }

    /// Updates that bring the unit live.
    pub fn arm_updates(&self) -> Result<Vec<(u16, u8)>, FixtureError> {
        let mut updates = Vec::new();
        for (logical, &value) in &self.arm {
            updates.push((self.channel(logical)?, value));
        }
        Ok(updates)
    }

    /// Highest raw channel this fixture is patched to.
    pub fn max_channel(&self) -> Option<u16> {
        self.channels.values().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{Color, Fixture, FixtureError, FixtureKind, split_u16};

    fn channels(pairs: &[(&str, u16)]) -> BTreeMap<String, u16> {
        pairs
            .iter()
            .map(|&(name, ch)| (name.to_string(), ch))
            .collect()
    }

    fn parcan() -> Fixture {
        Fixture {
            id: "p1".to_string(),
            name: "Par".to_string(),
            kind: FixtureKind::ColorMixing,
            channels: channels(&[("red", 1), ("green", 2), ("blue", 3), ("dim", 4)]),
            arm: BTreeMap::new(),
        }
    }

    fn moving_head() -> Fixture {
        Fixture {
            id: "m1".to_string(),
            name: "Head".to_string(),
            kind: FixtureKind::PanTilt,
            channels: channels(&[
                ("pan_msb", 1),
                ("pan_lsb", 2),
                ("tilt_msb", 3),
                ("tilt_lsb", 4),
            ]),
            arm: BTreeMap::new(),
        }
    }

    #[test]
    fn split_u16_msb_lsb() {
        assert_eq!(split_u16(0x1234), (0x12, 0x34));
        assert_eq!(split_u16(0), (0, 0));
        assert_eq!(split_u16(u16::MAX), (0xff, 0xff));
    }

    #[test]
    fn color_mapping() {
        let updates = parcan().set_color(Color::new(10, 20, 30)).unwrap();
        assert_eq!(updates, vec![(1, 10), (2, 20), (3, 30)]);
    }

    #[test]
    fn color_presets_resolve() {
        assert_eq!(Color::preset("blue").unwrap(), Color::BLUE);
        assert_eq!(Color::preset("Amber").unwrap(), Color::AMBER);
        assert!(matches!(
            Color::preset("plaid"),
            Err(FixtureError::UnknownColor { .. })
        ));
    }

    #[test]
    fn color_on_wrong_kind_is_unsupported() {
        let err = moving_head().set_color(Color::RED).unwrap_err();
        assert_eq!(
            err,
            FixtureError::Unsupported {
                kind: FixtureKind::PanTilt
            }
        );
    }

    #[test]
    fn pan_tilt_mapping() {
        let updates = moving_head().set_pan_tilt(0x1234, 0x00ff).unwrap();
        assert_eq!(updates, vec![(1, 0x12), (2, 0x34), (3, 0x00), (4, 0xff)]);
    }

    #[test]
    fn pan_tilt_skips_unpatched_axis() {
        let mut head = moving_head();
        head.channels.remove("tilt_lsb");
        let updates = head.set_pan_tilt(0x1234, 0x5678).unwrap();
        assert_eq!(updates, vec![(1, 0x12), (2, 0x34)]);
    }

    #[test]
    fn dimmer_normalization() {
        let fixture = parcan();
        assert_eq!(fixture.set_dimmer(1.0).unwrap(), vec![(4, 255)]);
        assert_eq!(fixture.set_dimmer(0.0).unwrap(), vec![(4, 0)]);
        assert!(matches!(
            fixture.set_dimmer(1.5),
            Err(FixtureError::LevelOutOfRange { .. })
        ));
    }

    #[test]
    fn set_value_validates_range() {
        let fixture = parcan();
        assert_eq!(fixture.set_value("dim", 200).unwrap(), vec![(4, 200)]);
        assert!(matches!(
            fixture.set_value("dim", 300),
            Err(FixtureError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            fixture.set_value("strobe", 1),
            Err(FixtureError::UnknownChannel { .. })
        ));
    }
}
