//! Button map files
//!
//! File-backed mapping store: one file per device under a root directory,
//! with a section per controller profile and one `feature=value` line per
//! feature.
//!
//! ```text
//! # Button map: 050000004c050000c405000000010000
//! [game.controller.default]
//! a=button:0
//! up=hat:0.up
//! lefttrigger=axis:+2
//! leftstick=stick:axis:+1,axis:-1,axis:+0,axis:-0
//! accelerometer=accel:axis:+2,axis:+3,axis:+4
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use log::warn;
use parking_lot::Mutex;

use super::store::MappingStore;
use crate::feature::JoystickFeature;
use crate::primitive::{DriverPrimitive, HatDirection, SemiAxisDirection};

/// Error reading or parsing a button map file
#[derive(Debug, thiserror::Error)]
pub enum MapFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed primitive '{0}'")]
    BadPrimitive(String),
    #[error("malformed feature line '{0}'")]
    BadFeature(String),
}

type ControllerFeatures = BTreeMap<String, JoystickFeature>;
type DeviceMaps = BTreeMap<String, ControllerFeatures>;

/// A directory of per-device button map files
#[derive(Debug)]
pub struct MapDirectory {
    root: PathBuf,
    // Serializes the read-modify-rename upsert cycle
    write_lock: Mutex<()>,
}

impl MapDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Device ids that have a map file in this directory
    pub fn devices(&self) -> anyhow::Result<Vec<String>> {
        let mut devices = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("reading button map directory {:?}", self.root))?;
        for entry in entries {
            let entry = entry.context("reading button map directory entry")?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".map") {
                devices.push(decode_file_stem(stem));
            }
        }
        devices.sort();
        Ok(devices)
    }

    fn device_path(&self, device_id: &str) -> PathBuf {
        self.root.join(format!("{}.map", encode_file_stem(device_id)))
    }

    fn load_device(&self, device_id: &str) -> Result<DeviceMaps, MapFileError> {
        let file = fs::File::open(self.device_path(device_id))?;
        let reader = io::BufReader::new(file);

        let mut maps = DeviceMaps::new();
        let mut section = String::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].to_string();
                continue;
            }

            if section.is_empty() {
                continue;
            }

            if let Some((name, value)) = line.split_once('=') {
                match parse_feature(name.trim(), value.trim()) {
                    Ok(feature) => {
                        maps.entry(section.clone())
                            .or_default()
                            .insert(feature.name().to_string(), feature);
                    }
                    Err(err) => {
                        warn!("skipping button map line for {}: {}", device_id, err);
                    }
                }
            }
        }

        Ok(maps)
    }

    fn save_device(&self, device_id: &str, maps: &DeviceMaps) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;

        // Rewrite through a sibling temp file so readers never see a torn map
        let path = self.device_path(device_id);
        let tmp_path = path.with_extension("map.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            writeln!(file, "# Button map: {}", device_id)?;
            for (controller_id, features) in maps {
                writeln!(file)?;
                writeln!(file, "[{}]", controller_id)?;
                for feature in features.values() {
                    writeln!(file, "{}={}", feature.name(), format_feature(feature))?;
                }
            }
        }
        fs::rename(&tmp_path, &path)
    }
}

impl MappingStore for MapDirectory {
    fn get_features(&self, device_id: &str, controller_id: &str) -> Option<Vec<JoystickFeature>> {
        match self.load_device(device_id) {
            Ok(maps) => maps
                .get(controller_id)
                .map(|features| features.values().cloned().collect()),
            Err(MapFileError::Io(err)) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("failed to load button map for {}: {}", device_id, err);
                None
            }
        }
    }

    fn upsert_feature(
        &self,
        device_id: &str,
        controller_id: &str,
        feature: JoystickFeature,
    ) -> bool {
        let _guard = self.write_lock.lock();

        let mut maps = match self.load_device(device_id) {
            Ok(maps) => maps,
            Err(MapFileError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                DeviceMaps::new()
            }
            Err(err) => {
                warn!("failed to load button map for {}: {}", device_id, err);
                return false;
            }
        };

        maps.entry(controller_id.to_string())
            .or_default()
            .insert(feature.name().to_string(), feature);

        match self.save_device(device_id, &maps) {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to save button map for {}: {}", device_id, err);
                false
            }
        }
    }
}

// === Primitive and feature syntax ===

fn format_primitive(primitive: &DriverPrimitive) -> String {
    match primitive {
        DriverPrimitive::Button(index) => format!("button:{}", index),
        DriverPrimitive::Hat(index, dir) => format!("hat:{}.{}", index, dir),
        DriverPrimitive::SemiAxis(index, dir) => format!("axis:{}{}", dir, index),
    }
}

fn format_slot(slot: &Option<DriverPrimitive>) -> String {
    match slot {
        Some(primitive) => format_primitive(primitive),
        None => "-".to_string(),
    }
}

fn parse_primitive(s: &str) -> Result<DriverPrimitive, MapFileError> {
    let bad = || MapFileError::BadPrimitive(s.to_string());

    if let Some(rest) = s.strip_prefix("button:") {
        let index = rest.parse::<u32>().map_err(|_| bad())?;
        return Ok(DriverPrimitive::button(index));
    }

    if let Some(rest) = s.strip_prefix("hat:") {
        let (index_str, dir_str) = rest.split_once('.').ok_or_else(bad)?;
        let index = index_str.parse::<u32>().map_err(|_| bad())?;
        let direction = match dir_str {
            "up" => HatDirection::Up,
            "right" => HatDirection::Right,
            "down" => HatDirection::Down,
            "left" => HatDirection::Left,
            _ => return Err(bad()),
        };
        return Ok(DriverPrimitive::hat(index, direction));
    }

    if let Some(rest) = s.strip_prefix("axis:") {
        let direction = match rest.chars().next() {
            Some('+') => SemiAxisDirection::Positive,
            Some('-') => SemiAxisDirection::Negative,
            _ => return Err(bad()),
        };
        let index = rest[1..].parse::<u32>().map_err(|_| bad())?;
        return Ok(DriverPrimitive::semiaxis(index, direction));
    }

    Err(bad())
}

fn parse_slot(s: &str) -> Result<Option<DriverPrimitive>, MapFileError> {
    if s == "-" {
        Ok(None)
    } else {
        parse_primitive(s).map(Some)
    }
}

fn format_feature(feature: &JoystickFeature) -> String {
    match feature {
        JoystickFeature::Primitive { primitive, .. } => format_primitive(primitive),
        JoystickFeature::AnalogStick {
            up,
            down,
            right,
            left,
            ..
        } => format!(
            "stick:{},{},{},{}",
            format_slot(up),
            format_slot(down),
            format_slot(right),
            format_slot(left)
        ),
        JoystickFeature::Accelerometer {
            positive_x,
            positive_y,
            positive_z,
            ..
        } => format!(
            "accel:{},{},{}",
            format_slot(positive_x),
            format_slot(positive_y),
            format_slot(positive_z)
        ),
    }
}

fn parse_feature(name: &str, value: &str) -> Result<JoystickFeature, MapFileError> {
    if name.is_empty() {
        return Err(MapFileError::BadFeature(format!("{}={}", name, value)));
    }

    if let Some(rest) = value.strip_prefix("stick:") {
        let slots: Vec<&str> = rest.split(',').collect();
        if slots.len() != 4 {
            return Err(MapFileError::BadFeature(value.to_string()));
        }
        return Ok(JoystickFeature::analog_stick(
            name,
            parse_slot(slots[0])?,
            parse_slot(slots[1])?,
            parse_slot(slots[2])?,
            parse_slot(slots[3])?,
        ));
    }

    if let Some(rest) = value.strip_prefix("accel:") {
        let slots: Vec<&str> = rest.split(',').collect();
        if slots.len() != 3 {
            return Err(MapFileError::BadFeature(value.to_string()));
        }
        return Ok(JoystickFeature::accelerometer(
            name,
            parse_slot(slots[0])?,
            parse_slot(slots[1])?,
            parse_slot(slots[2])?,
        ));
    }

    Ok(JoystickFeature::primitive(name, parse_primitive(value)?))
}

// === Device id ↔ file name ===

fn encode_file_stem(device_id: &str) -> String {
    let mut out = String::new();
    for b in device_id.bytes() {
        let c = b as char;
        if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' {
            out.push(c);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn decode_file_stem(stem: &str) -> String {
    let mut bytes = Vec::new();
    let mut chars = stem.bytes();
    while let Some(b) = chars.next() {
        if b == b'%' {
            let hi = chars.next();
            let lo = chars.next();
            if let (Some(hi), Some(lo)) = (hi, lo) {
                let hex = [hi, lo];
                if let Ok(s) = std::str::from_utf8(&hex) {
                    if let Ok(value) = u8::from_str_radix(s, 16) {
                        bytes.push(value);
                        continue;
                    }
                }
            }
            bytes.push(b);
        } else {
            bytes.push(b);
        }
    }
    String::from_utf8_lossy(&bytes).to_string()
}
