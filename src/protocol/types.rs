use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum EventType {
    WorldTime = 0,
    EntityMove = 1,
    CharacterPossess = 2,
    CharacterRegistration = 3,
    VehicleRegistration = 4,
    PlayerRegistration = 5,
    EntityDamageStateChanged = 6,
    CharacterBoardVehicle = 7,
    CharacterUnBoardVehicle = 8,
    ProjectileShoot = 9,
    Explosion = 10,
    EntityDelete = 11,
}

impl EventType {
    pub const ALL: [EventType; 12] = [
        EventType::WorldTime,
        EventType::EntityMove,
        EventType::CharacterPossess,
        EventType::CharacterRegistration,
        EventType::VehicleRegistration,
        EventType::PlayerRegistration,
        EventType::EntityDamageStateChanged,
        EventType::CharacterBoardVehicle,
        EventType::CharacterUnBoardVehicle,
        EventType::ProjectileShoot,
        EventType::Explosion,
        EventType::EntityDelete,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            EventType::WorldTime => "WorldTime",
            EventType::EntityMove => "EntityMove",
            EventType::CharacterPossess => "CharacterPossess",
            EventType::CharacterRegistration => "CharacterRegistration",
            EventType::VehicleRegistration => "VehicleRegistration",
            EventType::PlayerRegistration => "PlayerRegistration",
            EventType::EntityDamageStateChanged => "EntityDamageStateChanged",
            EventType::CharacterBoardVehicle => "CharacterBoardVehicle",
            EventType::CharacterUnBoardVehicle => "CharacterUnBoardVehicle",
            EventType::ProjectileShoot => "ProjectileShoot",
            EventType::Explosion => "Explosion",
            EventType::EntityDelete => "EntityDelete",
        }
    }
}

impl TryFrom<u8> for EventType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        EventType::ALL.get(tag as usize).copied().ok_or(tag)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire shape of a single payload field.
///
/// `Blob` covers both the little-endian `i32` length prefix and the raw
/// bytes that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    Float32,
    Blob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn int32(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Int32,
        }
    }

    pub const fn float32(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Float32,
        }
    }

    pub const fn blob(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Blob,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int32(i32),
    Float32(f32),
    Blob(Vec<u8>),
}
