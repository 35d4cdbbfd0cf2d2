use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

use crate::protocol::types::{EventType, FieldValue};

/// Length-prefixed raw bytes from the stream. Rendered as text on export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorldTime {
    pub time_ms: i32,
}

impl WorldTime {
    pub fn hhmmss(&self) -> String {
        format_world_time(self.time_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntityMove {
    pub rpl_id: i32,
    pub pos_x: f32,
    pub pos_z: f32,
    pub rot_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterPossess {
    pub rpl_id: i32,
    pub player_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterRegistration {
    pub rpl_id: i32,
    pub faction_key: Blob,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleRegistration {
    pub rpl_id: i32,
    pub vehicle_name: Blob,
    pub vehicle_type: i32,
    pub faction_key: Blob,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRegistration {
    pub player_id: i32,
    pub player_name: Blob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityDamageStateChanged {
    pub rpl_id: i32,
    pub damage_state: i32,
}

/// Payload shared by the board and unboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VehicleBoarding {
    pub vehicle_id: i32,
    pub player_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileShoot {
    pub shoot_entity: i32,
    pub hit_pos_x: f32,
    pub hit_pos_z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Explosion {
    pub hit_pos_x: f32,
    pub hit_pos_z: f32,
    pub impulse_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityDelete {
    pub rpl_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    WorldTime(WorldTime),
    EntityMove(EntityMove),
    CharacterPossess(CharacterPossess),
    CharacterRegistration(CharacterRegistration),
    VehicleRegistration(VehicleRegistration),
    PlayerRegistration(PlayerRegistration),
    EntityDamageStateChanged(EntityDamageStateChanged),
    CharacterBoardVehicle(VehicleBoarding),
    CharacterUnBoardVehicle(VehicleBoarding),
    ProjectileShoot(ProjectileShoot),
    Explosion(Explosion),
    EntityDelete(EntityDelete),
}

/// Pulls typed values off a decoded field list in layout order.
struct Fields(std::vec::IntoIter<FieldValue>);

impl Fields {
    fn int(&mut self) -> Option<i32> {
        match self.0.next()? {
            FieldValue::Int32(v) => Some(v),
            _ => None,
        }
    }

    fn float(&mut self) -> Option<f32> {
        match self.0.next()? {
            FieldValue::Float32(v) => Some(v),
            _ => None,
        }
    }

    fn blob(&mut self) -> Option<Blob> {
        match self.0.next()? {
            FieldValue::Blob(v) => Some(Blob(v)),
            _ => None,
        }
    }
}

impl Event {
    /// Builds an event from values decoded with `protocol::layout(event_type)`.
    ///
    /// Returns `None` when the values do not match that layout.
    pub fn from_fields(event_type: EventType, values: Vec<FieldValue>) -> Option<Event> {
        let mut f = Fields(values.into_iter());
        let event = match event_type {
            EventType::WorldTime => Event::WorldTime(WorldTime { time_ms: f.int()? }),
            EventType::EntityMove => Event::EntityMove(EntityMove {
                rpl_id: f.int()?,
                pos_x: f.float()?,
                pos_z: f.float()?,
                rot_y: f.float()?,
            }),
            EventType::CharacterPossess => Event::CharacterPossess(CharacterPossess {
                rpl_id: f.int()?,
                player_id: f.int()?,
            }),
            EventType::CharacterRegistration => {
                Event::CharacterRegistration(CharacterRegistration {
                    rpl_id: f.int()?,
                    faction_key: f.blob()?,
                })
            }
            EventType::VehicleRegistration => Event::VehicleRegistration(VehicleRegistration {
                rpl_id: f.int()?,
                vehicle_name: f.blob()?,
                vehicle_type: f.int()?,
                faction_key: f.blob()?,
            }),
            EventType::PlayerRegistration => Event::PlayerRegistration(PlayerRegistration {
                player_id: f.int()?,
                player_name: f.blob()?,
            }),
            EventType::EntityDamageStateChanged => {
                Event::EntityDamageStateChanged(EntityDamageStateChanged {
                    rpl_id: f.int()?,
                    damage_state: f.int()?,
                })
            }
            EventType::CharacterBoardVehicle => Event::CharacterBoardVehicle(VehicleBoarding {
                vehicle_id: f.int()?,
                player_id: f.int()?,
            }),
            EventType::CharacterUnBoardVehicle => {
                Event::CharacterUnBoardVehicle(VehicleBoarding {
                    vehicle_id: f.int()?,
                    player_id: f.int()?,
                })
            }
            EventType::ProjectileShoot => Event::ProjectileShoot(ProjectileShoot {
                shoot_entity: f.int()?,
                hit_pos_x: f.float()?,
                hit_pos_z: f.float()?,
            }),
            EventType::Explosion => Event::Explosion(Explosion {
                hit_pos_x: f.float()?,
                hit_pos_z: f.float()?,
                impulse_distance: f.float()?,
            }),
            EventType::EntityDelete => Event::EntityDelete(EntityDelete { rpl_id: f.int()? }),
        };

        // Leftover values mean the layout and the constructor disagree.
        if f.0.next().is_some() {
            return None;
        }
        Some(event)
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Event::WorldTime(_) => EventType::WorldTime,
            Event::EntityMove(_) => EventType::EntityMove,
            Event::CharacterPossess(_) => EventType::CharacterPossess,
            Event::CharacterRegistration(_) => EventType::CharacterRegistration,
            Event::VehicleRegistration(_) => EventType::VehicleRegistration,
            Event::PlayerRegistration(_) => EventType::PlayerRegistration,
            Event::EntityDamageStateChanged(_) => EventType::EntityDamageStateChanged,
            Event::CharacterBoardVehicle(_) => EventType::CharacterBoardVehicle,
            Event::CharacterUnBoardVehicle(_) => EventType::CharacterUnBoardVehicle,
            Event::ProjectileShoot(_) => EventType::ProjectileShoot,
            Event::Explosion(_) => EventType::Explosion,
            Event::EntityDelete(_) => EventType::EntityDelete,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::WorldTime(e) => write!(f, "WorldTime: {} ms {}", e.time_ms, e.hhmmss()),
            Event::EntityMove(e) => write!(
                f,
                "EntityMove: RplId: {}, X: {:.2}, Z: {:.2}, RotY: {:.2}",
                e.rpl_id, e.pos_x, e.pos_z, e.rot_y
            ),
            Event::CharacterPossess(e) => write!(
                f,
                "CharacterPossess: RplId: {}, PlayerId: {}",
                e.rpl_id, e.player_id
            ),
            Event::CharacterRegistration(e) => write!(
                f,
                "CharacterRegistration: RplId: {}, FactionKey: {}",
                e.rpl_id, e.faction_key
            ),
            Event::VehicleRegistration(e) => write!(
                f,
                "VehicleRegistration: RplId: {}, VehicleName: {}, VehicleType: {}, FactionKey: {}",
                e.rpl_id, e.vehicle_name, e.vehicle_type, e.faction_key
            ),
            Event::PlayerRegistration(e) => write!(
                f,
                "PlayerRegistration: PlayerId: {}, PlayerName: {}",
                e.player_id, e.player_name
            ),
            Event::EntityDamageStateChanged(e) => write!(
                f,
                "EntityDamageStateChanged: RplId: {}, DamageState: {}",
                e.rpl_id, e.damage_state
            ),
            Event::CharacterBoardVehicle(e) => write!(
                f,
                "CharacterBoardVehicle: VehicleId: {}, PlayerId: {}",
                e.vehicle_id, e.player_id
            ),
            Event::CharacterUnBoardVehicle(e) => write!(
                f,
                "CharacterUnBoardVehicle: VehicleId: {}, PlayerId: {}",
                e.vehicle_id, e.player_id
            ),
            Event::ProjectileShoot(e) => write!(
                f,
                "ProjectileShoot: Entity: {}, Hit X: {:.2}, Hit Z: {:.2}",
                e.shoot_entity, e.hit_pos_x, e.hit_pos_z
            ),
            Event::Explosion(e) => write!(
                f,
                "Explosion: Hit X: {:.2}, Hit Z: {:.2}, Impulse Distance: {:.2}",
                e.hit_pos_x, e.hit_pos_z, e.impulse_distance
            ),
            Event::EntityDelete(e) => write!(f, "EntityDelete: RplId: {}", e.rpl_id),
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let event_type = self.event_type();
        let mut state = serializer.serialize_struct("Event", 3)?;
        state.serialize_field("event_type", &event_type.code())?;
        state.serialize_field("event_name", event_type.name())?;
        match self {
            Event::WorldTime(data) => state.serialize_field("event_data", data)?,
            Event::EntityMove(data) => state.serialize_field("event_data", data)?,
            Event::CharacterPossess(data) => state.serialize_field("event_data", data)?,
            Event::CharacterRegistration(data) => state.serialize_field("event_data", data)?,
            Event::VehicleRegistration(data) => state.serialize_field("event_data", data)?,
            Event::PlayerRegistration(data) => state.serialize_field("event_data", data)?,
            Event::EntityDamageStateChanged(data) => state.serialize_field("event_data", data)?,
            Event::CharacterBoardVehicle(data) | Event::CharacterUnBoardVehicle(data) => {
                state.serialize_field("event_data", data)?
            }
            Event::ProjectileShoot(data) => state.serialize_field("event_data", data)?,
            Event::Explosion(data) => state.serialize_field("event_data", data)?,
            Event::EntityDelete(data) => state.serialize_field("event_data", data)?,
        }
        state.end()
    }
}

/// Events in stream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayLog {
    pub events: Vec<Event>,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

/// Why a decode pass stopped. `offset` is the position of the tag byte of
/// the record that could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    EndOfStream,
    Truncated { tag: u8, offset: usize },
    UnknownTag { tag: u8, offset: usize },
    MalformedLength { tag: u8, offset: usize, length: i32 },
}

impl Termination {
    pub fn is_clean(&self) -> bool {
        matches!(self, Termination::EndOfStream)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::EndOfStream => write!(f, "end of stream"),
            Termination::Truncated { tag, offset } => {
                write!(f, "record with tag {tag} at offset {offset} is truncated")
            }
            Termination::UnknownTag { tag, offset } => {
                write!(f, "unknown event type {tag} at offset {offset}")
            }
            Termination::MalformedLength {
                tag,
                offset,
                length,
            } => write!(
                f,
                "record with tag {tag} at offset {offset} has malformed blob length {length}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub log: ReplayLog,
    pub termination: Termination,
}

/// Formats a world time in milliseconds as `HH:MM:SS`.
pub fn format_world_time(time_ms: i32) -> String {
    let sign = if time_ms < 0 { "-" } else { "" };
    let seconds = (time_ms as i64).unsigned_abs() / 1000;
    format!(
        "{sign}{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}
