pub mod parsers;
pub mod types;

use types::{EventType, FieldSpec};

const WORLD_TIME: &[FieldSpec] = &[FieldSpec::int32("time_ms")];

const ENTITY_MOVE: &[FieldSpec] = &[
    FieldSpec::int32("rpl_id"),
    FieldSpec::float32("pos_x"),
    FieldSpec::float32("pos_z"),
    FieldSpec::float32("rot_y"),
];

const CHARACTER_POSSESS: &[FieldSpec] =
    &[FieldSpec::int32("rpl_id"), FieldSpec::int32("player_id")];

const CHARACTER_REGISTRATION: &[FieldSpec] =
    &[FieldSpec::int32("rpl_id"), FieldSpec::blob("faction_key")];

const VEHICLE_REGISTRATION: &[FieldSpec] = &[
    FieldSpec::int32("rpl_id"),
    FieldSpec::blob("vehicle_name"),
    FieldSpec::int32("vehicle_type"),
    FieldSpec::blob("faction_key"),
];

const PLAYER_REGISTRATION: &[FieldSpec] =
    &[FieldSpec::int32("player_id"), FieldSpec::blob("player_name")];

const ENTITY_DAMAGE_STATE_CHANGED: &[FieldSpec] =
    &[FieldSpec::int32("rpl_id"), FieldSpec::int32("damage_state")];

// Board and unboard share a layout; the tag carries the direction.
const VEHICLE_BOARDING: &[FieldSpec] =
    &[FieldSpec::int32("vehicle_id"), FieldSpec::int32("player_id")];

const PROJECTILE_SHOOT: &[FieldSpec] = &[
    FieldSpec::int32("shoot_entity"),
    FieldSpec::float32("hit_pos_x"),
    FieldSpec::float32("hit_pos_z"),
];

const EXPLOSION: &[FieldSpec] = &[
    FieldSpec::float32("hit_pos_x"),
    FieldSpec::float32("hit_pos_z"),
    FieldSpec::float32("impulse_distance"),
];

const ENTITY_DELETE: &[FieldSpec] = &[FieldSpec::int32("rpl_id")];

/// Ordered payload layout for an event type.
pub fn layout(event_type: EventType) -> &'static [FieldSpec] {
    match event_type {
        EventType::WorldTime => WORLD_TIME,
        EventType::EntityMove => ENTITY_MOVE,
        EventType::CharacterPossess => CHARACTER_POSSESS,
        EventType::CharacterRegistration => CHARACTER_REGISTRATION,
        EventType::VehicleRegistration => VEHICLE_REGISTRATION,
        EventType::PlayerRegistration => PLAYER_REGISTRATION,
        EventType::EntityDamageStateChanged => ENTITY_DAMAGE_STATE_CHANGED,
        EventType::CharacterBoardVehicle | EventType::CharacterUnBoardVehicle => VEHICLE_BOARDING,
        EventType::ProjectileShoot => PROJECTILE_SHOOT,
        EventType::Explosion => EXPLOSION,
        EventType::EntityDelete => ENTITY_DELETE,
    }
}

/// Looks up the payload layout for a raw tag byte.
///
/// `None` means the tag is not part of the format. Whether that is fatal is
/// up to the caller, but since payloads carry no length there is no way to
/// skip one.
pub fn fields_for(tag: u8) -> Option<&'static [FieldSpec]> {
    EventType::try_from(tag).ok().map(layout)
}
