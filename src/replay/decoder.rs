extern crate nom;

use nom::error::ErrorKind;
use tracing::{debug, info, trace, warn};

use super::buffer::ByteBuff;
use super::types::*;
use crate::protocol::layout;
use crate::protocol::parsers::{parse_fields, parse_int32};
use crate::protocol::types::EventType;

/// Receives events as they are decoded, in stream order.
pub trait EventSink {
    fn accept(&mut self, event: Event);
}

impl EventSink for ReplayLog {
    fn accept(&mut self, event: Event) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn accept(&mut self, event: Event) {
        (**self).accept(event);
    }
}

impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn accept(&mut self, event: Event) {
        self.0.accept(event.clone());
        self.1.accept(event);
    }
}

/// Reports events through `tracing` instead of keeping them.
///
/// World time stamps are logged at `info` with an `HH:MM:SS` rendering,
/// everything else at `debug`.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pub events_seen: usize,
    pub last_world_time: Option<i32>,
}

impl EventSink for ConsoleSink {
    fn accept(&mut self, event: Event) {
        self.events_seen += 1;
        match &event {
            Event::WorldTime(world_time) => {
                self.last_world_time = Some(world_time.time_ms);
                info!("{event}");
            }
            _ => debug!("{event}"),
        }
    }
}

pub struct Decoder<'a> {
    buffer: ByteBuff<'a>,
    stopped: Option<Termination>,
}

impl<'a> Decoder<'a> {
    pub fn new(buffer: ByteBuff<'a>) -> Self {
        Self {
            buffer,
            stopped: None,
        }
    }

    /// Why decoding stopped, once it has.
    pub fn termination(&self) -> Option<Termination> {
        self.stopped
    }

    /// Decodes one record.
    ///
    /// Once this returns `Err`, every later call returns the same value and
    /// no further bytes are read.
    pub fn decode_next(&mut self) -> Result<Event, Termination> {
        if let Some(termination) = self.stopped {
            return Err(termination);
        }
        self.read_record().map_err(|termination| {
            self.stopped = Some(termination);
            termination
        })
    }

    fn read_record(&mut self) -> Result<Event, Termination> {
        let offset = self.buffer.byte_index;
        let Some(tag) = self.buffer.read_u8() else {
            return Err(Termination::EndOfStream);
        };
        let Ok(event_type) = EventType::try_from(tag) else {
            warn!(tag, offset, "unknown event type, stopping decode");
            return Err(Termination::UnknownTag { tag, offset });
        };

        match parse_fields(layout(event_type), self.buffer.remaining()) {
            Ok((rest, values)) => {
                self.buffer.advance_to(rest);
                trace!(tag, offset, "decoded {event_type}");
                Event::from_fields(event_type, values)
                    .ok_or(Termination::Truncated { tag, offset })
            }
            Err(nom::Err::Failure(e))
                if matches!(e.code, ErrorKind::Verify | ErrorKind::TooLarge) =>
            {
                let length = parse_int32(e.input)
                    .map(|(_, length)| length)
                    .unwrap_or_default();
                debug!(
                    tag,
                    offset,
                    length,
                    field_offset = self.buffer.offset_of(e.input),
                    "malformed blob length in {event_type}"
                );
                Err(Termination::MalformedLength {
                    tag,
                    offset,
                    length,
                })
            }
            Err(_) => {
                debug!(tag, offset, "truncated {event_type} record");
                Err(Termination::Truncated { tag, offset })
            }
        }
    }

    /// Decodes until the stream ends or a record cannot be read, handing each
    /// event to `sink`.
    pub fn decode_into<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Termination {
        loop {
            match self.decode_next() {
                Ok(event) => sink.accept(event),
                Err(termination) => return termination,
            }
        }
    }

    pub fn decode_all(mut self) -> Decoded {
        let mut log = ReplayLog::new();
        let termination = self.decode_into(&mut log);
        Decoded { log, termination }
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next().ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};

    /// Hand-assembled little-endian replay stream.
    #[derive(Default)]
    pub(crate) struct Stream(pub Vec<u8>);

    impl Stream {
        pub fn tag(mut self, tag: u8) -> Self {
            self.0.write_u8(tag).unwrap();
            self
        }

        pub fn int(mut self, value: i32) -> Self {
            self.0.write_i32::<LittleEndian>(value).unwrap();
            self
        }

        pub fn float(mut self, value: f32) -> Self {
            self.0.write_f32::<LittleEndian>(value).unwrap();
            self
        }

        pub fn blob(self, bytes: &[u8]) -> Self {
            let mut stream = self.int(bytes.len() as i32);
            stream.0.extend_from_slice(bytes);
            stream
        }

        pub fn raw(mut self, bytes: &[u8]) -> Self {
            self.0.extend_from_slice(bytes);
            self
        }
    }

    fn decode(data: &[u8]) -> Decoded {
        Decoder::new(ByteBuff::new(data)).decode_all()
    }

    #[test]
    fn it_decodes_empty_input_cleanly() {
        let decoded = decode(&[]);
        assert!(decoded.log.is_empty());
        assert_eq!(decoded.termination, Termination::EndOfStream);
        assert!(decoded.termination.is_clean());
    }

    #[test]
    fn it_decodes_one_event_per_record_in_order() {
        let stream = Stream::default()
            .tag(0)
            .int(1000)
            .tag(1)
            .int(17)
            .float(1.5)
            .float(-2.25)
            .float(f32::MAX)
            .tag(2)
            .int(17)
            .int(3)
            .tag(3)
            .int(17)
            .blob(b"USSR")
            .tag(5)
            .int(3)
            .blob(b"Player")
            .tag(6)
            .int(17)
            .int(2)
            .tag(9)
            .int(17)
            .float(100.0)
            .float(200.5)
            .tag(10)
            .float(-1.0)
            .float(0.0)
            .float(12.75)
            .tag(11)
            .int(17);

        let decoded = decode(&stream.0);
        assert_eq!(decoded.termination, Termination::EndOfStream);
        assert_eq!(
            decoded.log.events,
            vec![
                Event::WorldTime(WorldTime { time_ms: 1000 }),
                Event::EntityMove(EntityMove {
                    rpl_id: 17,
                    pos_x: 1.5,
                    pos_z: -2.25,
                    rot_y: f32::MAX,
                }),
                Event::CharacterPossess(CharacterPossess {
                    rpl_id: 17,
                    player_id: 3,
                }),
                Event::CharacterRegistration(CharacterRegistration {
                    rpl_id: 17,
                    faction_key: Blob(b"USSR".to_vec()),
                }),
                Event::PlayerRegistration(PlayerRegistration {
                    player_id: 3,
                    player_name: Blob(b"Player".to_vec()),
                }),
                Event::EntityDamageStateChanged(EntityDamageStateChanged {
                    rpl_id: 17,
                    damage_state: 2,
                }),
                Event::ProjectileShoot(ProjectileShoot {
                    shoot_entity: 17,
                    hit_pos_x: 100.0,
                    hit_pos_z: 200.5,
                }),
                Event::Explosion(Explosion {
                    hit_pos_x: -1.0,
                    hit_pos_z: 0.0,
                    impulse_distance: 12.75,
                }),
                Event::EntityDelete(EntityDelete { rpl_id: 17 }),
            ]
        );
    }

    #[test]
    fn it_keeps_float_bits_exactly() {
        let odd = f32::from_bits(0x7fc0_0001);
        let stream = Stream::default()
            .tag(10)
            .float(odd)
            .float(-0.0)
            .float(f32::MIN_POSITIVE);
        let decoded = decode(&stream.0);
        let [Event::Explosion(explosion)] = decoded.log.events.as_slice() else {
            panic!("expected one explosion, got {:?}", decoded.log.events);
        };
        assert_eq!(explosion.hit_pos_x.to_bits(), 0x7fc0_0001);
        assert_eq!(explosion.hit_pos_z.to_bits(), (-0.0f32).to_bits());
        assert_eq!(explosion.impulse_distance, f32::MIN_POSITIVE);
    }

    #[test]
    fn it_decodes_vehicle_registration_blob_boundaries() {
        let stream = Stream::default()
            .tag(4)
            .int(42)
            .int(5)
            .raw(b"Tank1")
            .int(3)
            .int(3)
            .raw(b"US1")
            .tag(11)
            .int(42);

        let decoded = decode(&stream.0);
        assert_eq!(decoded.termination, Termination::EndOfStream);
        assert_eq!(
            decoded.log.events,
            vec![
                Event::VehicleRegistration(VehicleRegistration {
                    rpl_id: 42,
                    vehicle_name: Blob(b"Tank1".to_vec()),
                    vehicle_type: 3,
                    faction_key: Blob(b"US1".to_vec()),
                }),
                Event::EntityDelete(EntityDelete { rpl_id: 42 }),
            ]
        );
    }

    #[test]
    fn it_keeps_board_and_unboard_distinct() {
        let stream = Stream::default()
            .tag(7)
            .int(10)
            .int(20)
            .tag(8)
            .int(10)
            .int(20);

        let decoded = decode(&stream.0);
        let boarding = VehicleBoarding {
            vehicle_id: 10,
            player_id: 20,
        };
        assert_eq!(
            decoded.log.events,
            vec![
                Event::CharacterBoardVehicle(boarding),
                Event::CharacterUnBoardVehicle(boarding),
            ]
        );
        assert_eq!(
            decoded.log.events[0].event_type(),
            EventType::CharacterBoardVehicle
        );
        assert_eq!(
            decoded.log.events[1].event_type(),
            EventType::CharacterUnBoardVehicle
        );
    }

    #[test]
    fn it_drops_record_truncated_mid_field() {
        let stream = Stream::default()
            .tag(11)
            .int(1)
            .tag(0)
            .raw(&[0x10, 0x27]);

        let decoded = decode(&stream.0);
        assert_eq!(
            decoded.log.events,
            vec![Event::EntityDelete(EntityDelete { rpl_id: 1 })]
        );
        assert_eq!(
            decoded.termination,
            Termination::Truncated { tag: 0, offset: 5 }
        );
        assert!(!decoded.termination.is_clean());
    }

    #[test]
    fn it_drops_record_missing_its_payload() {
        let stream = Stream::default().tag(0).int(5).tag(1);
        let decoded = decode(&stream.0);
        assert_eq!(decoded.log.len(), 1);
        assert_eq!(
            decoded.termination,
            Termination::Truncated { tag: 1, offset: 5 }
        );
    }

    #[test]
    fn it_drops_record_truncated_after_blob() {
        let stream = Stream::default().tag(4).int(1).blob(b"Tank1").int(3);
        let decoded = decode(&stream.0);
        assert!(decoded.log.is_empty());
        assert_eq!(
            decoded.termination,
            Termination::Truncated { tag: 4, offset: 0 }
        );
    }

    #[test]
    fn it_stops_at_unknown_tag() {
        let stream = Stream::default()
            .tag(0)
            .int(1000)
            .tag(0)
            .int(2000)
            .tag(200)
            .tag(0)
            .int(3000);

        let decoded = decode(&stream.0);
        assert_eq!(
            decoded.log.events,
            vec![
                Event::WorldTime(WorldTime { time_ms: 1000 }),
                Event::WorldTime(WorldTime { time_ms: 2000 }),
            ]
        );
        assert_eq!(
            decoded.termination,
            Termination::UnknownTag {
                tag: 200,
                offset: 10
            }
        );
    }

    #[test]
    fn it_rejects_negative_blob_length() {
        let stream = Stream::default()
            .tag(5)
            .int(1)
            .blob(b"ok")
            .tag(5)
            .int(2)
            .int(-4)
            .raw(b"abcd");

        let decoded = decode(&stream.0);
        assert_eq!(decoded.log.len(), 1);
        assert_eq!(
            decoded.termination,
            Termination::MalformedLength {
                tag: 5,
                offset: 11,
                length: -4
            }
        );
    }

    #[test]
    fn it_rejects_blob_length_past_end_of_stream() {
        let stream = Stream::default().tag(3).int(1).int(i32::MAX).raw(b"US");
        let decoded = decode(&stream.0);
        assert!(decoded.log.is_empty());
        assert_eq!(
            decoded.termination,
            Termination::MalformedLength {
                tag: 3,
                offset: 0,
                length: i32::MAX
            }
        );
    }

    #[test]
    fn it_reports_the_same_termination_after_stopping() {
        let stream = Stream::default().tag(99).tag(0).int(1);
        let mut decoder = Decoder::new(ByteBuff::new(&stream.0));
        assert_eq!(decoder.termination(), None);
        let first = decoder.decode_next();
        assert_eq!(first, Err(Termination::UnknownTag { tag: 99, offset: 0 }));
        assert_eq!(decoder.decode_next(), first);
        assert_eq!(
            decoder.termination(),
            Some(Termination::UnknownTag { tag: 99, offset: 0 })
        );
    }

    #[test]
    fn it_iterates_events_until_termination() {
        let stream = Stream::default()
            .tag(11)
            .int(1)
            .tag(11)
            .int(2)
            .tag(11)
            .raw(&[3]);
        let mut decoder = Decoder::new(ByteBuff::new(&stream.0));
        let ids: Vec<i32> = decoder
            .by_ref()
            .map(|event| match event {
                Event::EntityDelete(e) => e.rpl_id,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(ids, [1, 2]);
        assert_eq!(
            decoder.termination(),
            Some(Termination::Truncated { tag: 11, offset: 10 })
        );
    }

    #[test]
    fn it_feeds_console_and_log_sinks_from_one_pass() {
        let stream = Stream::default()
            .tag(0)
            .int(3_725_000)
            .tag(11)
            .int(9)
            .tag(0)
            .int(3_726_000);
        let mut sinks = (ConsoleSink::default(), ReplayLog::new());
        let termination = Decoder::new(ByteBuff::new(&stream.0)).decode_into(&mut sinks);
        let (console, log) = sinks;
        assert_eq!(termination, Termination::EndOfStream);
        assert_eq!(console.events_seen, 3);
        assert_eq!(console.last_world_time, Some(3_726_000));
        assert_eq!(log.len(), 3);
    }
}
