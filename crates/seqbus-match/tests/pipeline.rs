// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pipeline-level tests: publisher sequencing, header echo, TLV wire layout,
//! codec round trips, and dispatcher ordering.

use std::cell::RefCell;
use std::rc::Rc;

use seqbus::bus::{BufferedPublisher, CommandSink, PublishError};
use seqbus::codec::header;
use seqbus::config::MAX_MESSAGE_SIZE;
use seqbus::sequencer::{BusServer, EventSink};

use seqbus_match::messages::{
    message_type, AddOrderCommandDecoder, AddOrderCommandEncoder, ApplicationDefinitionEncoder,
    EquityDefinitionDecoder, EquityDefinitionEncoder, HeartbeatEncoder, MatchProvider,
    SequencerRejectDecoder, SequencerRejectEncoder, Side,
};
use seqbus_match::{bus_server, MatchDispatcher};

#[derive(Clone, Default)]
struct Capture {
    events: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl EventSink for Capture {
    fn on_event(&mut self, _event_seq: u64, buffer: &[u8]) {
        self.events.borrow_mut().push(buffer.to_vec());
    }
}

/// Routes publisher datagrams straight into the sequencer.
#[derive(Clone)]
struct ServerSink {
    server: Rc<RefCell<BusServer>>,
}

impl CommandSink for ServerSink {
    fn submit(&mut self, datagram: &[u8]) -> Result<(), PublishError> {
        self.server.borrow_mut().on_packet(datagram);
        Ok(())
    }
}

struct Pipeline {
    server: Rc<RefCell<BusServer>>,
    events: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl Pipeline {
    fn new() -> Self {
        let (mut server, _engine) = bus_server();
        let capture = Capture::default();
        let events = Rc::clone(&capture.events);
        server.add_sink(Box::new(capture));
        Self {
            server: Rc::new(RefCell::new(server)),
            events,
        }
    }

    fn define_app(&self, name: &str) -> u16 {
        let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
        let mut encoder =
            ApplicationDefinitionEncoder::wrap(&mut buffer).expect("Wrap should succeed");
        encoder.set_name(name.as_bytes()).expect("Set name should succeed");
        let length = encoder.encoded_length();
        self.server.borrow_mut().on_command(&buffer[..length]);
        self.server
            .borrow()
            .apps()
            .id(name)
            .expect("App should be defined")
    }

    fn provider(&self, application_id: u16) -> MatchProvider<BufferedPublisher<ServerSink>> {
        MatchProvider::new(BufferedPublisher::new(
            application_id,
            ServerSink {
                server: Rc::clone(&self.server),
            },
        ))
    }
}

#[test]
fn test_application_sequence_numbers_start_at_one_and_increment() {
    let pipeline = Pipeline::new();
    let app = pipeline.define_app("LEHM01");
    let mut provider = pipeline.provider(app);

    for _ in 0..3 {
        let encoder = provider.heartbeat_encoder().expect("Encoder should wrap");
        let length = encoder.encoded_length();
        provider.commit(length).expect("Commit should succeed");
    }
    provider.send().expect("Send should succeed");

    // One definition echo plus three heartbeat echoes.
    let events = pipeline.events.borrow();
    assert_eq!(events.len(), 4);
    let sequences: Vec<u32> = events[1..]
        .iter()
        .map(|e| header::application_sequence_number(e).expect("Seq should parse"))
        .collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    for event in &events[1..] {
        assert_eq!(
            header::application_id(event).expect("App id should parse"),
            app
        );
    }
}

#[test]
fn test_publisher_is_current_after_echo() {
    let pipeline = Pipeline::new();
    let app = pipeline.define_app("LEHM01");
    let mut provider = pipeline.provider(app);

    let encoder = provider.heartbeat_encoder().expect("Encoder should wrap");
    let length = encoder.encoded_length();
    provider.commit(length).expect("Commit should succeed");
    assert!(!provider.is_current());
    provider.send().expect("Send should succeed");

    // The sink is synchronous, so the echo is already captured; feed it back.
    for event in pipeline.events.borrow().iter() {
        let app_id = header::application_id(event).expect("App id should parse");
        let seq = header::application_sequence_number(event).expect("Seq should parse");
        provider.publisher_mut().observe_event(app_id, seq);
    }
    assert!(provider.is_current());
}

#[test]
fn test_s5_heartbeat_header_echo() {
    let pipeline = Pipeline::new();
    let app = pipeline.define_app("SEQ01");
    let mut provider = pipeline.provider(app);

    let encoder = provider.heartbeat_encoder().expect("Encoder should wrap");
    let length = encoder.encoded_length();
    provider.commit(length).expect("Commit should succeed");
    provider.send().expect("Send should succeed");

    let events = pipeline.events.borrow();
    let heartbeats: Vec<&Vec<u8>> = events
        .iter()
        .filter(|e| {
            header::message_type(e).expect("Type should parse") == message_type::HEARTBEAT
        })
        .collect();
    assert_eq!(heartbeats.len(), 1, "exactly one heartbeat echo");
    let echo = heartbeats[0];
    assert_eq!(header::application_id(echo).expect("App id"), app);
    assert_eq!(
        header::application_sequence_number(echo).expect("Seq"),
        1
    );
    assert!(header::timestamp(echo).expect("Timestamp") > 0);
}

#[test]
fn test_s6_optional_tlv_wire_layout() {
    // Required int plus a short-form string and a long-form 300-byte buffer.
    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
    let long_value = vec![0xA5u8; 300];
    let mut encoder = SequencerRejectEncoder::wrap(&mut buffer).expect("Wrap should succeed");
    encoder.set_reason(b"abc").expect("Set reason should succeed");
    encoder.set_command(&long_value).expect("Set command should succeed");
    let length = encoder.encoded_length();

    // Fixed region is the header; optionals follow in commit order.
    let fixed = 18;
    assert_eq!(
        header::optional_fields_index(&buffer).expect("Index should parse"),
        fixed as u16
    );
    // Short form: id, len, value.
    assert_eq!(buffer[fixed], 1);
    assert_eq!(buffer[fixed + 1], 3);
    assert_eq!(&buffer[fixed + 2..fixed + 5], b"abc");
    // Long form: id, 0xFF, len u16 LE, value.
    assert_eq!(buffer[fixed + 5], 2);
    assert_eq!(buffer[fixed + 6], 0xFF);
    assert_eq!(&buffer[fixed + 7..fixed + 9], &300u16.to_le_bytes());
    assert_eq!(length, fixed + 5 + 4 + 300);

    let mut decoder =
        SequencerRejectDecoder::wrap(&buffer[..length]).expect("Wrap should succeed");
    assert!(decoder.has_reason().expect("Scan should succeed"));
    assert!(decoder.has_command().expect("Scan should succeed"));
    assert_eq!(
        decoder.reason().expect("Reason should scan"),
        Some(&b"abc"[..])
    );
    assert_eq!(
        decoder.command().expect("Command should scan"),
        Some(long_value.as_slice())
    );
}

#[test]
fn test_codec_round_trip_all_typed_accessors() {
    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
    let mut encoder = AddOrderCommandEncoder::wrap(&mut buffer).expect("Wrap should succeed");
    encoder
        .set_side(Side::Sell)
        .set_quantity(12_345)
        .set_instrument_id(7)
        .set_price(-42);
    let length = encoder.encoded_length();
    header::set_application_id(&mut buffer[..length], 9).expect("Set app id");
    header::set_application_sequence_number(&mut buffer[..length], 3).expect("Set seq");
    header::set_timestamp(&mut buffer[..length], 1_700_000_000_000_000_001).expect("Set ts");

    let decoder = AddOrderCommandDecoder::wrap(&buffer[..length]).expect("Wrap should succeed");
    assert_eq!(decoder.application_id(), 9);
    assert_eq!(decoder.application_sequence_number(), 3);
    assert_eq!(decoder.timestamp(), 1_700_000_000_000_000_001);
    assert_eq!(decoder.schema_version(), 1);
    assert_eq!(decoder.message_type(), message_type::ADD_ORDER_COMMAND);
    assert_eq!(decoder.side(), Some(Side::Sell));
    assert_eq!(decoder.quantity(), 12_345);
    assert_eq!(decoder.instrument_id(), 7);
    assert_eq!(decoder.price(), -42);
}

#[test]
fn test_optional_fields_decode_in_any_commit_order() {
    // Commit order command-then-reason; getters still find both.
    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
    let mut encoder = SequencerRejectEncoder::wrap(&mut buffer).expect("Wrap should succeed");
    encoder.set_command(b"cmd").expect("Set command should succeed");
    encoder.set_reason(b"why").expect("Set reason should succeed");
    let length = encoder.encoded_length();

    let mut decoder =
        SequencerRejectDecoder::wrap(&buffer[..length]).expect("Wrap should succeed");
    assert_eq!(
        decoder.reason().expect("Reason should scan"),
        Some(&b"why"[..])
    );
    assert_eq!(
        decoder.command().expect("Command should scan"),
        Some(&b"cmd"[..])
    );
}

#[test]
fn test_absent_optional_reads_as_none() {
    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
    let mut encoder = EquityDefinitionEncoder::wrap(&mut buffer).expect("Wrap should succeed");
    encoder.set_instrument_id(5);
    let length = encoder.encoded_length();

    let mut decoder =
        EquityDefinitionDecoder::wrap(&buffer[..length]).expect("Wrap should succeed");
    assert_eq!(decoder.instrument_id(), 5);
    assert!(!decoder.has_symbol().expect("Scan should succeed"));
    assert_eq!(decoder.symbol().expect("Scan should succeed"), None);
}

#[test]
fn test_dispatcher_listener_ordering() {
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let mut dispatcher = MatchDispatcher::new();

    let log = Rc::clone(&order);
    dispatcher.add_before_listener(Box::new(move |_| log.borrow_mut().push("before")));
    let log = Rc::clone(&order);
    dispatcher.add_heartbeat_listener(Box::new(move |_| log.borrow_mut().push("typed-1")));
    let log = Rc::clone(&order);
    dispatcher.add_heartbeat_listener(Box::new(move |_| log.borrow_mut().push("typed-2")));
    let log = Rc::clone(&order);
    dispatcher.add_after_listener(Box::new(move |_| log.borrow_mut().push("after")));

    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
    let encoder = HeartbeatEncoder::wrap(&mut buffer).expect("Wrap should succeed");
    let length = encoder.encoded_length();
    dispatcher.dispatch(&buffer[..length]);

    assert_eq!(
        *order.borrow(),
        vec!["before", "typed-1", "typed-2", "after"]
    );
}

#[test]
fn test_dispatcher_ignores_unknown_message_type() {
    let seen = Rc::new(RefCell::new(0u32));
    let mut dispatcher = MatchDispatcher::new();
    let count = Rc::clone(&seen);
    dispatcher.add_before_listener(Box::new(move |_| *count.borrow_mut() += 1));

    let mut buffer = vec![0u8; 18];
    header::set_message_type(&mut buffer, 250).expect("Set type should succeed");
    dispatcher.dispatch(&buffer);

    // Global listeners still run; no per-type listener exists to fail.
    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn test_bus_client_replays_events_through_dispatcher() {
    use seqbus::bus::frame::{append_frame, write_downstream_header};
    use seqbus::bus::BusClient;
    use seqbus::config::DOWNSTREAM_HEADER_SIZE;

    let pipeline = Pipeline::new();
    let app = pipeline.define_app("LEHM01");
    let mut provider = pipeline.provider(app);
    for _ in 0..2 {
        let encoder = provider.heartbeat_encoder().expect("Encoder should wrap");
        let length = encoder.encoded_length();
        provider.commit(length).expect("Commit should succeed");
    }
    provider.send().expect("Send should succeed");

    // Pack the captured event stream into one downstream datagram.
    let events = pipeline.events.borrow();
    let mut packet = vec![0u8; DOWNSTREAM_HEADER_SIZE];
    for event in events.iter() {
        append_frame(&mut packet, event).expect("Append should succeed");
    }
    write_downstream_header(&mut packet, 1, events.len() as u16);

    let seen: Rc<RefCell<Vec<(u16, u32)>>> = Rc::new(RefCell::new(Vec::new()));
    let mut dispatcher = MatchDispatcher::new();
    let sink = Rc::clone(&seen);
    dispatcher.add_heartbeat_listener(Box::new(move |decoder| {
        sink.borrow_mut()
            .push((decoder.application_id(), decoder.application_sequence_number()));
    }));

    let mut client = BusClient::new(dispatcher);
    client.on_packet(&packet).expect("Packet should parse");
    assert_eq!(client.next_event_seq(), events.len() as u64 + 1);
    assert_eq!(*seen.borrow(), vec![(app, 1), (app, 2)]);
}

#[test]
fn test_schema_facade_lookup() {
    use seqbus_match::MatchSchema;

    assert_eq!(MatchSchema::VERSION, 1);
    assert_eq!(
        MatchSchema::message_type("AddOrderCommand").expect("Known name"),
        message_type::ADD_ORDER_COMMAND
    );
    assert_eq!(
        MatchSchema::message_name(message_type::FILL_ORDER),
        Some("FillOrder")
    );
    assert!(MatchSchema::message_type("Bogus").is_err());
    assert!(MatchSchema::message_names().contains(&"SequencerReject"));
    assert_eq!(MatchSchema::TIMESTAMP_OFFSET, 6);
    assert_eq!(MatchSchema::properties(), &[("owner", "matching")]);
}

#[test]
fn test_facade_creates_codecs_by_name() {
    use seqbus_match::messages::{MatchMessage, MatchMessageEncoder};
    use seqbus_match::MatchSchema;

    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
    let mut encoder = match MatchSchema::encoder_for("AddOrderCommand", &mut buffer)
        .expect("Known name should wrap")
    {
        MatchMessageEncoder::AddOrderCommand(encoder) => encoder,
        _ => panic!("wrong encoder variant"),
    };
    encoder
        .set_side(Side::Buy)
        .set_quantity(5)
        .set_instrument_id(1)
        .set_price(10);
    let length = encoder.encoded_length();

    match MatchSchema::decoder_for("AddOrderCommand", &buffer[..length])
        .expect("Known name should wrap")
    {
        MatchMessage::AddOrderCommand(decoder) => {
            assert_eq!(decoder.quantity(), 5);
            assert_eq!(decoder.price(), 10);
        }
        _ => panic!("wrong decoder variant"),
    }

    // Wrapping by type byte resolves the same variant.
    let tagged = MatchMessage::wrap(&buffer[..length])
        .expect("Header should parse")
        .expect("Known type should resolve");
    assert_eq!(tagged.message_type(), message_type::ADD_ORDER_COMMAND);

    let err = MatchSchema::decoder_for("Bogus", &buffer[..length]).unwrap_err();
    assert!(matches!(
        err,
        seqbus::codec::CodecError::BadMessageName { .. }
    ));
    assert!(MatchSchema::encoder_for("Bogus", &mut buffer).is_err());
}
