// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end matching scenarios driven through the sequencer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use seqbus::codec::header;
use seqbus::config::MAX_MESSAGE_SIZE;
use seqbus::sequencer::{BusServer, EventSink};

use seqbus_match::messages::{
    message_type, AddOrderCommandEncoder, AddOrderDecoder, ApplicationDefinitionEncoder,
    CancelOrderCommandEncoder, CancelOrderDecoder, EquityDefinitionDecoder,
    EquityDefinitionEncoder, FillOrderDecoder, RejectCancelDecoder, RejectOrderDecoder,
    SequencerRejectDecoder, Side,
};
use seqbus_match::{bus_server, MatchEngine, SideBook};

/// Decoded event shape for compact assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ev {
    AppDef,
    Equity { id: i32, symbol: String },
    Add { id: i64, side: Side, qty: i32, instr: i32, price: i64 },
    Fill { id: i64, cp: i64, price: i64, qty: i32, remaining: i32 },
    Cancel { id: i64 },
    RejectOrder { reason: String },
    RejectCancel { id: i64, reason: String },
    SeqReject { reason: String },
    Heartbeat { app: u16, seq: u32 },
    Other(u8),
}

fn decode(buffer: &[u8]) -> Ev {
    match header::message_type(buffer).expect("Event header should parse") {
        message_type::APPLICATION_DEFINITION => Ev::AppDef,
        message_type::EQUITY_DEFINITION => {
            let mut d = EquityDefinitionDecoder::wrap(buffer).expect("Decode equity");
            let symbol = String::from_utf8(
                d.symbol()
                    .expect("Symbol should scan")
                    .expect("Symbol should be present")
                    .to_vec(),
            )
            .expect("Symbol should be UTF-8");
            Ev::Equity {
                id: d.instrument_id(),
                symbol,
            }
        }
        message_type::ADD_ORDER => {
            let d = AddOrderDecoder::wrap(buffer).expect("Decode add");
            Ev::Add {
                id: d.order_id(),
                side: d.side().expect("Side should be valid"),
                qty: d.quantity(),
                instr: d.instrument_id(),
                price: d.price(),
            }
        }
        message_type::FILL_ORDER => {
            let d = FillOrderDecoder::wrap(buffer).expect("Decode fill");
            Ev::Fill {
                id: d.order_id(),
                cp: d.counterparty_order_id(),
                price: d.price(),
                qty: d.fill_quantity(),
                remaining: d.remaining_quantity(),
            }
        }
        message_type::CANCEL_ORDER => {
            let d = CancelOrderDecoder::wrap(buffer).expect("Decode cancel");
            Ev::Cancel { id: d.order_id() }
        }
        message_type::REJECT_ORDER => {
            let mut d = RejectOrderDecoder::wrap(buffer).expect("Decode reject");
            let reason = String::from_utf8(
                d.reason()
                    .expect("Reason should scan")
                    .expect("Reason should be present")
                    .to_vec(),
            )
            .expect("Reason should be UTF-8");
            Ev::RejectOrder { reason }
        }
        message_type::REJECT_CANCEL => {
            let mut d = RejectCancelDecoder::wrap(buffer).expect("Decode reject cancel");
            let reason = String::from_utf8(
                d.reason()
                    .expect("Reason should scan")
                    .expect("Reason should be present")
                    .to_vec(),
            )
            .expect("Reason should be UTF-8");
            Ev::RejectCancel {
                id: d.order_id(),
                reason,
            }
        }
        message_type::SEQUENCER_REJECT => {
            let mut d = SequencerRejectDecoder::wrap(buffer).expect("Decode seq reject");
            let reason = String::from_utf8(
                d.reason()
                    .expect("Reason should scan")
                    .expect("Reason should be present")
                    .to_vec(),
            )
            .expect("Reason should be UTF-8");
            Ev::SeqReject { reason }
        }
        message_type::HEARTBEAT => Ev::Heartbeat {
            app: header::application_id(buffer).expect("App id should parse"),
            seq: header::application_sequence_number(buffer).expect("Seq should parse"),
        },
        other => Ev::Other(other),
    }
}

#[derive(Clone, Default)]
struct Capture {
    events: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl EventSink for Capture {
    fn on_event(&mut self, _event_seq: u64, buffer: &[u8]) {
        self.events.borrow_mut().push(buffer.to_vec());
    }
}

struct Harness {
    server: BusServer,
    engine: Rc<RefCell<MatchEngine>>,
    events: Rc<RefCell<Vec<Vec<u8>>>>,
    next_seq: HashMap<u16, u32>,
    instruments: HashMap<String, i32>,
}

impl Harness {
    fn new() -> Self {
        let (mut server, engine) = bus_server();
        let capture = Capture::default();
        let events = Rc::clone(&capture.events);
        server.add_sink(Box::new(capture));
        Self {
            server,
            engine,
            events,
            next_seq: HashMap::new(),
            instruments: HashMap::new(),
        }
    }

    /// Events after index `from`.
    fn decoded_from(&self, from: usize) -> Vec<Ev> {
        self.events.borrow()[from..].iter().map(|e| decode(e)).collect()
    }

    fn event_count(&self) -> usize {
        self.events.borrow().len()
    }

    fn submit(&mut self, app: u16, length: usize, buffer: &mut [u8]) {
        let seq = self.next_seq.entry(app).or_insert(0);
        *seq += 1;
        header::set_application_id(&mut buffer[..length], app).expect("Set app id");
        header::set_application_sequence_number(&mut buffer[..length], *seq).expect("Set seq");
        self.server.on_command(&buffer[..length]);
    }

    fn define_app(&mut self, name: &str) -> u16 {
        let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
        let mut encoder =
            ApplicationDefinitionEncoder::wrap(&mut buffer).expect("Wrap should succeed");
        encoder.set_name(name.as_bytes()).expect("Set name should succeed");
        let length = encoder.encoded_length();
        self.server.on_command(&buffer[..length]);
        self.server.apps().id(name).expect("App should be defined")
    }

    fn define_equity(&mut self, app: u16, symbol: &str) -> i32 {
        let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
        let mut encoder = EquityDefinitionEncoder::wrap(&mut buffer).expect("Wrap should succeed");
        encoder.set_symbol(symbol.as_bytes()).expect("Set symbol should succeed");
        let length = encoder.encoded_length();
        self.submit(app, length, &mut buffer);

        let id = match decode(self.events.borrow().last().expect("Definition should echo")) {
            Ev::Equity { id, .. } => id,
            other => panic!("expected equity definition event, got {:?}", other),
        };
        self.instruments.insert(symbol.to_string(), id);
        id
    }

    fn instrument(&self, symbol: &str) -> i32 {
        self.instruments
            .get(symbol)
            .copied()
            .expect("Instrument should be defined")
    }

    fn add_order(&mut self, app: u16, side: Side, qty: i32, price: i64, instrument_id: i32) {
        let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
        let mut encoder = AddOrderCommandEncoder::wrap(&mut buffer).expect("Wrap should succeed");
        encoder
            .set_side(side)
            .set_quantity(qty)
            .set_instrument_id(instrument_id)
            .set_price(price);
        let length = encoder.encoded_length();
        self.submit(app, length, &mut buffer);
    }

    fn add_order_raw_side(&mut self, app: u16, side: u8, qty: i32, price: i64, instrument_id: i32) {
        let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
        let mut encoder = AddOrderCommandEncoder::wrap(&mut buffer).expect("Wrap should succeed");
        encoder
            .set_side_raw(side)
            .set_quantity(qty)
            .set_instrument_id(instrument_id)
            .set_price(price);
        let length = encoder.encoded_length();
        self.submit(app, length, &mut buffer);
    }

    fn cancel_order(&mut self, app: u16, order_id: i64) {
        let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
        let mut encoder =
            CancelOrderCommandEncoder::wrap(&mut buffer).expect("Wrap should succeed");
        encoder.set_order_id(order_id);
        let length = encoder.encoded_length();
        self.submit(app, length, &mut buffer);
    }

    /// `(price, remaining, order_id)` from best to worst.
    fn levels(book: &SideBook) -> Vec<(i64, i32, i64)> {
        book.iter().map(|o| (o.price, o.remaining, o.order_id)).collect()
    }

    /// Standard bootstrap: three apps, AAPL and GOOG, four resting asks.
    fn bootstrap_with_asks(&mut self) -> (u16, u16, u16) {
        let refdata = self.define_app("REFDATA01");
        let lehm = self.define_app("LEHM01");
        let bear = self.define_app("BEAR01");
        self.define_equity(refdata, "AAPL");
        self.define_equity(refdata, "GOOG");

        let aapl = self.instrument("AAPL");
        self.add_order(bear, Side::Sell, 100, 100, aapl);
        self.add_order(bear, Side::Sell, 200, 99, aapl);
        self.add_order(bear, Side::Sell, 300, 101, aapl);
        self.add_order(bear, Side::Sell, 400, 99, aapl);
        (refdata, lehm, bear)
    }
}

#[test]
fn test_s1_cross_buy_fills_best_ask_in_time_priority() {
    let mut h = Harness::new();
    let (_refdata, lehm, _bear) = h.bootstrap_with_asks();
    let aapl = h.instrument("AAPL");
    let mark = h.event_count();

    h.add_order(lehm, Side::Buy, 100, 99, aapl);

    assert_eq!(
        h.decoded_from(mark),
        vec![
            Ev::Add {
                id: 5,
                side: Side::Buy,
                qty: 100,
                instr: aapl,
                price: 99
            },
            Ev::Fill {
                id: 5,
                cp: 2,
                price: 99,
                qty: 100,
                remaining: 0
            },
            Ev::Fill {
                id: 2,
                cp: 5,
                price: 99,
                qty: 100,
                remaining: 100
            },
        ]
    );

    let engine = h.engine.borrow();
    let book = engine.book(aapl).expect("Book should exist");
    assert_eq!(
        Harness::levels(&book.asks),
        vec![(99, 100, 2), (99, 400, 4), (100, 100, 1), (101, 300, 3)]
    );
    assert!(book.bids.is_empty());
    assert!(book.asks.is_priority_sorted());
}

#[test]
fn test_s2_sweep_consumes_book_and_rests_remainder() {
    let mut h = Harness::new();
    let (_refdata, lehm, _bear) = h.bootstrap_with_asks();
    let aapl = h.instrument("AAPL");
    let mark = h.event_count();

    h.add_order(lehm, Side::Buy, 1500, 102, aapl);

    let events = h.decoded_from(mark);
    assert_eq!(
        events[0],
        Ev::Add {
            id: 5,
            side: Side::Buy,
            qty: 1500,
            instr: aapl,
            price: 102
        }
    );
    // Aggressor and passive fills alternate, passive orders visited in
    // strict price-then-time priority, every fill at the resting price.
    assert_eq!(
        &events[1..],
        &[
            Ev::Fill { id: 5, cp: 2, price: 99, qty: 200, remaining: 1300 },
            Ev::Fill { id: 2, cp: 5, price: 99, qty: 200, remaining: 0 },
            Ev::Fill { id: 5, cp: 4, price: 99, qty: 400, remaining: 900 },
            Ev::Fill { id: 4, cp: 5, price: 99, qty: 400, remaining: 0 },
            Ev::Fill { id: 5, cp: 1, price: 100, qty: 100, remaining: 800 },
            Ev::Fill { id: 1, cp: 5, price: 100, qty: 100, remaining: 0 },
            Ev::Fill { id: 5, cp: 3, price: 101, qty: 300, remaining: 500 },
            Ev::Fill { id: 3, cp: 5, price: 101, qty: 300, remaining: 0 },
        ]
    );

    let engine = h.engine.borrow();
    let book = engine.book(aapl).expect("Book should exist");
    assert_eq!(Harness::levels(&book.bids), vec![(102, 500, 5)]);
    assert!(book.asks.is_empty());
}

#[test]
fn test_s3_validation_rejects_with_reasons() {
    let mut h = Harness::new();
    let refdata = h.define_app("REFDATA01");
    let lehm = h.define_app("LEHM01");
    h.define_equity(refdata, "AAPL");
    h.define_equity(refdata, "GOOG");
    let aapl = h.instrument("AAPL");
    let goog = h.instrument("GOOG");
    let mark = h.event_count();

    h.add_order(lehm, Side::Buy, 0, 100, aapl);
    h.add_order(lehm, Side::Buy, 100, 0, aapl);
    h.add_order(lehm, Side::Buy, 100, -100, aapl);
    h.add_order(lehm, Side::Buy, 100, 100, 99); // undefined instrument
    h.add_order_raw_side(lehm, 0, 100, 100, goog);

    let reasons: Vec<Ev> = ["invalid qty", "invalid price", "invalid price", "invalid instrumentId", "invalid side"]
        .iter()
        .map(|r| Ev::RejectOrder {
            reason: (*r).to_string(),
        })
        .collect();
    assert_eq!(h.decoded_from(mark), reasons);

    let engine = h.engine.borrow();
    assert_eq!(engine.resting_orders(), 0, "no rejected order may rest");
}

#[test]
fn test_s4_cancel_middle_bid_and_reject_variants() {
    let mut h = Harness::new();
    let refdata = h.define_app("REFDATA01");
    let lehm = h.define_app("LEHM01");
    let bear = h.define_app("BEAR01");
    h.define_equity(refdata, "AAPL");
    let aapl = h.instrument("AAPL");

    // Three asks (ids 1-3) and three bids (ids 4-6).
    h.add_order(bear, Side::Sell, 100, 100, aapl);
    h.add_order(bear, Side::Sell, 100, 101, aapl);
    h.add_order(bear, Side::Sell, 100, 102, aapl);
    h.add_order(lehm, Side::Buy, 100, 97, aapl);
    h.add_order(lehm, Side::Buy, 100, 98, aapl);
    h.add_order(lehm, Side::Buy, 100, 96, aapl);

    let mark = h.event_count();
    h.cancel_order(lehm, 4);
    assert_eq!(h.decoded_from(mark), vec![Ev::Cancel { id: 4 }]);
    {
        let engine = h.engine.borrow();
        let book = engine.book(aapl).expect("Book should exist");
        assert_eq!(
            Harness::levels(&book.bids),
            vec![(98, 100, 5), (96, 100, 6)]
        );
    }

    // Unknown id.
    let mark = h.event_count();
    h.cancel_order(lehm, 7);
    assert_eq!(
        h.decoded_from(mark),
        vec![Ev::RejectCancel {
            id: 7,
            reason: "unknown order".to_string()
        }]
    );

    // Fill bid 5 completely, then try to cancel it.
    h.add_order(bear, Side::Sell, 100, 98, aapl);
    let mark = h.event_count();
    h.cancel_order(lehm, 5);
    assert_eq!(
        h.decoded_from(mark),
        vec![Ev::RejectCancel {
            id: 5,
            reason: "too late to cancel".to_string()
        }]
    );

    // Cancelling an already-cancelled id is also too late.
    let mark = h.event_count();
    h.cancel_order(lehm, 4);
    assert_eq!(
        h.decoded_from(mark),
        vec![Ev::RejectCancel {
            id: 4,
            reason: "too late to cancel".to_string()
        }]
    );
}

#[test]
fn test_book_priority_invariant_after_every_command() {
    let mut h = Harness::new();
    let refdata = h.define_app("REFDATA01");
    let lehm = h.define_app("LEHM01");
    h.define_equity(refdata, "AAPL");
    let aapl = h.instrument("AAPL");

    let mut next_order = 1i64;
    for i in 0..100u32 {
        let side = if i % 3 == 0 { Side::Buy } else { Side::Sell };
        let price = i64::from(90 + (i * 7) % 20);
        let qty = 10 + (i as i32 % 5) * 10;
        h.add_order(lehm, side, qty, price, aapl);
        if i % 7 == 0 {
            h.cancel_order(lehm, next_order);
            next_order += 2;
        }

        let engine = h.engine.borrow();
        let book = engine.book(aapl).expect("Book should exist");
        assert!(book.bids.is_priority_sorted(), "bids unsorted after cmd {}", i);
        assert!(book.asks.is_priority_sorted(), "asks unsorted after cmd {}", i);
    }
}

#[test]
fn test_fills_never_cross_aggressor_limit() {
    let mut h = Harness::new();
    let refdata = h.define_app("REFDATA01");
    let lehm = h.define_app("LEHM01");
    let bear = h.define_app("BEAR01");
    h.define_equity(refdata, "AAPL");
    let aapl = h.instrument("AAPL");

    h.add_order(bear, Side::Sell, 100, 99, aapl);
    h.add_order(bear, Side::Sell, 100, 101, aapl);
    let mark = h.event_count();
    h.add_order(lehm, Side::Buy, 300, 100, aapl);

    let events = h.decoded_from(mark);
    for event in &events {
        if let Ev::Fill { price, .. } = event {
            assert!(*price <= 100, "fill through the buy limit: {:?}", event);
        }
    }
    // 100 filled at 99; 200 rests at 100; the 101 ask is untouched.
    let engine = h.engine.borrow();
    let book = engine.book(aapl).expect("Book should exist");
    assert_eq!(Harness::levels(&book.bids), vec![(100, 200, 3)]);
    assert_eq!(Harness::levels(&book.asks), vec![(101, 100, 2)]);
}

#[test]
fn test_out_of_sequence_command_is_sequencer_rejected() {
    let mut h = Harness::new();
    let refdata = h.define_app("REFDATA01");
    h.define_equity(refdata, "AAPL");
    let aapl = h.instrument("AAPL");
    let mark = h.event_count();

    // Skip a sequence number on purpose.
    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE];
    let mut encoder = AddOrderCommandEncoder::wrap(&mut buffer).expect("Wrap should succeed");
    encoder
        .set_side(Side::Buy)
        .set_quantity(10)
        .set_instrument_id(aapl)
        .set_price(50);
    let length = encoder.encoded_length();
    header::set_application_id(&mut buffer[..length], refdata).expect("Set app id");
    header::set_application_sequence_number(&mut buffer[..length], 99).expect("Set seq");
    h.server.on_command(&buffer[..length]);

    assert_eq!(
        h.decoded_from(mark),
        vec![Ev::SeqReject {
            reason: "out-of-sequence".to_string()
        }]
    );
}
