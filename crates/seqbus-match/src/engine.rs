// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The matching engine.
//!
//! One [`MatchEngine`] instance handles `EquityDefinition`,
//! `AddOrderCommand`, and `CancelOrderCommand` on the sequencer. Validation
//! failures become `RejectOrder`/`RejectCancel` events; a handler error (and
//! therefore a `SequencerReject`) only happens on internal encoding faults.
//!
//! Matching walks the opposite book in strict price-then-time priority.
//! Fills trade at the resting order's price, aggressor and passive fill
//! events alternate, and a fill through the aggressor's limit price cannot
//! occur because the walk stops at the first non-crossing order.

use std::collections::HashMap;

use log::debug;

use seqbus::codec::header;
use seqbus::core::list::{Handle, NIL};
use seqbus::sequencer::{CommandHandler, SequencerContext};

use crate::book::{InstrumentBook, Order};
use crate::messages::{
    message_type, AddOrderCommandDecoder, AddOrderEncoder, CancelOrderCommandDecoder,
    CancelOrderEncoder, EquityDefinitionDecoder, EquityDefinitionEncoder, FillOrderEncoder,
    RejectCancelEncoder, RejectOrderEncoder, Side,
};

/// Entity kind used for instrument registration and foreign-key checks.
const EQUITY_ENTITY: &str = "equity";

struct OrderRef {
    instrument_id: i32,
    side: Side,
    handle: Handle,
}

/// Per-instrument books plus the global order index.
pub struct MatchEngine {
    books: HashMap<i32, InstrumentBook>,
    orders: HashMap<i64, OrderRef>,
    next_order_id: i64,
    arrival: u64,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self {
            books: HashMap::new(),
            orders: HashMap::new(),
            next_order_id: 1,
            arrival: 0,
        }
    }

    /// Book for `instrument_id`, if the instrument has been defined.
    pub fn book(&self, instrument_id: i32) -> Option<&InstrumentBook> {
        self.books.get(&instrument_id)
    }

    /// Number of resting orders across all books.
    pub fn resting_orders(&self) -> usize {
        self.orders.len()
    }

    fn on_equity_definition(
        &mut self,
        command: &[u8],
        ctx: &mut SequencerContext<'_>,
    ) -> Result<(), String> {
        let mut decoder = EquityDefinitionDecoder::wrap(command).map_err(|e| e.to_string())?;
        let symbol = decoder
            .symbol()
            .map_err(|e| e.to_string())?
            .ok_or("missing symbol")?
            .to_vec();

        let instrument_id = ctx.entities_mut().define(EQUITY_ENTITY, &symbol) as i32;
        self.books.entry(instrument_id).or_default();

        let mut encoder =
            EquityDefinitionEncoder::wrap(ctx.acquire()).map_err(|e| e.to_string())?;
        encoder.set_instrument_id(instrument_id);
        encoder.set_symbol(&symbol).map_err(|e| e.to_string())?;
        let length = encoder.encoded_length();
        ctx.commit(length)
    }

    fn on_add_order(
        &mut self,
        command: &[u8],
        ctx: &mut SequencerContext<'_>,
    ) -> Result<(), String> {
        let decoder = AddOrderCommandDecoder::wrap(command).map_err(|e| e.to_string())?;
        let quantity = decoder.quantity();
        let price = decoder.price();
        let side_raw = decoder.side_raw();
        let instrument_id = decoder.instrument_id();

        if quantity <= 0 {
            return emit_reject_order(ctx, "invalid qty");
        }
        if price <= 0 {
            return emit_reject_order(ctx, "invalid price");
        }
        let Some(side) = Side::from_byte(side_raw) else {
            return emit_reject_order(ctx, "invalid side");
        };
        if !ctx.entities().exists(EQUITY_ENTITY, instrument_id.max(0) as u64) {
            return emit_reject_order(ctx, "invalid instrumentId");
        }

        let order_id = self.next_order_id;
        self.next_order_id += 1;
        self.arrival += 1;
        let arrival = self.arrival;

        emit_add_order(ctx, order_id, side, quantity, instrument_id, price)?;

        let book = self
            .books
            .get_mut(&instrument_id)
            .ok_or("book missing for defined instrument")?;

        let mut remaining = quantity;
        loop {
            let opposite = book.opposite_mut(side);
            let best_handle = opposite.best_handle();
            if best_handle == NIL {
                break;
            }
            let (passive_id, passive_price, passive_remaining) = {
                let best = opposite.get(best_handle);
                (best.order_id, best.price, best.remaining)
            };
            let crosses = match side {
                Side::Buy => price >= passive_price,
                Side::Sell => price <= passive_price,
            };
            if !crosses {
                break;
            }

            let fill = remaining.min(passive_remaining);
            remaining -= fill;
            let passive_left = passive_remaining - fill;

            // Fills trade at the resting price; aggressor then passive.
            emit_fill(ctx, order_id, passive_id, passive_price, fill, remaining)?;
            emit_fill(ctx, passive_id, order_id, passive_price, fill, passive_left)?;

            if passive_left == 0 {
                opposite.remove(best_handle);
                self.orders.remove(&passive_id);
            } else {
                opposite.get_mut(best_handle).remaining = passive_left;
            }
            if remaining == 0 {
                break;
            }
        }

        if remaining > 0 {
            let handle = book.side_mut(side).insert(Order {
                order_id,
                side,
                remaining,
                instrument_id,
                price,
                arrival,
            });
            self.orders.insert(
                order_id,
                OrderRef {
                    instrument_id,
                    side,
                    handle,
                },
            );
        }
        Ok(())
    }

    fn on_cancel_order(
        &mut self,
        command: &[u8],
        ctx: &mut SequencerContext<'_>,
    ) -> Result<(), String> {
        let decoder = CancelOrderCommandDecoder::wrap(command).map_err(|e| e.to_string())?;
        let order_id = decoder.order_id();

        match self.orders.remove(&order_id) {
            Some(entry) => {
                let book = self
                    .books
                    .get_mut(&entry.instrument_id)
                    .ok_or("book missing for resting order")?;
                book.side_mut(entry.side).remove(entry.handle);

                let mut encoder =
                    CancelOrderEncoder::wrap(ctx.acquire()).map_err(|e| e.to_string())?;
                encoder.set_order_id(order_id);
                let length = encoder.encoded_length();
                ctx.commit(length)
            }
            None if order_id >= 1 && order_id < self.next_order_id => {
                // Once on the book, now filled or cancelled.
                emit_reject_cancel(ctx, order_id, "too late to cancel")
            }
            None => emit_reject_cancel(ctx, order_id, "unknown order"),
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler for MatchEngine {
    fn on_command(
        &mut self,
        command: &[u8],
        ctx: &mut SequencerContext<'_>,
    ) -> Result<(), String> {
        let message_type = header::message_type(command).map_err(|e| e.to_string())?;
        match message_type {
            message_type::EQUITY_DEFINITION => self.on_equity_definition(command, ctx),
            message_type::ADD_ORDER_COMMAND => self.on_add_order(command, ctx),
            message_type::CANCEL_ORDER_COMMAND => self.on_cancel_order(command, ctx),
            other => Err(format!("unexpected message type {}", other)),
        }
    }
}

fn emit_add_order(
    ctx: &mut SequencerContext<'_>,
    order_id: i64,
    side: Side,
    quantity: i32,
    instrument_id: i32,
    price: i64,
) -> Result<(), String> {
    let mut encoder = AddOrderEncoder::wrap(ctx.acquire()).map_err(|e| e.to_string())?;
    encoder
        .set_order_id(order_id)
        .set_side(side)
        .set_quantity(quantity)
        .set_instrument_id(instrument_id)
        .set_price(price);
    let length = encoder.encoded_length();
    ctx.commit(length)
}

fn emit_fill(
    ctx: &mut SequencerContext<'_>,
    order_id: i64,
    counterparty_order_id: i64,
    price: i64,
    fill_quantity: i32,
    remaining_quantity: i32,
) -> Result<(), String> {
    let mut encoder = FillOrderEncoder::wrap(ctx.acquire()).map_err(|e| e.to_string())?;
    encoder
        .set_order_id(order_id)
        .set_counterparty_order_id(counterparty_order_id)
        .set_price(price)
        .set_fill_quantity(fill_quantity)
        .set_remaining_quantity(remaining_quantity);
    let length = encoder.encoded_length();
    ctx.commit(length)
}

fn emit_reject_order(ctx: &mut SequencerContext<'_>, reason: &str) -> Result<(), String> {
    debug!("order rejected: {}", reason);
    let mut encoder = RejectOrderEncoder::wrap(ctx.acquire()).map_err(|e| e.to_string())?;
    encoder
        .set_reason(reason.as_bytes())
        .map_err(|e| e.to_string())?;
    let length = encoder.encoded_length();
    ctx.commit(length)
}

fn emit_reject_cancel(
    ctx: &mut SequencerContext<'_>,
    order_id: i64,
    reason: &str,
) -> Result<(), String> {
    debug!("cancel of {} rejected: {}", order_id, reason);
    let mut encoder = RejectCancelEncoder::wrap(ctx.acquire()).map_err(|e| e.to_string())?;
    encoder.set_order_id(order_id);
    encoder
        .set_reason(reason.as_bytes())
        .map_err(|e| e.to_string())?;
    let length = encoder.encoded_length();
    ctx.commit(length)
}
