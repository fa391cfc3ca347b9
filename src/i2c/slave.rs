// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-driven I2C slave byte engine.
//!
//! The engine never blocks and never buffers. Each call to
//! [`on_interrupt`](I2cSlaveEngine::on_interrupt) reacts to whatever the peripheral latched:
//!
//! - **stop condition**: the session ends.
//! - **address match**: a new session starts at byte index 0 in the direction the master asked
//!   for, provided the address passes the [`AddressFilter`].
//! - **data ready**: on a master read the handler produces the next byte, on a master write the
//!   latched byte is handed to the handler, whose answer picks ACK or NACK.
//!
//! What bytes mean is entirely up to the [`SlaveHandler`].

use crate::i2c::AddressFilter;

/// Byte sent when the handler has nothing (more) to say.
pub const FILLER: u8 = 0xFF;

/// Transfer direction, from the master's point of view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master reads, slave transmits.
    Read,
    /// Master writes, slave receives.
    Write,
}

/// Answer to an inbound byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxResponse {
    /// Acknowledge and keep receiving.
    Ack,
    /// Refuse the byte and end the transfer.
    Nack,
}

/// Byte-level policy of a slave device.
pub trait SlaveHandler {
    /// Byte `index` of the current master read, or `None` when there is nothing more to send.
    fn produce_outbound_byte(&mut self, index: usize) -> Option<u8>;

    /// Byte `index` of the current master write.
    fn consume_inbound_byte(&mut self, index: usize, value: u8) -> RxResponse;
}

/// Interrupt conditions and bus status latched by the peripheral, read in one go.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusStatus {
    pub address_match: bool,
    pub data_ready: bool,
    pub stop: bool,
    /// R/W bit of the last address byte.
    pub direction: Direction,
    /// 7-bit address of the last address byte.
    pub address: u8,
}

impl BusStatus {
    pub const fn idle() -> Self {
        Self {
            address_match: false,
            data_ready: false,
            stop: false,
            direction: Direction::Write,
            address: 0,
        }
    }
}

/// Register-level operations of a slave-mode peripheral.
pub trait SlaveBus {
    /// Snapshot of the pending interrupt flags and the bus status.
    fn status(&mut self) -> BusStatus;

    /// Acknowledge (or refuse) the address byte and clear the address-match flag.
    fn ack_address(&mut self, ack: bool);

    /// Byte latched by a master write.
    fn read_data(&mut self) -> u8;

    /// Load the next byte of a master read.
    fn write_data(&mut self, byte: u8);

    /// ACK and continue, or NACK and end the transfer, after a received byte.
    fn respond(&mut self, response: RxResponse);

    /// Clear the stop-condition flag.
    fn clear_stop(&mut self);

    /// Silicon erratum: after a transmitted data byte, SDA must be released by briefly detaching
    /// the pin from the peripheral, or the following STOP goes unnoticed.
    fn rearm_stop_detection(&mut self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    Idle,
    AddrMatched,
    Transferring,
}

/// Per-transaction bookkeeping, alive from address match to stop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolSession {
    pub direction: Direction,
    pub index: usize,
    /// A byte was refused; everything after it is refused too.
    pub nack_pending: bool,
}

impl ProtocolSession {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            index: 0,
            nack_pending: false,
        }
    }
}

pub struct I2cSlaveEngine<B: SlaveBus> {
    bus: B,
    filter: AddressFilter,
    state: SessionState,
    session: Option<ProtocolSession>,
}

impl<B: SlaveBus> I2cSlaveEngine<B> {
    pub fn new(bus: B, filter: AddressFilter) -> Self {
        Self {
            bus,
            filter,
            state: SessionState::Idle,
            session: None,
        }
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn session(&self) -> Option<&ProtocolSession> {
        self.session.as_ref()
    }

    #[inline]
    pub fn filter(&self) -> AddressFilter {
        self.filter
    }

    /// Access the underlying peripheral.
    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn free(self) -> B {
        self.bus
    }

    /// Service one peripheral interrupt.
    pub fn on_interrupt<H: SlaveHandler>(&mut self, handler: &mut H) {
        let status = self.bus.status();

        if status.stop {
            self.bus.clear_stop();
            self.end_session();
        }

        if status.address_match {
            self.begin_session(status);
        }

        if status.data_ready {
            self.transfer_byte(handler, status.direction);
        }
    }

    fn begin_session(&mut self, status: BusStatus) {
        // a repeated start ends the previous session without a stop
        self.end_session();

        if !self.filter.matches(status.address) {
            self.bus.ack_address(false);
            return;
        }

        self.bus.ack_address(true);
        self.session = Some(ProtocolSession::new(status.direction));
        self.state = SessionState::AddrMatched;
    }

    fn end_session(&mut self) {
        self.session = None;
        self.state = SessionState::Idle;
    }

    fn transfer_byte<H: SlaveHandler>(&mut self, handler: &mut H, bus_direction: Direction) {
        let Some(session) = self.session.as_mut() else {
            // data without a session of ours: keep the bus moving, claim nothing
            match bus_direction {
                Direction::Read => self.bus.write_data(FILLER),
                Direction::Write => {
                    let _ = self.bus.read_data();
                    self.bus.respond(RxResponse::Nack);
                }
            }
            return;
        };

        self.state = SessionState::Transferring;
        let index = session.index;
        session.index = session.index.saturating_add(1);

        match session.direction {
            Direction::Read => match handler.produce_outbound_byte(index) {
                Some(byte) => {
                    self.bus.write_data(byte);
                    // any produced byte may be the master's last one
                    self.bus.rearm_stop_detection();
                }
                None => self.bus.write_data(FILLER),
            },

            Direction::Write => {
                let value = self.bus.read_data();
                let response = if session.nack_pending {
                    RxResponse::Nack
                } else {
                    handler.consume_inbound_byte(index, value)
                };
                if response == RxResponse::Nack {
                    session.nack_pending = true;
                }
                self.bus.respond(response);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Op {
        AckAddress(bool),
        Write(u8),
        Respond(RxResponse),
        ClearStop,
        Rearm,
    }

    /// Scripted peripheral: one pending status per interrupt, records every register action.
    struct MockBus {
        pending: BusStatus,
        rx: u8,
        ops: [Option<Op>; 256],
        n: usize,
    }

    impl MockBus {
        fn new() -> Self {
            Self {
                pending: BusStatus::idle(),
                rx: 0,
                ops: [None; 256],
                n: 0,
            }
        }

        fn log(&mut self, op: Op) {
            self.ops[self.n] = Some(op);
            self.n += 1;
        }

        fn ops(&self) -> &[Option<Op>] {
            &self.ops[..self.n]
        }

        fn clear_ops(&mut self) {
            self.n = 0;
        }
    }

    impl SlaveBus for MockBus {
        fn status(&mut self) -> BusStatus {
            self.pending
        }
        fn ack_address(&mut self, ack: bool) {
            self.log(Op::AckAddress(ack));
        }
        fn read_data(&mut self) -> u8 {
            self.rx
        }
        fn write_data(&mut self, byte: u8) {
            self.log(Op::Write(byte));
        }
        fn respond(&mut self, response: RxResponse) {
            self.log(Op::Respond(response));
        }
        fn clear_stop(&mut self) {
            self.log(Op::ClearStop);
        }
        fn rearm_stop_detection(&mut self) {
            self.log(Op::Rearm);
        }
    }

    /// Four-byte receive buffer, two-byte transmit buffer.
    struct BufferHandler {
        rx: [u8; 4],
        tx: [u8; 2],
    }

    impl SlaveHandler for BufferHandler {
        fn produce_outbound_byte(&mut self, index: usize) -> Option<u8> {
            self.tx.get(index).copied()
        }

        fn consume_inbound_byte(&mut self, index: usize, value: u8) -> RxResponse {
            match self.rx.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    RxResponse::Ack
                }
                None => RxResponse::Nack,
            }
        }
    }

    const ADDR: u8 = 0x50;

    fn engine() -> I2cSlaveEngine<MockBus> {
        I2cSlaveEngine::new(
            MockBus::new(),
            AddressFilter::Masked {
                address: ADDR,
                mask: 0,
            },
        )
    }

    fn handler() -> BufferHandler {
        BufferHandler {
            rx: [0; 4],
            tx: [0x11, 0x22],
        }
    }

    fn address(e: &mut I2cSlaveEngine<MockBus>, h: &mut BufferHandler, addr: u8, dir: Direction) {
        e.bus().pending = BusStatus {
            address_match: true,
            direction: dir,
            address: addr,
            ..BusStatus::idle()
        };
        e.on_interrupt(h);
    }

    fn data(e: &mut I2cSlaveEngine<MockBus>, h: &mut BufferHandler, dir: Direction, rx: u8) {
        e.bus().rx = rx;
        e.bus().pending = BusStatus {
            data_ready: true,
            direction: dir,
            address: ADDR,
            ..BusStatus::idle()
        };
        e.on_interrupt(h);
    }

    fn stop(e: &mut I2cSlaveEngine<MockBus>, h: &mut BufferHandler) {
        e.bus().pending = BusStatus {
            stop: true,
            ..BusStatus::idle()
        };
        e.on_interrupt(h);
    }

    #[test]
    fn test_address_match_opens_session() {
        let mut e = engine();
        let mut h = handler();
        address(&mut e, &mut h, ADDR, Direction::Write);

        assert_eq!(e.state(), SessionState::AddrMatched);
        assert_eq!(e.session().map(|s| s.index), Some(0));
        assert_eq!(e.bus().ops(), &[Some(Op::AckAddress(true))]);
    }

    #[test]
    fn test_foreign_address_is_refused() {
        let mut e = engine();
        let mut h = handler();
        address(&mut e, &mut h, ADDR + 1, Direction::Write);

        assert_eq!(e.state(), SessionState::Idle);
        assert_eq!(e.bus().ops(), &[Some(Op::AckAddress(false))]);
    }

    #[test]
    fn test_master_write_stores_and_acks() {
        let mut e = engine();
        let mut h = handler();
        address(&mut e, &mut h, ADDR, Direction::Write);
        for b in [1u8, 2, 3] {
            data(&mut e, &mut h, Direction::Write, b);
        }

        assert_eq!(e.state(), SessionState::Transferring);
        assert_eq!(&h.rx[..3], &[1, 2, 3]);
        assert_eq!(e.session().map(|s| s.index), Some(3));
    }

    #[test]
    fn test_overflow_nacks_at_capacity_and_stays_nacked() {
        let mut e = engine();
        let mut h = handler();
        address(&mut e, &mut h, ADDR, Direction::Write);
        e.bus().clear_ops();

        for i in 0..200u32 {
            data(&mut e, &mut h, Direction::Write, i as u8);
        }

        let ops = e.bus().ops();
        assert!(ops[..4]
            .iter()
            .all(|op| *op == Some(Op::Respond(RxResponse::Ack))));
        assert!(ops[4..]
            .iter()
            .all(|op| *op == Some(Op::Respond(RxResponse::Nack))));
        assert_eq!(h.rx, [0, 1, 2, 3]);
        assert!(e.session().map_or(false, |s| s.nack_pending));
    }

    #[test]
    fn test_master_read_rearms_after_each_real_byte() {
        let mut e = engine();
        let mut h = handler();
        address(&mut e, &mut h, ADDR, Direction::Read);
        e.bus().clear_ops();

        for _ in 0..3 {
            data(&mut e, &mut h, Direction::Read, 0);
        }

        assert_eq!(
            e.bus().ops(),
            &[
                Some(Op::Write(0x11)),
                Some(Op::Rearm),
                Some(Op::Write(0x22)),
                Some(Op::Rearm),
                Some(Op::Write(FILLER)),
            ]
        );
    }

    #[test]
    fn test_stop_ends_session_and_next_match_restarts_index() {
        let mut e = engine();
        let mut h = handler();
        address(&mut e, &mut h, ADDR, Direction::Write);
        data(&mut e, &mut h, Direction::Write, 9);
        stop(&mut e, &mut h);

        assert_eq!(e.state(), SessionState::Idle);
        assert!(e.session().is_none());

        address(&mut e, &mut h, ADDR, Direction::Write);
        data(&mut e, &mut h, Direction::Write, 7);
        assert_eq!(h.rx[0], 7);
    }

    #[test]
    fn test_data_without_session_is_not_claimed() {
        let mut e = engine();
        let mut h = handler();
        data(&mut e, &mut h, Direction::Write, 5);
        data(&mut e, &mut h, Direction::Read, 0);

        assert_eq!(h.rx, [0; 4]);
        assert_eq!(
            e.bus().ops(),
            &[Some(Op::Respond(RxResponse::Nack)), Some(Op::Write(FILLER))]
        );
    }
}
