// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Inbound command frames.
//!
//! A master write carries one frame: byte 0 is the command tag, the rest is a fixed-size
//! little-endian payload. Bytes are stored at their transfer index as they arrive, and a command
//! fires exactly when the byte at index `payload_len(tag)` lands. Short frames never fire, and
//! bytes past the payload are stored but fire nothing.

// Command tags
pub const CMD_NONE: u8 = 0;
pub const CMD_SET_SPEED: u8 = 1;
pub const CMD_SET_END_STEPS: u8 = 2;
pub const CMD_SETUP: u8 = 3;
pub const CMD_START: u8 = 4;
pub const CMD_STOP: u8 = 5;
pub const CMD_SET: u8 = 6;
pub const CMD_CLEAR_ERRORS: u8 = 7;

/// Frame buffer size: tag byte plus the largest payload (SETUP).
pub const FRAME_CAPACITY: usize = 1 + 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandTag {
    None,
    SetSpeed,
    SetEndSteps,
    Setup,
    Start,
    Stop,
    Set,
    ClearErrors,
}

impl CommandTag {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            CMD_NONE => Some(Self::None),
            CMD_SET_SPEED => Some(Self::SetSpeed),
            CMD_SET_END_STEPS => Some(Self::SetEndSteps),
            CMD_SETUP => Some(Self::Setup),
            CMD_START => Some(Self::Start),
            CMD_STOP => Some(Self::Stop),
            CMD_SET => Some(Self::Set),
            CMD_CLEAR_ERRORS => Some(Self::ClearErrors),
            _ => None,
        }
    }

    /// Payload size registered for this tag. `None` for [`CommandTag::None`], which never fires.
    pub const fn payload_len(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::SetSpeed => Some(1),
            Self::SetEndSteps => Some(4),
            Self::Setup => Some(9),
            Self::Start | Self::Stop | Self::ClearErrors => Some(0),
            Self::Set => Some(2),
        }
    }
}

/// A decoded, complete command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    SetSpeed(u8),
    SetEndSteps(i32),
    Setup {
        end_steps: i32,
        end_time_ms: u32,
        start_immediately: bool,
    },
    Start,
    Stop,
    /// Open-loop drive.
    Set { duty: u8, forward: bool },
    ClearErrors,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Byte index does not fit the frame buffer.
    Overflow { index: usize },
}

/// Receive buffer for one command frame.
pub struct CommandFrame {
    buf: [u8; FRAME_CAPACITY],
}

impl CommandFrame {
    pub const fn new() -> Self {
        Self {
            buf: [CMD_NONE; FRAME_CAPACITY],
        }
    }

    /// Store a byte at its transfer index.
    ///
    /// Returns `Ok(Some(cmd))` when this byte completes the frame for the tag currently held at
    /// index 0, and an error if the index is beyond the buffer (nothing is stored then).
    pub fn store(&mut self, index: usize, value: u8) -> Result<Option<Command>, FrameError> {
        let slot = self
            .buf
            .get_mut(index)
            .ok_or(FrameError::Overflow { index })?;
        *slot = value;

        let complete = CommandTag::from_byte(self.buf[0])
            .and_then(CommandTag::payload_len)
            .map_or(false, |len| len == index);

        Ok(if complete { self.decode() } else { None })
    }

    /// Tag byte currently at the head of the buffer.
    #[inline]
    pub fn tag(&self) -> u8 {
        self.buf[0]
    }

    fn decode(&self) -> Option<Command> {
        let p = &self.buf[1..];
        let cmd = match CommandTag::from_byte(self.buf[0])? {
            CommandTag::None => return None,
            CommandTag::SetSpeed => Command::SetSpeed(p[0]),
            CommandTag::SetEndSteps => Command::SetEndSteps(read_i32(&p[0..4])),
            CommandTag::Setup => Command::Setup {
                end_steps: read_i32(&p[0..4]),
                end_time_ms: read_u32(&p[4..8]),
                start_immediately: p[8] & 1 != 0,
            },
            CommandTag::Start => Command::Start,
            CommandTag::Stop => Command::Stop,
            CommandTag::Set => Command::Set {
                duty: p[0],
                forward: p[1] & 1 != 0,
            },
            CommandTag::ClearErrors => Command::ClearErrors,
        };
        Some(cmd)
    }
}

impl Default for CommandFrame {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn read_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
fn read_i32(b: &[u8]) -> i32 {
    read_u32(b) as i32
}
