// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! DC motor bridge drivers.
//!
//! A [`MotorDrive`] takes an unsigned speed (`0..=255`) and a direction. Speed 0 always leaves the
//! bridge de-energized.
//!
//! | Driver           | Bridge                 | Control                                   |
//! |------------------|------------------------|-------------------------------------------|
//! | [`DirPinDrive`]  | VNH7070                | one PWM plus INA/INB direction pins       |
//! | [`PwmPairDrive`] | ZXBM5210, TB67H451     | separate forward and reverse PWM channels |
//!
//! Current sensing and fault inputs are optional and plug in through [`CurrentSensor`] and
//! [`FaultInput`]; `()` stands for "not fitted".

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use super::ActiveLevel;

/// VNH7070 sense scale, mA per 8-bit ADC count, in 1/256 units.
///
/// Sense ratio 1540, 1.5 kΩ sense resistor, 3.3 V reference, halved by the input divider.
pub const VNH7070_SENSE_SCALE: u32 = 1694;

/// Failure to drive the bridge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveError {
    /// The PWM channel rejected a duty cycle.
    Pwm,
    /// A direction pin could not be driven.
    Pin,
}

impl core::fmt::Display for DriveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DriveError::Pwm => f.write_str("PWM duty rejected"),
            DriveError::Pin => f.write_str("direction pin write failed"),
        }
    }
}

pub trait MotorDrive {
    /// Apply `speed` in direction `forward`. Speed 0 de-energizes the bridge.
    fn set(&mut self, speed: u8, forward: bool) -> Result<(), DriveError>;

    /// Motor current in mA, if the bridge has a sense output.
    fn current_ma(&mut self) -> Option<i16> {
        None
    }

    /// Whether the bridge reports a fault.
    fn fault(&mut self) -> bool {
        false
    }
}

pub trait CurrentSensor {
    fn milliamps(&mut self) -> Option<i16>;
}

impl CurrentSensor for () {
    fn milliamps(&mut self) -> Option<i16> {
        None
    }
}

/// One raw conversion from an ADC channel.
pub trait AdcSample {
    fn sample(&mut self) -> u16;
}

/// Current sense from a raw ADC channel, `raw * scale >> 8` mA.
pub struct CurrentSense<R> {
    read: R,
    scale: u32,
}

impl<R: AdcSample> CurrentSense<R> {
    pub fn new(read: R) -> Self {
        Self {
            read,
            scale: VNH7070_SENSE_SCALE,
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }
}

impl<R: AdcSample> CurrentSensor for CurrentSense<R> {
    fn milliamps(&mut self) -> Option<i16> {
        let raw = u32::from(self.read.sample());
        let ma = (raw * self.scale) >> 8;
        Some(ma.min(i16::MAX as u32) as i16)
    }
}

pub trait FaultInput {
    fn asserted(&mut self) -> bool;
}

impl FaultInput for () {
    fn asserted(&mut self) -> bool {
        false
    }
}

/// Bridge fault output wired to a GPIO.
pub struct FaultPin<P> {
    pin: P,
    active: ActiveLevel,
}

impl<P: InputPin> FaultPin<P> {
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        Self { pin, active }
    }
}

impl<P: InputPin> FaultInput for FaultPin<P> {
    fn asserted(&mut self) -> bool {
        let level = match self.active {
            ActiveLevel::High => self.pin.is_high(),
            ActiveLevel::Low => self.pin.is_low(),
        };
        // an unreadable fault line counts as a fault
        level.unwrap_or(true)
    }
}

#[inline]
fn apply_duty<P: SetDutyCycle>(pwm: &mut P, speed: u8) -> Result<(), DriveError> {
    pwm.set_duty_cycle_fraction(u16::from(speed), u16::from(u8::MAX))
        .map_err(|_| DriveError::Pwm)
}

/// PWM plus INA/INB direction pins.
///
/// Forward drives INB, reverse drives INA. Both are cleared before either is set, so the bridge
/// never sees both high.
pub struct DirPinDrive<P, A, B, S = (), F = ()> {
    pwm: P,
    in_a: A,
    in_b: B,
    sense: S,
    fault: F,
}

impl<P, A, B> DirPinDrive<P, A, B>
where
    P: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
{
    pub fn new(pwm: P, in_a: A, in_b: B) -> Self {
        Self {
            pwm,
            in_a,
            in_b,
            sense: (),
            fault: (),
        }
    }
}

impl<P, A, B, S, F> DirPinDrive<P, A, B, S, F>
where
    P: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
    S: CurrentSensor,
    F: FaultInput,
{
    pub fn with_current_sense<S2: CurrentSensor>(self, sense: S2) -> DirPinDrive<P, A, B, S2, F> {
        DirPinDrive {
            pwm: self.pwm,
            in_a: self.in_a,
            in_b: self.in_b,
            sense,
            fault: self.fault,
        }
    }

    pub fn with_fault<F2: FaultInput>(self, fault: F2) -> DirPinDrive<P, A, B, S, F2> {
        DirPinDrive {
            pwm: self.pwm,
            in_a: self.in_a,
            in_b: self.in_b,
            sense: self.sense,
            fault,
        }
    }

    pub fn free(self) -> (P, A, B, S, F) {
        (self.pwm, self.in_a, self.in_b, self.sense, self.fault)
    }
}

impl<P, A, B, S, F> MotorDrive for DirPinDrive<P, A, B, S, F>
where
    P: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
    S: CurrentSensor,
    F: FaultInput,
{
    fn set(&mut self, speed: u8, forward: bool) -> Result<(), DriveError> {
        self.in_a.set_low().map_err(|_| DriveError::Pin)?;
        self.in_b.set_low().map_err(|_| DriveError::Pin)?;
        apply_duty(&mut self.pwm, speed)?;
        if speed == 0 {
            return Ok(());
        }
        if forward {
            self.in_b.set_high().map_err(|_| DriveError::Pin)
        } else {
            self.in_a.set_high().map_err(|_| DriveError::Pin)
        }
    }

    fn current_ma(&mut self) -> Option<i16> {
        self.sense.milliamps()
    }

    fn fault(&mut self) -> bool {
        self.fault.asserted()
    }
}

/// Separate forward and reverse PWM channels.
///
/// The idle channel is zeroed before the active one is raised.
pub struct PwmPairDrive<Fw, Rv, S = ()> {
    forward: Fw,
    reverse: Rv,
    sense: S,
}

impl<Fw: SetDutyCycle, Rv: SetDutyCycle> PwmPairDrive<Fw, Rv> {
    pub fn new(forward: Fw, reverse: Rv) -> Self {
        Self {
            forward,
            reverse,
            sense: (),
        }
    }
}

impl<Fw: SetDutyCycle, Rv: SetDutyCycle, S: CurrentSensor> PwmPairDrive<Fw, Rv, S> {
    pub fn with_current_sense<S2: CurrentSensor>(self, sense: S2) -> PwmPairDrive<Fw, Rv, S2> {
        PwmPairDrive {
            forward: self.forward,
            reverse: self.reverse,
            sense,
        }
    }

    pub fn free(self) -> (Fw, Rv, S) {
        (self.forward, self.reverse, self.sense)
    }
}

impl<Fw: SetDutyCycle, Rv: SetDutyCycle, S: CurrentSensor> MotorDrive for PwmPairDrive<Fw, Rv, S> {
    fn set(&mut self, speed: u8, forward: bool) -> Result<(), DriveError> {
        if forward {
            apply_duty(&mut self.reverse, 0)?;
            apply_duty(&mut self.forward, speed)
        } else {
            apply_duty(&mut self.forward, 0)?;
            apply_duty(&mut self.reverse, speed)
        }
    }

    fn current_ma(&mut self) -> Option<i16> {
        self.sense.milliamps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::pwm::{ErrorKind, ErrorType as PwmErrorType};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Pin(char, bool),
        Duty(char, u16),
    }

    struct Pin<'a> {
        name: char,
        log: &'a RefCell<Vec<Event>>,
    }

    impl PinErrorType for Pin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Pin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Pin(self.name, false));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Pin(self.name, true));
            Ok(())
        }
    }

    struct Pwm<'a> {
        name: char,
        log: &'a RefCell<Vec<Event>>,
        broken: bool,
    }

    impl PwmErrorType for Pwm<'_> {
        type Error = ErrorKind;
    }

    impl SetDutyCycle for Pwm<'_> {
        fn max_duty_cycle(&self) -> u16 {
            255
        }
        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), ErrorKind> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.log.borrow_mut().push(Event::Duty(self.name, duty));
            Ok(())
        }
    }

    struct Fixed(u16);

    impl AdcSample for Fixed {
        fn sample(&mut self) -> u16 {
            self.0
        }
    }

    fn pwm<'a>(name: char, log: &'a RefCell<Vec<Event>>) -> Pwm<'a> {
        Pwm {
            name,
            log,
            broken: false,
        }
    }

    #[test]
    fn test_dir_pins_cleared_before_set() {
        let log = RefCell::new(Vec::new());
        let mut drive = DirPinDrive::new(
            pwm('p', &log),
            Pin { name: 'a', log: &log },
            Pin { name: 'b', log: &log },
        );

        drive.set(200, true).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Event::Pin('a', false),
                Event::Pin('b', false),
                Event::Duty('p', 200),
                Event::Pin('b', true),
            ]
        );

        log.borrow_mut().clear();
        drive.set(10, false).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Event::Pin('a', false),
                Event::Pin('b', false),
                Event::Duty('p', 10),
                Event::Pin('a', true),
            ]
        );
    }

    #[test]
    fn test_dir_speed_zero_leaves_bridge_off() {
        let log = RefCell::new(Vec::new());
        let mut drive = DirPinDrive::new(
            pwm('p', &log),
            Pin { name: 'a', log: &log },
            Pin { name: 'b', log: &log },
        );
        drive.set(0, true).unwrap();
        assert!(!log
            .borrow()
            .iter()
            .any(|e| matches!(e, Event::Pin(_, true))));
        assert!(log.borrow().contains(&Event::Duty('p', 0)));
    }

    #[test]
    fn test_pwm_error_reported() {
        let log = RefCell::new(Vec::new());
        let mut drive = DirPinDrive::new(
            Pwm {
                name: 'p',
                log: &log,
                broken: true,
            },
            Pin { name: 'a', log: &log },
            Pin { name: 'b', log: &log },
        );
        assert_eq!(drive.set(100, true), Err(DriveError::Pwm));
    }

    #[test]
    fn test_pwm_pair_zeroes_idle_channel_first() {
        let log = RefCell::new(Vec::new());
        let mut drive = PwmPairDrive::new(pwm('f', &log), pwm('r', &log));

        drive.set(120, true).unwrap();
        drive.set(80, false).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Event::Duty('r', 0),
                Event::Duty('f', 120),
                Event::Duty('f', 0),
                Event::Duty('r', 80),
            ]
        );
    }

    #[test]
    fn test_current_sense_scale() {
        let mut sense = CurrentSense::new(Fixed(100));
        // 100 * 1694 / 256
        assert_eq!(sense.milliamps(), Some(661));

        let mut saturated = CurrentSense::new(Fixed(u16::MAX));
        assert_eq!(saturated.milliamps(), Some(i16::MAX));
    }

    #[test]
    fn test_drive_reports_sense_and_fault() {
        struct Level(bool);
        impl PinErrorType for Level {
            type Error = Infallible;
        }
        impl InputPin for Level {
            fn is_high(&mut self) -> Result<bool, Infallible> {
                Ok(self.0)
            }
            fn is_low(&mut self) -> Result<bool, Infallible> {
                Ok(!self.0)
            }
        }

        let log = RefCell::new(Vec::new());
        let mut plain = DirPinDrive::new(
            pwm('p', &log),
            Pin { name: 'a', log: &log },
            Pin { name: 'b', log: &log },
        );
        assert_eq!(plain.current_ma(), None);
        assert!(!plain.fault());

        let mut fitted = plain
            .with_current_sense(CurrentSense::new(Fixed(256)).with_scale(1000))
            .with_fault(FaultPin::new(Level(false), ActiveLevel::Low));
        assert_eq!(fitted.current_ma(), Some(1000));
        assert!(fitted.fault());
    }
}
