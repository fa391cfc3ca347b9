// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Axis controller firmware entry point.
//!
//! Boot wires the peripherals into an [`Axis`] and parks it in a [`Shared`] slot. From then on the
//! core sleeps and all work happens in three interrupts of equal priority:
//!
//! | Interrupt          | Work                                    |
//! |--------------------|-----------------------------------------|
//! | `I2C1_EV`/`I2C1_ER`| bus engine                              |
//! | `EXTI0`            | encoder channel A rising edge           |
//! | `TIM6_DAC`         | safety tick, status LED, re-arm the tick |

#![no_main]
#![no_std]

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_halt as _;

use stm32f7xx_hal::{
    gpio::{Floating, PullDown},
    pac::{self, interrupt},
    prelude::*,
};

use dcmotor_axis::config::{AddressConfig, AddressMode, AxisConfig};
use dcmotor_axis::drivers::{
    ActiveLevel, CurrentSense, DirPinDrive, Endstops, OutputLine, StepEncoder,
};
use dcmotor_axis::hw::config_pin::sense_axis;
use dcmotor_axis::hw::i2c_slave::TIMINGR_16MHZ;
use dcmotor_axis::hw::pins::{CURRENT_SENSE_CHANNEL, ENCODER_A_LINE, ENCODER_A_PORT};
use dcmotor_axis::hw::{
    Adc, AdcChannel, BoardPins, EdgeLine, I2cSlave, In, Out, PwmChannel, Tim4Pwm, TickTimer,
};
use dcmotor_axis::sync::Shared;
use dcmotor_axis::{log_info, log_warn, Axis, DeviceController, I2cSlaveEngine};

const CONFIG: AxisConfig =
    AxisConfig::new().with_address(AddressConfig::new(0x50, AddressMode::Single));

/// TIM4 prescaler: 16 MHz / 3 / 255 ≈ 21 kHz PWM.
const PWM_PRESCALER: u16 = 2;

type Motor = DirPinDrive<PwmChannel<1>, Out<'A', 3>, Out<'A', 4>, CurrentSense<AdcChannel>>;
type Limits = Endstops<In<'E', 0, PullDown>, In<'E', 1, PullDown>>;
type BoardAxis = Axis<I2cSlave, Motor, Limits, Out<'B', 0>, In<'A', 1, Floating>>;

struct Firmware {
    axis: BoardAxis,
    edge: EdgeLine,
    tick: TickTimer,
    led: OutputLine<Out<'D', 10>>,
}

static FIRMWARE: Shared<Option<Firmware>> = Shared::new(None);

fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

#[entry]
fn main() -> ! {
    let Some(dp) = pac::Peripherals::take() else {
        halt();
    };

    // Clocks: HSI 16 MHz, no bus prescalers
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);

    // Address
    let (axis_index, _strap) = sense_axis(pins.axis_strap);
    let filter = match CONFIG
        .validate()
        .and_then(|()| CONFIG.address.resolve(axis_index))
    {
        Ok(filter) => filter,
        Err(e) => {
            log_warn!("invalid configuration: {:?}", e);
            halt();
        }
    };
    log_info!(
        "axis {} on {:?}, telemetry {:?}, interlock {:?}",
        axis_index,
        filter,
        CONFIG.encoding,
        CONFIG.interlock
    );

    // Bus
    let bus = I2cSlave::i2c1(dp.I2C1, pins.i2c1, TIMINGR_16MHZ, filter);
    let engine = I2cSlaveEngine::new(bus, filter);

    // Motor
    let (pwm, _, _, _) = Tim4Pwm::new(dp.TIM4, PWM_PRESCALER).split();
    let sense = CurrentSense::new(Adc::adc1(dp.ADC1).channel(CURRENT_SENSE_CHANNEL));
    let motor = DirPinDrive::new(pwm, Out::new(pins.motor.in_a), Out::new(pins.motor.in_b))
        .with_current_sense(sense);

    let limits = Endstops::new(
        In::new(pins.endstops.first),
        In::new(pins.endstops.second),
        ActiveLevel::High,
    );
    let notify = OutputLine::active_low(Out::new(pins.notify));
    let device = DeviceController::new(CONFIG, motor, limits, notify);

    // Encoder
    let encoder = StepEncoder::new(In::new(pins.encoder.b));
    let edge = EdgeLine::rising(ENCODER_A_PORT, ENCODER_A_LINE);

    let led = OutputLine::active_low(Out::new(pins.led));
    let mut tick = TickTimer::tim6(dp.TIM6, clocks.pclk1().raw(), CONFIG.tick_ms);
    tick.rearm();

    FIRMWARE.replace(Some(Firmware {
        axis: Axis::new(engine, device, encoder),
        edge,
        tick,
        led,
    }));

    unsafe {
        pac::NVIC::unmask(pac::Interrupt::I2C1_EV);
        pac::NVIC::unmask(pac::Interrupt::I2C1_ER);
        pac::NVIC::unmask(pac::Interrupt::EXTI0);
        pac::NVIC::unmask(pac::Interrupt::TIM6_DAC);
    }

    log_info!("ready");
    halt();
}

#[interrupt]
fn I2C1_EV() {
    FIRMWARE.with_installed(|fw| fw.axis.on_bus_event());
}

#[interrupt]
fn I2C1_ER() {
    FIRMWARE.with_installed(|fw| fw.axis.on_bus_event());
}

#[interrupt]
fn EXTI0() {
    FIRMWARE.with_installed(|fw| {
        if fw.edge.clear_pending() {
            fw.axis.on_encoder_edge();
        }
    });
}

#[interrupt]
fn TIM6_DAC() {
    FIRMWARE.with_installed(|fw| {
        fw.tick.clear();
        fw.axis.on_tick();
        fw.led.set(fw.axis.device.is_running());
        fw.tick.rearm();
    });
}
