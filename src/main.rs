//! thermofan firmware - nRF52840 entry point.
//!
//! Wires the board peripherals to the [`Controller`] and runs it from a
//! fixed-period ticker. The QDEC peripheral is serviced by its own task;
//! everything else happens in the main loop.

#![no_std]
#![no_main]

mod board;

use defmt::{debug, error, info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::{bind_interrupts, peripherals, qdec, spim, twim};
use embassy_time::{Duration, Instant, Ticker};
use thermofan::config::{DisplayGeometry, POLL_INTERVAL_MS};
use thermofan::debounce::ButtonEvent;
use thermofan::{Controller, PollReport};
use {defmt_rtt as _, panic_probe as _};

use board::encoder::{qdec_task, SharedCounter};
use board::oled::OledDisplay;
use board::thermocouple::Max6675;
use board::uicr::Uicr;

bind_interrupts!(struct Irqs {
    QDEC => qdec::InterruptHandler<peripherals::QDEC>;
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Milliseconds since boot; wraps after ~49 days like the rest of the core.
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("thermofan starting");

    // Encoder
    let qdec = qdec::Qdec::new(p.QDEC, Irqs, p.P0_31, p.P0_30, qdec::Config::default());
    unwrap!(spawner.spawn(qdec_task(qdec)));
    let button = Input::new(p.P0_11, Pull::Up);

    // Thermocouple
    let mut spi_config = spim::Config::default();
    spi_config.frequency = spim::Frequency::M2;
    spi_config.mode = spim::MODE_0;
    let spi = spim::Spim::new_rxonly(p.SPI3, Irqs, p.P0_13, p.P0_14, spi_config);
    let cs = Output::new(p.P0_15, Level::High, OutputDrive::Standard);
    let sensor = Max6675::new(spi, cs);

    // Display
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut display = unwrap!(OledDisplay::init(i2c, DisplayGeometry::default()));

    let mut controller = Controller::new(
        SharedCounter,
        sensor,
        Uicr::new(p.NVMC),
        DisplayGeometry::default(),
        now_ms(),
    );
    info!("Settings loaded: {:?}", controller.menu().settings());
    controller.start(&mut display);

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    loop {
        let report = controller.poll(now_ms(), button.is_high(), &mut display);
        log_report(&report);
        ticker.next().await;
    }
}

fn log_report(report: &PollReport) {
    if report.woke {
        info!("Backlight: on");
    }
    if report.detents != 0 {
        debug!("Encoder: {} detents -> {:?}", report.detents, report.state);
    }
    match report.button {
        ButtonEvent::Pressed => info!("Button: pressed -> {:?}", report.state),
        ButtonEvent::ConsumedByWake => debug!("Button: press consumed by wake"),
        ButtonEvent::Idle => {}
    }
    match report.saved {
        Some(Ok(())) => info!("Settings saved"),
        Some(Err(e)) => error!("Settings save failed: {:?}", e),
        None => {}
    }
    if let Some(sample) = report.sample {
        if sample.fault {
            warn!("Thermocouple open");
        } else {
            debug!("Reading: {}", sample.value);
        }
    }
    if report.blanked {
        info!("Backlight: idle, off");
    }
}
