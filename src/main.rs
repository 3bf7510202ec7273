#![no_std]
#![no_main]

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_nrf::{
    bind_interrupts,
    gpio::{Level, Output, OutputDrive},
    interrupt::{self, InterruptExt, Priority},
    peripherals::SPI2,
    spim,
};
use embassy_time::{Instant, Timer};
use nrf_softdevice::{Flash, Softdevice};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use pinetime_1440::{
    peripherals::display::{BacklightPins, Brightness, Display},
    system::{
        app::App,
        bluetooth::{self, Server, SETTINGS_MESSAGES, TIME_SYNC},
        clock::{Clock, TimeReference},
        config::SystemConfig,
        flash::{self, FlashStore, PENDING_WRITE},
    },
    ui::{DotWatchface, WatchfaceConfig},
};

// Include current UTC epoch and offset at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

static SERVER: StaticCell<Server> = StaticCell::new();

/// Run the SoftDevice event loop
#[embassy_executor::task]
async fn softdevice(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Serve the companion app
#[embassy_executor::task]
async fn companion(sd: &'static Softdevice, server: &'static Server) -> ! {
    bluetooth::serve(sd, server).await
}

/// Write queued settings to flash
#[embassy_executor::task]
async fn persist_settings(mut flash: Flash) -> ! {
    loop {
        let slot = PENDING_WRITE.wait().await;
        match flash::flush(&mut flash, &slot).await {
            Ok(()) => defmt::info!("Settings written to flash"),
            Err(e) => defmt::warn!("Writing settings failed: {}", e),
        }
    }
}

/// Watchface event loop: one event at a time, repaint when the face is dirty
#[embassy_executor::task]
async fn watchface(mut display: Display<SPI2>, mut app: App<FlashStore>, mut clock: Clock) -> ! {
    let mut face = DotWatchface::new(WatchfaceConfig::default());
    loop {
        if app.take_redraw() {
            let now = clock.now();
            defmt::info!("Redraw at {}", defmt::Debug2Format(&now));
            let state = app.watchface_state(now, Instant::now().as_ticks());
            if let Err(e) = display.draw_face(&mut face, &state) {
                defmt::warn!("Painting the face failed: {}", e);
            }
        }

        match select3(
            Timer::at(clock.next_minute()),
            SETTINGS_MESSAGES.receive(),
            TIME_SYNC.wait(),
        )
        .await
        {
            Either3::First(()) => {
                app.on_minute_tick(&clock.now());
            }
            Either3::Second(message) => {
                // Malformed messages are logged and dropped by the app
                let _ = app.on_settings_message(&message);
            }
            Either3::Third(time) => {
                defmt::info!("Clock set to {}", defmt::Debug2Format(&time));
                clock.set(TimeReference::from_datetime(time));
                app.on_time_adjusted();
            }
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(SystemConfig::new());
    defmt::info!("Initializing");

    // Keep the SPI interrupt clear of the priorities reserved by the SoftDevice
    interrupt::SPIM2_SPIS2_SPI2.set_priority(Priority::P3);

    // Initialize Bluetooth
    let sd = Softdevice::enable(&bluetooth::generate_config());
    let server = SERVER.init(unwrap!(Server::new(sd)));
    unwrap!(spawner.spawn(softdevice(sd)));

    // Restore settings, flash operations need the SoftDevice running
    let mut flash = Flash::take(sd);
    let store = FlashStore::load(&mut flash).await;
    let app = App::new(store);

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let backlight = BacklightPins::init(
        Output::new(p.P0_14, Level::High, OutputDrive::Standard),
        Output::new(p.P0_22, Level::High, OutputDrive::Standard),
        Output::new(p.P0_23, Level::High, OutputDrive::Standard),
    );
    let mut display = unwrap!(Display::init(
        spim,
        Output::new(p.P0_25, Level::High, OutputDrive::Standard),
        Output::new(p.P0_18, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26, Level::Low, OutputDrive::Standard),
        backlight,
    ));
    display.set_brightness(Brightness::LEVEL2);

    // Start the clock from the build time
    let clock = Clock::new(TimeReference::from_timestamp(UTC_EPOCH, UTC_OFFSET_SECS));

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(persist_settings(flash)));
    unwrap!(spawner.spawn(companion(sd, server)));
    unwrap!(spawner.spawn(watchface(display, app, clock)));
}
