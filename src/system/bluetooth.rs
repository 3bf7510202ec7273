//! Bluetooth module
//!
//! The companion app talks to the watch through two GATT services: a custom
//! settings service taking settings messages, and the standard Current Time
//! Service to set the wall clock.

// Core
use core::mem;

// BLE
use nrf_softdevice::{
    ble::{
        advertisement_builder::{
            Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
            ServiceUuid16,
        },
        gatt_server, peripheral,
    },
    raw, Config, Softdevice,
};

// Others
use chrono::NaiveDateTime;
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel, signal::Signal};
use heapless::Vec;

use super::{
    message::MAX_MESSAGE_LEN,
    time::{from_cts_bytes, CTS_LEN},
};

const DEVICE_NAME: &[u8] = b"PineTime";

/// Settings messages written by the companion app
pub static SETTINGS_MESSAGES: Channel<ThreadModeRawMutex, Vec<u8, MAX_MESSAGE_LEN>, 2> =
    Channel::new();

/// Local time written by the companion app
pub static TIME_SYNC: Signal<ThreadModeRawMutex, NaiveDateTime> = Signal::new();

pub static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Incomplete, &[ServiceUuid16::CURRENT_TIME])
    .full_name("PineTime")
    .build();

pub static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_16(ServiceList::Incomplete, &[ServiceUuid16::CURRENT_TIME])
    .build();

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub settings: SettingsService,
    pub cts: CurrentTimeService,
}

#[nrf_softdevice::gatt_service(uuid = "9e5d1440-6f1b-4a3c-8c34-0a1d5e7f1440")]
pub struct SettingsService {
    #[characteristic(uuid = "9e5d1441-6f1b-4a3c-8c34-0a1d5e7f1440", write)]
    pub message: Vec<u8, MAX_MESSAGE_LEN>,
}

#[nrf_softdevice::gatt_service(uuid = "1805")]
pub struct CurrentTimeService {
    #[characteristic(uuid = "2a2b", write)]
    pub current_time: [u8; CTS_LEN],
}

pub fn generate_config() -> Config {
    Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Advertise, serve one companion connection at a time and forward its writes.
pub async fn serve(sd: &'static Softdevice, server: &Server) -> ! {
    let config = peripheral::Config::default();
    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                defmt::warn!("Advertising failed: {:?}", e);
                continue;
            }
        };
        defmt::info!("Companion connected");

        let reason = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Settings(SettingsServiceEvent::MessageWrite(message)) => {
                defmt::info!("Settings message, {} bytes", message.len());
                if SETTINGS_MESSAGES.try_send(message).is_err() {
                    defmt::warn!("Settings queue full, message dropped");
                }
            }
            ServerEvent::Cts(CurrentTimeServiceEvent::CurrentTimeWrite(bytes)) => {
                match from_cts_bytes(&bytes) {
                    Ok(time) => TIME_SYNC.signal(time),
                    Err(e) => defmt::warn!("Invalid current time: {}", e),
                }
            }
        })
        .await;
        defmt::info!("Companion disconnected: {:?}", reason);
    }
}
