// On-target exercise routines for a wired-up TM1637 module.
//
// write_test walks both address modes and the brightness range with
// pauses long enough to check the LEDs by eye; read_test polls the key
// scan. Progress goes to the log. Both leave the driver deinitialised.

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::drivers::interface::Interface;
use crate::drivers::tm1637::{self, AddressMode, Error, PulseWidth, Tm1637};
use crate::font::DIGITS;

const SHOW_MS: u32 = 5000;
const STEP_MS: u32 = 3000;

pub fn log_info() {
    let i = tm1637::info();
    info!("tm1637: chip is {}.", i.chip_name);
    info!("tm1637: manufacturer is {}.", i.manufacturer_name);
    info!("tm1637: interface is {}.", i.interface);
    info!(
        "tm1637: driver version is {}.{}.",
        i.version_major(),
        i.version_minor()
    );
    info!("tm1637: min supply voltage is {:.1}V.", i.supply_voltage_min_v);
    info!("tm1637: max supply voltage is {:.1}V.", i.supply_voltage_max_v);
    info!("tm1637: max current is {:.2}mA.", i.max_current_ma);
    info!("tm1637: max temperature is {:.1}C.", i.temperature_max);
    info!("tm1637: min temperature is {:.1}C.", i.temperature_min);
}

pub fn write_test<I, D>(tm: &mut Tm1637<I>, delay: &mut D) -> Result<(), Error<I::Error>>
where
    I: Interface,
    D: DelayNs,
{
    log_info();
    info!("tm1637: start write test.");

    tm.init().inspect_err(|_| error!("tm1637: init failed."))?;

    if let Err(e) = write_sequence(tm, delay) {
        let _ = tm.deinit();
        return Err(e);
    }

    info!("tm1637: finish write test.");
    let _ = tm.deinit();
    Ok(())
}

fn write_sequence<I, D>(tm: &mut Tm1637<I>, delay: &mut D) -> Result<(), Error<I::Error>>
where
    I: Interface,
    D: DelayNs,
{
    info!("tm1637: address auto increment mode.");
    tm.set_pulse_width(PulseWidth::Div14_16)
        .inspect_err(|_| error!("tm1637: set pulse width failed."))?;
    tm.set_address_mode(AddressMode::AutoIncrement)
        .inspect_err(|_| error!("tm1637: set address mode failed."))?;
    tm.set_test_mode(false)
        .inspect_err(|_| error!("tm1637: set test mode failed."))?;
    tm.clear_segment()
        .inspect_err(|_| error!("tm1637: clear segment failed."))?;
    tm.set_display(true)
        .inspect_err(|_| error!("tm1637: set display failed."))?;
    tm.write_segment(0, &DIGITS[0..6])
        .inspect_err(|_| error!("tm1637: write segment failed."))?;
    delay.delay_ms(SHOW_MS);

    info!("tm1637: address fix mode.");
    tm.set_address_mode(AddressMode::Fixed)
        .inspect_err(|_| error!("tm1637: set address mode failed."))?;
    tm.write_segment(0, &DIGITS[1..7])
        .inspect_err(|_| error!("tm1637: write segment failed."))?;
    delay.delay_ms(SHOW_MS);

    for width in [PulseWidth::Div12_16, PulseWidth::Div10_16, PulseWidth::Div2_16] {
        info!("tm1637: set pulse width {}.", width.sixteenths());
        tm.set_pulse_width(width)
            .inspect_err(|_| error!("tm1637: set pulse width failed."))?;
        delay.delay_ms(STEP_MS);
    }

    info!("tm1637: display off.");
    tm.set_display(false)
        .inspect_err(|_| error!("tm1637: set display failed."))?;
    delay.delay_ms(STEP_MS);

    info!("tm1637: display on.");
    tm.set_pulse_width(PulseWidth::Div14_16)
        .inspect_err(|_| error!("tm1637: set pulse width failed."))?;
    tm.set_display(true)
        .inspect_err(|_| error!("tm1637: set display failed."))?;
    delay.delay_ms(STEP_MS);

    Ok(())
}

/// Poll the key scan `times` times, one read every three seconds.
pub fn read_test<I, D>(tm: &mut Tm1637<I>, delay: &mut D, times: u32) -> Result<(), Error<I::Error>>
where
    I: Interface,
    D: DelayNs,
{
    log_info();
    info!("tm1637: start read test.");

    tm.init().inspect_err(|_| error!("tm1637: init failed."))?;

    for _ in 0..times {
        delay.delay_ms(STEP_MS);
        match tm.read_segment() {
            Ok(key) => {
                info!("tm1637: seg: 0x{:02X}.", key.seg);
                info!("tm1637: k: 0x{:02X}.", key.k);
            }
            Err(e) => {
                error!("tm1637: read segment failed.");
                let _ = tm.deinit();
                return Err(e);
            }
        }
    }

    info!("tm1637: finish read test.");
    let _ = tm.deinit();
    Ok(())
}
