// TM1637 demo for an ESP32-C3 devkit
//
// Boot sequence: logger -> hardware -> optional self tests -> clock
// Main loop: WFI until the 1s timer fires, redraw MM:SS, poll the keys.
//
// The self tests borrow the bus through `&mut`, so the same pins are
// handed to the display afterwards without rebuilding anything.

#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::time::Duration;
use esp_hal::timer::PeriodicTimer;
use esp_hal::timer::timg::TimerGroup;
use log::{info, warn};

use tm1637::board::Board;
use tm1637::font::{DIGITS, Segments};
use tm1637::{Basic, Config, KeyScan, PulseWidth, Tm1637, selftest};

esp_bootloader_esp_idf::esp_app_desc!();

const RUN_SELFTEST: bool = true;
const READ_TEST_TIMES: u32 = 3;
const TICK_MS: u64 = 1000;
const MODULE_GRIDS: u8 = 4;

static TIMER0: Mutex<RefCell<Option<PeriodicTimer<'static, esp_hal::Blocking>>>> =
    Mutex::new(RefCell::new(None));

static TICK: AtomicBool = AtomicBool::new(false);

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn timer0_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    TICK.store(true, Ordering::Release);
}

// MM:SS, colon (DP of grid 1) blinking with the seconds
fn clock_glyphs(seconds: u32) -> [u8; 4] {
    let m = (seconds / 60) as usize;
    let s = (seconds % 60) as usize;
    let mut second = Segments(DIGITS[m % 10]);
    if s % 2 == 0 {
        second = second.with_dp();
    }
    [DIGITS[m / 10], second.bits(), DIGITS[s / 10], DIGITS[s % 10]]
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("booting...");

    let timg0 = TimerGroup::new(unsafe { peripherals.TIMG0.clone_unchecked() });
    let mut timer0 = PeriodicTimer::new(timg0.timer0);
    critical_section::with(|cs| {
        timer0.set_interrupt_handler(timer0_handler);
        timer0.start(Duration::from_millis(TICK_MS)).unwrap();
        timer0.listen();
        TIMER0.borrow_ref_mut(cs).replace(timer0);
    });
    info!("timer initialized.");

    let Board { mut bus } = Board::init(peripherals);
    let mut delay = Delay::new();
    info!("hardware initialized.");

    if RUN_SELFTEST {
        let mut tm = Tm1637::new(&mut bus);
        if let Err(e) = selftest::write_test(&mut tm, &mut delay) {
            warn!("write test failed: {:?}", e);
        }
        if let Err(e) = selftest::read_test(&mut tm, &mut delay, READ_TEST_TIMES) {
            warn!("read test failed: {:?}", e);
        }
    }

    let mut display = Basic::new(
        bus,
        Config::default()
            .with_grids(MODULE_GRIDS)
            .with_pulse_width(PulseWidth::Div10_16),
    );
    if let Err(e) = display.init() {
        warn!("display init failed: {:?}", e);
    }
    if let Err(e) = display.write_str("----") {
        warn!("display write failed: {:?}", e);
    }

    let mut seconds: u32 = 0;
    let mut last_key = KeyScan::default();

    loop {
        if !TICK.swap(false, Ordering::AcqRel) {
            #[cfg(target_arch = "riscv32")]
            unsafe {
                core::arch::asm!("wfi", options(nomem, nostack));
            }
            continue;
        }

        seconds = (seconds + 1) % 3600;
        if let Err(e) = display.write(0, &clock_glyphs(seconds)) {
            warn!("display write failed: {:?}", e);
        }

        match display.read() {
            Ok(key) if key != last_key => {
                info!("key: seg={} k={}", key.seg, key.k);
                last_key = key;
            }
            Ok(_) => {}
            Err(e) => warn!("key read failed: {:?}", e),
        }
    }
}
