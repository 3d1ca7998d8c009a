#![no_main]
#![no_std]
#![deny(warnings)]
#![deny(unsafe_code)]

mod hw;
mod readout;

use panic_halt as _;

#[rtic::app(device = stm32f1xx_hal::pac)]
mod app {
    use crate::hw::*;
    use stm32f1xx_hal::{prelude::*, timer::{CounterMs, Event}, spi::Spi};
    use max6675_reader::{BusRegistry, HostId, MillisClock, RateLimitPolicy, SensorConfig, SpiTransport};
    use crate::readout::Readout;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        systick: CounterMs<Systick>,
        display: Display,
        temp_sensor: TempSensor,
        readout: Readout,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        let dp = cx.device;
        let mut flash = dp.FLASH.constrain();
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.freeze(&mut flash.acr);

        let mut systick = dp.TIM1.counter_ms(&clocks);
        systick.start(TICK_MS.millis()).unwrap();
        systick.listen(Event::Update);

        let mut afio = dp.AFIO.constrain();
        let mut gpioa = dp.GPIOA.split();
        let mut gpiob = dp.GPIOB.split();

        let mut buses = BusRegistry::new();
        buses.init_host(HostId::Spi1, 1_000_000).unwrap();
        buses.init_host(HostId::Spi2, 1_000_000).unwrap();

        // SPI1
        let sck1 = gpioa.pa5.into_alternate_push_pull(&mut gpioa.crl);
        let cipo1 = gpioa.pa6;
        let copi1 = gpioa.pa7.into_alternate_push_pull(&mut gpioa.crl);

        let display_dev = buses.add_device(HostId::Spi1, 4).unwrap();
        let spi1 = Spi::spi1(
            dp.SPI1,
            (sck1, cipo1, copi1),
            &mut afio.mapr,
            display_dev.mode,
            display_dev.clock_hz.Hz(),
            clocks,
        );

        // Display (SSD1309)
        let display_cs = gpioa.pa4.into_push_pull_output(&mut gpioa.crl);
        let display_dc = gpioa.pa3.into_push_pull_output(&mut gpioa.crl);
        let display_interface = SPIInterface::new(spi1, display_dc, display_cs);
        let mut display: Display = ssd1309::Builder::new()
            .connect(display_interface)
            .into();
        display.init().unwrap();

        // Thermocouple (MAX6675)
        // SPI2
        let sck2 = gpiob.pb13.into_alternate_push_pull(&mut gpiob.crh);
        let cipo2 = gpiob.pb14;
        let copi2 = gpiob.pb15.into_alternate_push_pull(&mut gpiob.crh);

        let temp_dev = buses.add_device(HostId::Spi2, TEMP_SENSOR_CS).unwrap();
        let spi2 = Spi::spi2(
            dp.SPI2,
            (sck2, cipo2, copi2),
            temp_dev.mode,
            temp_dev.clock_hz.Hz(),
            clocks,
        );
        let temp_cs = gpiob.pb12.into_push_pull_output(&mut gpiob.crh);
        let transport: TempTransport = SpiTransport::for_device(spi2, temp_cs, &temp_dev).unwrap();
        let config = SensorConfig::conversion_paced(RateLimitPolicy::ReturnCached);
        let temp_sensor: TempSensor = TempSensor::new(transport, MillisClock::new(), config).unwrap();

        (
            Shared {},
            Local {
                systick,
                display,
                temp_sensor,
                readout: Readout::new(),
            }
        )
    }

    #[task(binds = TIM1_UP, priority = 1, local = [systick, display, temp_sensor, readout])]
    fn tick(cx: tick::Context) {
        let tick::LocalResources { systick, temp_sensor, display, readout, .. } = cx.local;
        systick.clear_interrupt(Event::Update);
        temp_sensor.clock().advance(TICK_MS);
        readout.on_read(temp_sensor.read());
        display.clear();
        readout.draw::<Display>(display);
        display.flush().unwrap();
    }
}
