use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics_core::pixelcolor::BinaryColor;
use embedded_graphics_core::prelude::DrawTarget;
use heapless::String;
use max6675_reader::{Error, Reading};
use ufmt::uwrite;

const QUARTERS: [&str; 4] = ["00", "25", "50", "75"];

enum Shown {
    Nothing,
    Temperature { quarter_degrees: i32, is_fresh: bool },
    OpenThermocouple,
    BusError,
}

pub struct Readout {
    shown: Shown,
    errors: u16,
}

impl Readout {
    pub fn new() -> Readout {
        Readout {
            shown: Shown::Nothing,
            errors: 0,
        }
    }

    pub fn on_read<E>(&mut self, result: Result<Reading, Error<E>>) {
        self.shown = match result {
            Ok(Reading { measurement, is_fresh }) => match measurement.celsius() {
                Some(c) => Shown::Temperature {
                    quarter_degrees: (c * 4.0) as i32,
                    is_fresh,
                },
                None => Shown::OpenThermocouple,
            },
            // keep showing the last reading
            Err(Error::TooSoon { .. }) => return,
            Err(_) => {
                self.errors = self.errors.saturating_add(1);
                Shown::BusError
            }
        };
    }

    pub fn draw<D>(&self, display: &mut D)
        where D: DrawTarget<Color=BinaryColor>,
              <D as DrawTarget>::Error: core::fmt::Debug
    {
        use embedded_graphics::{
            mono_font::ascii::{FONT_4X6, FONT_6X10},
            prelude::*,
            text::Text,
        };

        let lg_text = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let sm_text = MonoTextStyle::new(&FONT_4X6, BinaryColor::On);
        let mut sbuf = String::<32>::new();

        match self.shown {
            Shown::Nothing => {
                uwrite!(sbuf, "waiting...").unwrap();
            }
            Shown::Temperature { quarter_degrees, .. } => {
                let sign = if quarter_degrees < 0 { "-" } else { "" };
                let q = quarter_degrees.abs();
                uwrite!(sbuf, "T:{}{}.{}C", sign, q / 4, QUARTERS[(q % 4) as usize]).unwrap();
            }
            Shown::OpenThermocouple => {
                uwrite!(sbuf, "OPEN TC").unwrap();
            }
            Shown::BusError => {
                uwrite!(sbuf, "BUS ERR").unwrap();
            }
        }
        Text::new(&sbuf, Point::new(0, 24), lg_text)
            .draw(display).unwrap();
        sbuf.clear();

        if let Shown::Temperature { is_fresh, .. } = self.shown {
            uwrite!(sbuf, "{}", if is_fresh { "fresh" } else { "cached" }).unwrap();
            Text::new(&sbuf, Point::new(0, 40), sm_text)
                .draw(display).unwrap();
            sbuf.clear();
        }

        uwrite!(sbuf, "E:{}", self.errors).unwrap();
        Text::new(&sbuf, Point::new(96, 62), sm_text)
            .draw(display).unwrap();
    }
}
