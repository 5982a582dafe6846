// RTC driver for PCF85063A/PCF85063TP real-time clock chips, and a clock
// source built on it that keeps running from uptime when the chip misbehaves.
// Datasheet: https://files.waveshare.com/wiki/common/Pcf85063atl1118-NdPQpTGE-loeW7GbZ7.pdf

use embedded_hal::i2c::I2c;

use crate::clock::{ClockSample, ClockSource};

pub const PCF85063_ADDR: u8 = 0x51;
const REG_SECONDS: u8 = 0x04; // sec, min, hour, day, weekday, month, year

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,  // full year, e.g., 2024
    pub month: u8,  // 1-12
    pub day: u8,    // 1-31
    pub hour: u8,   // 0-23
    pub minute: u8, // 0-59
    pub second: u8, // 0-59
}

impl DateTime {
    pub fn time_of_day(&self) -> ClockSample {
        ClockSample::new(self.hour, self.minute, self.second)
    }
}

// RTC error type
#[derive(Debug, PartialEq, Eq)]
pub enum RtcError<E> {
    Bus(E),
    // Oscillator stopped or supply dropped; the stored time cannot be trusted.
    InvalidTime,
}

impl<E> From<E> for RtcError<E> {
    fn from(e: E) -> Self {
        RtcError::Bus(e)
    }
}

pub struct Pcf85063<I2C> {
    i2c: I2C,
}

impl<I2C, E> Pcf85063<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    // Read datetime. Returns (dt, vl_flag) where vl_flag == true means time is unreliable (power loss).
    pub fn read_datetime(&mut self) -> Result<(DateTime, bool), E> {
        let mut buf = [0u8; 7];
        self.i2c.write_read(PCF85063_ADDR, &[REG_SECONDS], &mut buf)?;
        let vl = (buf[0] & 0x80) != 0;
        let month_raw = buf[5];
        let year = if (month_raw & 0x80) != 0 {
            1900u16 + bcd_decode(buf[6]) as u16
        } else {
            2000u16 + bcd_decode(buf[6]) as u16
        };
        Ok((
            DateTime {
                year,
                month: bcd_decode(month_raw & 0x1F),
                day: bcd_decode(buf[3] & 0x3F),
                hour: bcd_decode(buf[2] & 0x3F),
                minute: bcd_decode(buf[1] & 0x7F),
                second: bcd_decode(buf[0] & 0x7F),
            },
            vl,
        ))
    }

    // Like read_datetime, but rejects readings flagged unreliable or out of range.
    pub fn read_valid(&mut self) -> Result<DateTime, RtcError<E>> {
        let (dt, vl) = self.read_datetime()?;
        if vl || !datetime_is_valid(&dt) {
            return Err(RtcError::InvalidTime);
        }
        Ok(dt)
    }

    // Set datetime. Ignores weekday field. Writing the seconds register clears VL.
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), E> {
        let yr = (dt.year % 100) as u8;
        let data = [
            REG_SECONDS,
            bcd_encode(dt.second),
            bcd_encode(dt.minute),
            bcd_encode(dt.hour),
            bcd_encode(dt.day),
            0, // weekday not used
            bcd_encode(dt.month),
            bcd_encode(yr),
        ];
        self.i2c.write(PCF85063_ADDR, &data)?;
        Ok(())
    }
}

fn bcd_decode(v: u8) -> u8 {
    (v & 0x0F) + ((v >> 4) * 10)
}

fn bcd_encode(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

// Days since 1970-01-01 (civil-from-days inverse, handles leap years).
fn days_since_unix(year: u16, month: u8, day: u8) -> u32 {
    let y = year as i32;
    let m = month as i32;
    let d = day as i32;
    let (y1, m1) = if m <= 2 { (y - 1, m + 12) } else { (y, m) };
    let era = y1 / 400;
    let yoe = y1 - era * 400; // year of era
    let doy = 153 * (m1 + 1) / 5 + d - 123; // days since March 1
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // days since era
    (era * 146097 + doe - 719468) as u32 // 719468 = days from 0000-03-01 to 1970-01-01
}

// Convert DateTime to Unix timestamp (seconds since 1970-01-01).
pub fn datetime_to_unix(dt: &DateTime) -> u32 {
    let days = days_since_unix(dt.year, dt.month, dt.day) as u64;
    let secs = days
        .saturating_mul(86_400)
        .saturating_add((dt.hour as u64) * 3600)
        .saturating_add((dt.minute as u64) * 60)
        .saturating_add(dt.second as u64);
    secs.min(u32::MAX as u64) as u32
}

// Basic sanity check on decoded RTC time.
pub fn datetime_is_valid(dt: &DateTime) -> bool {
    (2020..=2099).contains(&dt.year)
        && (1..=12).contains(&dt.month)
        && (1..=31).contains(&dt.day)
        && dt.hour < 24
        && dt.minute < 60
        && dt.second < 60
}

// Convert Unix timestamp (seconds since 1970-01-01) to DateTime.
pub fn unix_to_datetime(mut ts: u32) -> DateTime {
    let days = ts / 86400;
    ts %= 86400;
    let hour = (ts / 3600) as u8;
    ts %= 3600;
    let minute = (ts / 60) as u8;
    let second = (ts % 60) as u8;

    let z = days as i32 + 719468;
    let era = z / 146097; // z is never negative for u32 input
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = mp + if mp < 10 { 3 } else { -9 };
    let year = y + if month <= 2 { 1 } else { 0 };

    DateTime {
        year: year as u16,
        month: month as u8,
        day: day as u8,
        hour,
        minute,
        second,
    }
}

/// Clock source backed by the PCF85063.
///
/// Each good read is stored together with the uptime at which it was taken.
/// When a later read fails, the time is extrapolated from that anchor with
/// `uptime_secs`, so the hands keep moving until the chip answers again.
pub struct RtcClock<I2C, U> {
    rtc: Pcf85063<I2C>,
    uptime_secs: U,
    anchor: Option<(u32, u32)>, // (unix secs, uptime secs)
    failures: u32,
    // Last read reached the chip but its time was flagged bad.
    stale: bool,
}

impl<I2C, E, U> RtcClock<I2C, U>
where
    I2C: I2c<Error = E>,
    U: FnMut() -> u32,
{
    pub fn new(rtc: Pcf85063<I2C>, uptime_secs: U) -> Self {
        Self {
            rtc,
            uptime_secs,
            anchor: None,
            failures: 0,
            stale: false,
        }
    }

    /// Consecutive reads that fell back to extrapolation.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    /// Current Unix time, read from the chip or extrapolated.
    pub fn unix_now(&mut self) -> u32 {
        let uptime = (self.uptime_secs)();
        match self.rtc.read_valid() {
            Ok(dt) => {
                let unix = datetime_to_unix(&dt);
                self.anchor = Some((unix, uptime));
                self.failures = 0;
                self.stale = false;
                unix
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                self.stale = matches!(e, RtcError::InvalidTime);
                self.extrapolate(uptime)
            }
        }
    }

    fn extrapolate(&self, uptime: u32) -> u32 {
        match self.anchor {
            Some((unix, at)) => unix.saturating_add(uptime.saturating_sub(at)),
            // Never had a good read: uptime is the best clock there is.
            None => uptime,
        }
    }

    /// The chip lost its time (voltage-low) after we had a good reading.
    pub fn needs_reseed(&self) -> bool {
        self.stale && self.anchor.is_some()
    }

    /// Writes the extrapolated time back to a chip that lost it.
    /// Returns `Ok(false)` when there is nothing to repair.
    pub fn reseed(&mut self) -> Result<bool, E> {
        if !self.needs_reseed() {
            return Ok(false);
        }
        let uptime = (self.uptime_secs)();
        let now = self.extrapolate(uptime);
        self.set(&unix_to_datetime(now))?;
        Ok(true)
    }

    /// Writes `dt` to the chip and re-anchors on it.
    pub fn set(&mut self, dt: &DateTime) -> Result<(), E> {
        self.rtc.set_datetime(dt)?;
        self.anchor = Some((datetime_to_unix(dt), (self.uptime_secs)()));
        self.failures = 0;
        self.stale = false;
        Ok(())
    }
}

impl<I2C, E, U> ClockSource for RtcClock<I2C, U>
where
    I2C: I2c<Error = E>,
    U: FnMut() -> u32,
{
    fn now(&mut self) -> ClockSample {
        ClockSample::from_seconds(self.unix_now())
    }
}
