//! L3GD20 three-axis gyroscope over I2C.
//!
//! Register-level driver generic over [`embedded_hal::i2c::I2c`], so the
//! same code drives the ESP-IDF `I2cDriver` on target and a mock bus in
//! tests.  Output is angular rate in degrees per second at the ±250 dps
//! full scale (8.75 mdps/digit).

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::SampleSource;
use crate::error::{Error, Result, SensorError};
use crate::gesture::Sample;

const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL_REG1: u8 = 0x20;
const REG_CTRL_REG4: u8 = 0x23;
const REG_OUT_X_L: u8 = 0x28;
/// Set on the sub-address to auto-increment across a burst read.
const AUTO_INCREMENT: u8 = 0x80;

/// L3GD20 (0xD4), L3GD20H (0xD7), L3G4200D (0xD3).
const KNOWN_IDS: [u8; 3] = [0xD4, 0xD7, 0xD3];

/// Normal mode, all three axes enabled, 95 Hz ODR.
const CTRL1_POWER_ON: u8 = 0x0F;
/// ±250 dps full scale, continuous update.
const CTRL4_FS_250: u8 = 0x00;

/// Degrees per second per LSB at ±250 dps.
pub const DPS_PER_DIGIT: f32 = 0.00875;

pub struct L3gd20<B> {
    bus: B,
    address: u8,
    bias: Sample,
    read_errors: u32,
}

impl<B: I2c> L3gd20<B> {
    /// Probe the chip, then power it up at ±250 dps.
    pub fn new(bus: B, address: u8) -> Result<Self> {
        let mut gyro = Self {
            bus,
            address,
            bias: Sample::default(),
            read_errors: 0,
        };
        gyro.init()?;
        Ok(gyro)
    }

    fn init(&mut self) -> Result<()> {
        let id = self.read_reg(REG_WHO_AM_I)?;
        if !KNOWN_IDS.contains(&id) {
            warn!("Gyro: unexpected WHO_AM_I 0x{:02X}", id);
            return Err(Error::Init("gyro WHO_AM_I mismatch"));
        }
        self.write_reg(REG_CTRL_REG1, CTRL1_POWER_ON)?;
        self.write_reg(REG_CTRL_REG4, CTRL4_FS_250)?;
        info!("Gyro: L3GD20 (id=0x{:02X}) at 0x{:02X}, ±250 dps", id, self.address);
        Ok(())
    }

    /// Raw X/Y/Z counts (little-endian pairs from one burst read).
    pub fn read_raw(&mut self) -> Result<[i16; 3]> {
        let mut raw = [0u8; 6];
        self.bus
            .write_read(self.address, &[REG_OUT_X_L | AUTO_INCREMENT], &mut raw)
            .map_err(|_| SensorError::BusReadFailed)?;
        Ok([
            i16::from_le_bytes([raw[0], raw[1]]),
            i16::from_le_bytes([raw[2], raw[3]]),
            i16::from_le_bytes([raw[4], raw[5]]),
        ])
    }

    /// Angular rate in deg/s with the calibrated bias removed.
    pub fn read_dps(&mut self) -> Result<Sample> {
        let [x, y, z] = self.read_raw()?;
        Ok(Sample::new(
            f32::from(x) * DPS_PER_DIGIT - self.bias.x,
            f32::from(y) * DPS_PER_DIGIT - self.bias.y,
            f32::from(z) * DPS_PER_DIGIT - self.bias.z,
        ))
    }

    /// Average `count` readings taken while the board is at rest and use
    /// them as the zero-rate offset.
    pub fn calibrate(&mut self, count: u16) -> Result<Sample> {
        self.bias = Sample::default();
        if count == 0 {
            return Ok(self.bias);
        }
        let (mut sx, mut sy, mut sz) = (0.0f32, 0.0f32, 0.0f32);
        for _ in 0..count {
            let s = self.read_dps()?;
            sx += s.x;
            sy += s.y;
            sz += s.z;
        }
        let n = f32::from(count);
        self.bias = Sample::new(sx / n, sy / n, sz / n);
        info!(
            "Gyro: bias ({:.3}, {:.3}, {:.3}) dps from {} samples",
            self.bias.x, self.bias.y, self.bias.z, count
        );
        Ok(self.bias)
    }

    pub fn bias(&self) -> Sample {
        self.bias
    }

    /// Failed reads since construction (each reported as a zero sample).
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    pub fn release(self) -> B {
        self.bus
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.bus
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| SensorError::BusReadFailed)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.bus
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::BusWriteFailed.into())
    }
}

impl<B: I2c> SampleSource for L3gd20<B> {
    fn read_angular_rate(&mut self) -> Sample {
        match self.read_dps() {
            Ok(s) => s,
            Err(e) => {
                self.read_errors = self.read_errors.saturating_add(1);
                warn!("Gyro: {}, recording zero sample", e);
                Sample::default()
            }
        }
    }
}
