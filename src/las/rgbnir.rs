use crate::las::nir::LasNIR;
use crate::las::rgb::LasRGB;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

#[derive(Default, Copy, Clone)]
pub struct RGBNIR {
    red: u16,
    green: u16,
    blue: u16,
    nir: u16,
}

impl RGBNIR {
    pub const SIZE: usize = 8;

    pub fn read_from<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.red = src.read_u16::<LittleEndian>()?;
        self.green = src.read_u16::<LittleEndian>()?;
        self.blue = src.read_u16::<LittleEndian>()?;
        self.nir = src.read_u16::<LittleEndian>()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, dst: &mut W) -> std::io::Result<()> {
        dst.write_u16::<LittleEndian>(self.red)?;
        dst.write_u16::<LittleEndian>(self.green)?;
        dst.write_u16::<LittleEndian>(self.blue)?;
        dst.write_u16::<LittleEndian>(self.nir)?;
        Ok(())
    }
}

impl LasNIR for RGBNIR {
    fn nir(&self) -> u16 {
        self.nir
    }

    fn set_nir(&mut self, new_val: u16) {
        self.nir = new_val;
    }
}

impl LasRGB for RGBNIR {
    fn red(&self) -> u16 {
        self.red
    }

    fn green(&self) -> u16 {
        self.green
    }

    fn blue(&self) -> u16 {
        self.blue
    }

    fn set_red(&mut self, new_val: u16) {
        self.red = new_val;
    }

    fn set_green(&mut self, new_val: u16) {
        self.green = new_val;
    }

    fn set_blue(&mut self, new_val: u16) {
        self.blue = new_val;
    }
}

