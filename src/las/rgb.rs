/*
===============================================================================

  PROGRAMMERS:

    martin.isenburg@rapidlasso.com  -  http://rapidlasso.com
    uday.karan@gmail.com - Hobu, Inc.

  COPYRIGHT:

    (c) 2007-2014, martin isenburg, rapidlasso - tools to catch reality
    (c) 2014, Uday Verma, Hobu, Inc.
    (c) 2019, Thomas Montaigu

    This is free software; you can redistribute and/or modify it under the
    terms of the GNU Lesser General Licence as published by the Free Software
    Foundation. See the COPYING file for more information.

    This software is distributed WITHOUT ANY WARRANTY and without even the
    implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.

  CHANGE HISTORY:
    6 June 2019: Translated to Rust
===============================================================================
*/


use crate::packers::Packable;
use crate::las::utils::flag_diff;

fn u8_clamp(n: i32) -> u8 {
    if n <= std::u8::MIN as i32 {
        std::u8::MIN
    } else if n >= std::u8::MAX as i32 {
        std::u8::MAX
    } else {
        n as u8
    }
}

pub trait LasRGB {
    fn red(&self) -> u16;
    fn green(&self) -> u16;
    fn blue(&self) -> u16;

    fn set_red(&mut self, new_val: u16);
    fn set_green(&mut self, new_val: u16);
    fn set_blue(&mut self, new_val: u16);
}

#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct RGB {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl RGB {
    pub const SIZE: usize = 3 * std::mem::size_of::<u16>();

    fn color_diff_bits(&self, other: &RGB) -> u32 {
        (flag_diff(other.red, self.red, 0x00FF) as u32)
            | (flag_diff(other.red, self.red, 0xFF00) as u32) << 1
            | (flag_diff(other.green, self.green, 0x00FF) as u32) << 2
            | (flag_diff(other.green, self.green, 0xFF00) as u32) << 3
            | (flag_diff(other.blue, self.blue, 0x00FF) as u32) << 4
            | (flag_diff(other.blue, self.blue, 0xFF00) as u32) << 5
            | ((flag_diff(self.red, self.green, 0x00FF) as u32)
                | (flag_diff(self.red, self.blue, 0x00FF) as u32)
                | (flag_diff(self.red, self.green, 0xFF00) as u32)
                | (flag_diff(self.red, self.blue, 0xFF00) as u32)) << 6
    }
}

impl LasRGB for RGB {
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

impl Packable for RGB {
    type Type = RGB;

    fn unpack(input: &[u8]) -> Self::Type {
        Self {
            red: u16::unpack(&input[0..2]),
            green: u16::unpack(&input[2..4]),
            blue: u16::unpack(&input[4..6]),
        }
    }

    fn pack(value: Self::Type, mut output: &mut [u8]) {
        u16::pack(value.red, &mut output[0..2]);
        u16::pack(value.green, &mut output[2..4]);
        u16::pack(value.blue, &mut output[4..6]);
    }
}

pub mod v1 {
    //! Simplest version: the difference of each of the 6 bytes that make up
    //! the RGB triplet is encoded independently, with no shortcut for the
    //! (very common) case where red == green == blue.
    use std::io::{Read, Write};

    use crate::decoders::ArithmeticDecoder;
    use crate::encoders::ArithmeticEncoder;
    use crate::models::{ArithmeticModel, ArithmeticModelBuilder};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::RGB;

    pub struct LasRGBCompressor {
        last: RGB,
        diffs: [ArithmeticModel; 6],
    }

    impl Default for LasRGBCompressor {
        fn default() -> Self {
            Self {
                last: RGB::default(),
                diffs: [
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                ],
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasRGBCompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last = RGB::unpack(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let current = RGB::unpack(buf);
            let bytes = [
                (current.red & 0x00FF) as u8,
                (current.red >> 8) as u8,
                (current.green & 0x00FF) as u8,
                (current.green >> 8) as u8,
                (current.blue & 0x00FF) as u8,
                (current.blue >> 8) as u8,
            ];
            let last_bytes = [
                (self.last.red & 0x00FF) as u8,
                (self.last.red >> 8) as u8,
                (self.last.green & 0x00FF) as u8,
                (self.last.green >> 8) as u8,
                (self.last.blue & 0x00FF) as u8,
                (self.last.blue >> 8) as u8,
            ];
            for i in 0..6 {
                let diff = bytes[i].wrapping_sub(last_bytes[i]);
                encoder.encode_symbol(&mut self.diffs[i], u32::from(diff))?;
            }
            self.last = current;
            Ok(())
        }
    }

    pub struct LasRGBDecompressor {
        last: RGB,
        diffs: [ArithmeticModel; 6],
    }

    impl Default for LasRGBDecompressor {
        fn default() -> Self {
            Self {
                last: RGB::default(),
                diffs: [
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                    ArithmeticModelBuilder::new(256).build(),
                ],
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasRGBDecompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.last = RGB::unpack(first_point);
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let last_bytes = [
                (self.last.red & 0x00FF) as u8,
                (self.last.red >> 8) as u8,
                (self.last.green & 0x00FF) as u8,
                (self.last.green >> 8) as u8,
                (self.last.blue & 0x00FF) as u8,
                (self.last.blue >> 8) as u8,
            ];
            let mut bytes = [0u8; 6];
            for i in 0..6 {
                let diff = decoder.decode_symbol(&mut self.diffs[i])? as u8;
                bytes[i] = last_bytes[i].wrapping_add(diff);
            }
            let current = RGB {
                red: u16::from(bytes[0]) | (u16::from(bytes[1]) << 8),
                green: u16::from(bytes[2]) | (u16::from(bytes[3]) << 8),
                blue: u16::from(bytes[4]) | (u16::from(bytes[5]) << 8),
            };
            RGB::pack(current, buf);
            self.last = current;
            Ok(())
        }
    }
}

pub mod v2 {
    //! The changed bytes of the RGB triplet are signalled with a 7-bit mask,
    //! and green/blue are predicted from red when they are known to track it.
    use std::io::{Read, Write};

    use crate::decoders::ArithmeticDecoder;
    use crate::encoders::ArithmeticEncoder;
    use crate::models::{ArithmeticModel, ArithmeticModelBuilder};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::{u8_clamp, RGB};

    pub struct LasRGBCompressor {
        last: RGB,

        byte_used: ArithmeticModel,
        rgb_diff_0: ArithmeticModel,
        rgb_diff_1: ArithmeticModel,
        rgb_diff_2: ArithmeticModel,
        rgb_diff_3: ArithmeticModel,
        rgb_diff_4: ArithmeticModel,
        rgb_diff_5: ArithmeticModel,
    }

    impl Default for LasRGBCompressor {
        fn default() -> Self {
            Self {
                last: RGB::default(),
                byte_used: ArithmeticModelBuilder::new(128).build(),
                rgb_diff_0: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_1: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_2: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_3: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_4: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_5: ArithmeticModelBuilder::new(256).build(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasRGBCompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last = RGB::unpack(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let this_val = RGB::unpack(buf);

            let mut diff_l = 0i32;
            let mut diff_h = 0i32;
            let mut corr;

            let sym: u32 = this_val.color_diff_bits(&self.last);
            encoder.encode_symbol(&mut self.byte_used, sym)?;

            if (sym & (1 << 0)) != 0 {
                diff_l = (this_val.red & 0x00FF) as i32 - (self.last.red & 0x00FF) as i32;
                encoder.encode_symbol(&mut self.rgb_diff_0, diff_l as u8 as u32)?;
            }

            if (sym & (1 << 1)) != 0 {
                diff_h = (this_val.red >> 8) as i32 - (self.last.red >> 8) as i32;
                encoder.encode_symbol(&mut self.rgb_diff_1, diff_h as u8 as u32)?;
            }

            if (sym & (1 << 6)) != 0 {
                if (sym & (1 << 2)) != 0 {
                    corr = (this_val.green & 0x00FF) as i32
                        - u8_clamp(diff_l + (self.last.green & 0x00FF) as i32) as i32;
                    encoder.encode_symbol(&mut self.rgb_diff_2, corr as u8 as u32)?;
                }

                if (sym & (1 << 4)) != 0 {
                    diff_l = (diff_l + (this_val.green & 0x00FF) as i32
                        - (self.last.green & 0x00FF) as i32)
                        / 2;
                    corr = (this_val.blue & 0x00FF) as i32
                        - u8_clamp(diff_l + (self.last.blue & 0x00FF) as i32) as i32;
                    encoder.encode_symbol(&mut self.rgb_diff_4, corr as u8 as u32)?;
                }

                if (sym & (1 << 3)) != 0 {
                    corr = (this_val.green >> 8) as i32
                        - u8_clamp(diff_h + (self.last.green >> 8) as i32) as i32;
                    encoder.encode_symbol(&mut self.rgb_diff_3, corr as u8 as u32)?;
                }

                if (sym & (1 << 5)) != 0 {
                    diff_h = (diff_h + (this_val.green >> 8) as i32
                        - (self.last.green >> 8) as i32)
                        / 2;
                    corr = (this_val.blue >> 8) as i32
                        - u8_clamp(diff_h + (self.last.blue >> 8) as i32) as i32;
                    encoder.encode_symbol(&mut self.rgb_diff_5, corr as u8 as u32)?;
                }
            }
            self.last = this_val;
            Ok(())
        }
    }

    pub struct LasRGBDecompressor {
        last: RGB,

        byte_used: ArithmeticModel,
        rgb_diff_0: ArithmeticModel,
        rgb_diff_1: ArithmeticModel,
        rgb_diff_2: ArithmeticModel,
        rgb_diff_3: ArithmeticModel,
        rgb_diff_4: ArithmeticModel,
        rgb_diff_5: ArithmeticModel,
    }

    impl Default for LasRGBDecompressor {
        fn default() -> Self {
            Self {
                last: RGB::default(),
                byte_used: ArithmeticModelBuilder::new(128).build(),
                rgb_diff_0: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_1: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_2: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_3: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_4: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_5: ArithmeticModelBuilder::new(256).build(),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasRGBDecompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.last = RGB::unpack(first_point);
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let sym = decoder.decode_symbol(&mut self.byte_used)?;

            let mut this_val = RGB::default();
            let mut corr;
            let mut diff;

            if (sym & (1 << 0)) != 0 {
                corr = decoder.decode_symbol(&mut self.rgb_diff_0)? as u8;
                this_val.red = corr.wrapping_add((self.last.red & 0x00FF) as u8) as u16;
            } else {
                this_val.red = self.last.red & 0xFF;
            }

            if (sym & (1 << 1)) != 0 {
                corr = decoder.decode_symbol(&mut self.rgb_diff_1)? as u8;
                this_val.red |= (corr.wrapping_add((self.last.red >> 8) as u8) as u16) << 8;
            } else {
                this_val.red |= self.last.red & 0xFF00;
            }

            if (sym & (1 << 6)) != 0 {
                diff = (this_val.red & 0x00FF) as i32 - (self.last.red & 0x00FF) as i32;

                if (sym & (1 << 2)) != 0 {
                    corr = decoder.decode_symbol(&mut self.rgb_diff_2)? as u8;
                    this_val.green = corr
                        .wrapping_add(u8_clamp(diff + (self.last.green & 0x00FF) as i32))
                        as u16;
                } else {
                    this_val.green = self.last.green & 0x00FF;
                }

                if (sym & (1 << 4)) != 0 {
                    corr = decoder.decode_symbol(&mut self.rgb_diff_4)? as u8;
                    diff = (diff + (this_val.green & 0x00FF) as i32
                        - (self.last.green & 0x00FF) as i32)
                        / 2;
                    this_val.blue = corr
                        .wrapping_add(u8_clamp(diff + (self.last.blue & 0x00FF) as i32))
                        as u16;
                } else {
                    this_val.blue = self.last.blue & 0x00FF;
                }

                diff = (this_val.red >> 8) as i32 - (self.last.red >> 8) as i32;
                if (sym & (1 << 3)) != 0 {
                    corr = decoder.decode_symbol(&mut self.rgb_diff_3)? as u8;
                    this_val.green |= (corr
                        .wrapping_add(u8_clamp(diff + (self.last.green >> 8) as i32))
                        as u16)
                        << 8;
                } else {
                    this_val.green |= self.last.green & 0xFF00;
                }

                if (sym & (1 << 5)) != 0 {
                    corr = decoder.decode_symbol(&mut self.rgb_diff_5)? as u8;
                    diff = (diff + (this_val.green >> 8) as i32 - (self.last.green >> 8) as i32)
                        / 2;
                    this_val.blue |= (corr
                        .wrapping_add(u8_clamp(diff + (self.last.blue >> 8) as i32))
                        as u16)
                        << 8;
                } else {
                    this_val.blue |= self.last.blue & 0xFF00;
                }
            } else {
                this_val.green = this_val.red;
                this_val.blue = this_val.red;
            }
            RGB::pack(this_val, buf);
            self.last = this_val;
            Ok(())
        }
    }
}

pub mod v3 {
    //! Layered version used for point formats 6-8: the RGB triplet lives in
    //! its own per-chunk layer and is only written when it changed at least
    //! once, with state kept per scanner channel context.
    use std::io::{Cursor, Read, Seek};

    use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

    use crate::decoders::ArithmeticDecoder;
    use crate::encoders::ArithmeticEncoder;
    use crate::las::selective::DecompressionSelection;
    use crate::las::utils::copy_bytes_into_decoder;
    use crate::las::utils::copy_encoder_content_to;
    use crate::models::{ArithmeticModel, ArithmeticModelBuilder};
    use crate::packers::Packable;
    use crate::record::{LayeredFieldCompressor, LayeredFieldDecompressor};

    use super::{u8_clamp, RGB};

    struct RGBContext {
        byte_used: ArithmeticModel,
        rgb_diff_0: ArithmeticModel,
        rgb_diff_1: ArithmeticModel,
        rgb_diff_2: ArithmeticModel,
        rgb_diff_3: ArithmeticModel,
        rgb_diff_4: ArithmeticModel,
        rgb_diff_5: ArithmeticModel,
        unused: bool,
    }

    impl Default for RGBContext {
        fn default() -> Self {
            Self {
                byte_used: ArithmeticModelBuilder::new(128).build(),
                rgb_diff_0: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_1: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_2: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_3: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_4: ArithmeticModelBuilder::new(256).build(),
                rgb_diff_5: ArithmeticModelBuilder::new(256).build(),
                unused: false,
            }
        }
    }

    pub struct LasRGBDecompressor {
        decoder: ArithmeticDecoder<Cursor<Vec<u8>>>,
        changed_rgb: bool,
        layer_size: u32,
        is_requested: bool,
        last_context_used: usize,
        // Last & contexts are separated so that switching scanner channel
        // context does not require re-initializing the predictor state.
        contexts: [RGBContext; 4],
        last_rgbs: [RGB; 4],
    }

    impl Default for LasRGBDecompressor {
        fn default() -> Self {
            Self {
                decoder: ArithmeticDecoder::new(Cursor::new(Vec::<u8>::new())),
                changed_rgb: false,
                layer_size: 0,
                is_requested: true,
                last_context_used: 0,
                contexts: Default::default(),
                last_rgbs: [RGB::default(); 4],
            }
        }
    }

    impl<R: Read + Seek> LayeredFieldDecompressor<R> for LasRGBDecompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn set_selection(&mut self, selection: DecompressionSelection) {
            self.is_requested = selection.should_decompress_rgb();
        }

        fn init_first_point(
            &mut self,
            src: &mut R,
            first_point: &mut [u8],
            context: &mut usize,
        ) -> std::io::Result<()> {
            for ctx in &mut self.contexts {
                ctx.unused = true;
            }

            src.read_exact(first_point)?;
            self.last_rgbs[*context] = RGB::unpack(first_point);
            self.contexts[*context].unused = false;
            self.last_context_used = *context;
            Ok(())
        }

        fn decompress_field_with(
            &mut self,
            current_point: &mut [u8],
            context: &mut usize,
        ) -> std::io::Result<()> {
            if self.last_context_used != *context {
                self.last_context_used = *context;
                if self.contexts[*context].unused {
                    self.last_rgbs[*context] = self.last_rgbs[self.last_context_used];
                    self.contexts[*context].unused = false;
                }
            }
            let last = self.last_rgbs[self.last_context_used];
            let the_context = &mut self.contexts[self.last_context_used];

            let mut this_val = last;
            if self.changed_rgb {
                let sym = self.decoder.decode_symbol(&mut the_context.byte_used)?;

                let mut corr;
                let mut diff;

                if (sym & (1 << 0)) != 0 {
                    corr = self.decoder.decode_symbol(&mut the_context.rgb_diff_0)? as u8;
                    this_val.red = corr.wrapping_add((last.red & 0x00FF) as u8) as u16;
                } else {
                    this_val.red = last.red & 0xFF;
                }

                if (sym & (1 << 1)) != 0 {
                    corr = self.decoder.decode_symbol(&mut the_context.rgb_diff_1)? as u8;
                    this_val.red |= (corr.wrapping_add((last.red >> 8) as u8) as u16) << 8;
                } else {
                    this_val.red |= last.red & 0xFF00;
                }

                if (sym & (1 << 6)) != 0 {
                    diff = (this_val.red & 0x00FF) as i32 - (last.red & 0x00FF) as i32;

                    if (sym & (1 << 2)) != 0 {
                        corr = self.decoder.decode_symbol(&mut the_context.rgb_diff_2)? as u8;
                        this_val.green = corr
                            .wrapping_add(u8_clamp(diff + (last.green & 0x00FF) as i32))
                            as u16;
                    } else {
                        this_val.green = last.green & 0x00FF;
                    }

                    if (sym & (1 << 4)) != 0 {
                        corr = self.decoder.decode_symbol(&mut the_context.rgb_diff_4)? as u8;
                        diff = (diff + (this_val.green & 0x00FF) as i32
                            - (last.green & 0x00FF) as i32)
                            / 2;
                        this_val.blue = corr
                            .wrapping_add(u8_clamp(diff + (last.blue & 0x00FF) as i32))
                            as u16;
                    } else {
                        this_val.blue = last.blue & 0x00FF;
                    }

                    diff = (this_val.red >> 8) as i32 - (last.red >> 8) as i32;
                    if (sym & (1 << 3)) != 0 {
                        corr = self.decoder.decode_symbol(&mut the_context.rgb_diff_3)? as u8;
                        this_val.green |= (corr
                            .wrapping_add(u8_clamp(diff + (last.green >> 8) as i32))
                            as u16)
                            << 8;
                    } else {
                        this_val.green |= last.green & 0xFF00;
                    }

                    if (sym & (1 << 5)) != 0 {
                        corr = self.decoder.decode_symbol(&mut the_context.rgb_diff_5)? as u8;
                        diff = (diff + (this_val.green >> 8) as i32 - (last.green >> 8) as i32)
                            / 2;
                        this_val.blue |= (corr
                            .wrapping_add(u8_clamp(diff + (last.blue >> 8) as i32))
                            as u16)
                            << 8;
                    } else {
                        this_val.blue |= last.blue & 0xFF00;
                    }
                } else {
                    this_val.green = this_val.red;
                    this_val.blue = this_val.red;
                }
            }
            self.last_rgbs[self.last_context_used] = this_val;
            RGB::pack(this_val, current_point);
            Ok(())
        }

        fn read_layers_sizes(&mut self, src: &mut R) -> std::io::Result<()> {
            self.layer_size = src.read_u32::<LittleEndian>()?;
            Ok(())
        }

        fn read_layers(&mut self, src: &mut R) -> std::io::Result<()> {
            self.changed_rgb = copy_bytes_into_decoder(
                self.is_requested,
                self.layer_size as usize,
                &mut self.decoder,
                src,
            )?;
            Ok(())
        }
    }

    pub struct LasRGBCompressor {
        encoder: ArithmeticEncoder<Cursor<Vec<u8>>>,
        has_rgb_changed: bool,
        last_context_used: usize,
        contexts: [RGBContext; 4],
        last_rgbs: [RGB; 4],
    }

    impl Default for LasRGBCompressor {
        fn default() -> Self {
            Self {
                encoder: ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new())),
                has_rgb_changed: false,
                last_context_used: 0,
                contexts: Default::default(),
                last_rgbs: [RGB::default(); 4],
            }
        }
    }

    impl<W: std::io::Write> LayeredFieldCompressor<W> for LasRGBCompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn init_first_point(
            &mut self,
            dst: &mut W,
            first_point: &[u8],
            context: &mut usize,
        ) -> std::io::Result<()> {
            for ctx in &mut self.contexts {
                ctx.unused = true;
            }

            dst.write_all(first_point)?;
            self.last_rgbs[*context] = RGB::unpack(first_point);
            self.contexts[*context].unused = false;
            self.last_context_used = *context;
            Ok(())
        }

        fn compress_field_with(
            &mut self,
            current_point: &[u8],
            context: &mut usize,
        ) -> std::io::Result<()> {
            if self.last_context_used != *context {
                if self.contexts[*context].unused {
                    self.last_rgbs[*context] = self.last_rgbs[self.last_context_used];
                    self.contexts[*context].unused = false;
                }
                self.last_context_used = *context;
            }
            let last = self.last_rgbs[self.last_context_used];
            let the_context = &mut self.contexts[self.last_context_used];
            let this_val = RGB::unpack(current_point);

            if this_val != last {
                self.has_rgb_changed = true;
            }

            let mut diff_l = 0i32;
            let mut diff_h = 0i32;
            let mut corr;

            let sym = this_val.color_diff_bits(&last);
            self.encoder.encode_symbol(&mut the_context.byte_used, sym)?;

            if (sym & (1 << 0)) != 0 {
                diff_l = (this_val.red & 0x00FF) as i32 - (last.red & 0x00FF) as i32;
                self.encoder
                    .encode_symbol(&mut the_context.rgb_diff_0, diff_l as u8 as u32)?;
            }

            if (sym & (1 << 1)) != 0 {
                diff_h = (this_val.red >> 8) as i32 - (last.red >> 8) as i32;
                self.encoder
                    .encode_symbol(&mut the_context.rgb_diff_1, diff_h as u8 as u32)?;
            }

            if (sym & (1 << 6)) != 0 {
                if (sym & (1 << 2)) != 0 {
                    corr = (this_val.green & 0x00FF) as i32
                        - u8_clamp(diff_l + (last.green & 0x00FF) as i32) as i32;
                    self.encoder
                        .encode_symbol(&mut the_context.rgb_diff_2, corr as u8 as u32)?;
                }

                if (sym & (1 << 4)) != 0 {
                    diff_l = (diff_l + (this_val.green & 0x00FF) as i32
                        - (last.green & 0x00FF) as i32)
                        / 2;
                    corr = (this_val.blue & 0x00FF) as i32
                        - u8_clamp(diff_l + (last.blue & 0x00FF) as i32) as i32;
                    self.encoder
                        .encode_symbol(&mut the_context.rgb_diff_4, corr as u8 as u32)?;
                }

                if (sym & (1 << 3)) != 0 {
                    corr = (this_val.green >> 8) as i32
                        - u8_clamp(diff_h + (last.green >> 8) as i32) as i32;
                    self.encoder
                        .encode_symbol(&mut the_context.rgb_diff_3, corr as u8 as u32)?;
                }

                if (sym & (1 << 5)) != 0 {
                    diff_h = (diff_h + (this_val.green >> 8) as i32 - (last.green >> 8) as i32)
                        / 2;
                    corr = (this_val.blue >> 8) as i32
                        - u8_clamp(diff_h + (last.blue >> 8) as i32) as i32;
                    self.encoder
                        .encode_symbol(&mut the_context.rgb_diff_5, corr as u8 as u32)?;
                }
            }
            self.last_rgbs[self.last_context_used] = this_val;
            Ok(())
        }

        fn write_layers_sizes(&mut self, dst: &mut W) -> std::io::Result<()> {
            self.encoder.done()?;
            let num_bytes = if self.has_rgb_changed {
                self.encoder.get_mut().get_ref().len() as u32
            } else {
                0
            };
            dst.write_u32::<LittleEndian>(num_bytes)
        }

        fn write_layers(&mut self, dst: &mut W) -> std::io::Result<()> {
            if self.has_rgb_changed {
                copy_encoder_content_to(&mut self.encoder, dst)?;
            }
            Ok(())
        }
    }
}

