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

const LASZIP_GPS_TIME_MULTI: i32 = 500;
const LASZIP_GPS_TIME_MULTI_MINUS: i32 = -10;
const LASZIP_GPS_TIME_MULTI_UNCHANGED: i32 =
    (LASZIP_GPS_TIME_MULTI - LASZIP_GPS_TIME_MULTI_MINUS + 1);
const LASZIP_GPS_TIME_MULTI_CODE_FULL: i32 =
    (LASZIP_GPS_TIME_MULTI - LASZIP_GPS_TIME_MULTI_MINUS + 2);
const LASZIP_GPS_TIME_MULTI_TOTAL: i32 = (LASZIP_GPS_TIME_MULTI - LASZIP_GPS_TIME_MULTI_MINUS + 6);

#[inline]
fn i32_quantize(n: f32) -> i32 {
    if n >= 0.0f32 {
        (n + 0.5f32) as i32
    } else {
        (n - 0.5f32) as i32
    }
}

#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct GpsTime {
    pub value: i64,
}

impl Packable for GpsTime {
    type Type = GpsTime;

    fn unpack(input: &[u8]) -> Self::Type {
        let lower = u32::unpack(&input[0..std::mem::size_of::<u32>()]);
        let upper =
            u32::unpack(&input[std::mem::size_of::<u32>()..(2 * std::mem::size_of::<u32>())]);

        GpsTime {
            value: (upper as i64) << 32 | lower as i64,
        }
    }

    fn pack(value: Self::Type, output: &mut [u8]) {
        u32::pack(
            (value.value & 0xFFFFFFFF) as u32,
            &mut output[0..std::mem::size_of::<u32>()],
        );
        u32::pack(
            (value.value >> 32) as u32,
            &mut output[std::mem::size_of::<u32>()..(2 * std::mem::size_of::<u32>())],
        );
    }
}

pub mod v1 {
    //! Simple, single sequence predictor: no attempt to track multiple
    //! interleaved GPS time sequences, and no "huge jump" recovery.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::models::{ArithmeticModel, ArithmeticModelBuilder};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::GpsTime;

    pub struct LasGpsTimeCompressor {
        last: GpsTime,
        last_diff: i32,
        multi_extreme_counter: i32,
        gps_time_0_diff: ArithmeticModel,
        ic_gps_time: IntegerCompressor,
    }

    impl Default for LasGpsTimeCompressor {
        fn default() -> Self {
            Self {
                last: GpsTime::default(),
                last_diff: 0,
                multi_extreme_counter: 0,
                gps_time_0_diff: ArithmeticModelBuilder::new(6).build(),
                ic_gps_time: IntegerCompressorBuilder::new().bits(32).contexts(6).build(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasGpsTimeCompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.ic_gps_time.init();
            self.last = GpsTime::unpack(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let this_val = GpsTime::unpack(buf);

            if self.last_diff == 0 {
                if this_val.value == self.last.value {
                    encoder.encode_symbol(&mut self.gps_time_0_diff, 0)?;
                } else {
                    let diff_64 = this_val.value - self.last.value;
                    let diff_32 = diff_64 as i32;
                    if diff_64 == diff_32 as i64 {
                        encoder.encode_symbol(&mut self.gps_time_0_diff, 1)?;
                        self.ic_gps_time.compress(encoder, 0, diff_32, 0)?;
                        self.last_diff = diff_32;
                        self.multi_extreme_counter = 0;
                    } else {
                        encoder.encode_symbol(&mut self.gps_time_0_diff, 2)?;
                        self.ic_gps_time.compress(
                            encoder,
                            (self.last.value >> 32) as i32,
                            (this_val.value >> 32) as i32,
                            1,
                        )?;
                        encoder.write_int(this_val.value as u32)?;
                        self.last_diff = 0;
                        self.multi_extreme_counter = 0;
                    }
                }
            } else {
                let diff_64 = this_val.value - self.last.value;
                let diff_32 = diff_64 as i32;
                if diff_64 == diff_32 as i64 {
                    encoder.encode_symbol(&mut self.gps_time_0_diff, 3)?;
                    self.ic_gps_time.compress(encoder, self.last_diff, diff_32, 2)?;
                    self.last_diff = diff_32;
                    self.multi_extreme_counter = 0;
                } else {
                    encoder.encode_symbol(&mut self.gps_time_0_diff, 2)?;
                    self.ic_gps_time.compress(
                        encoder,
                        (self.last.value >> 32) as i32,
                        (this_val.value >> 32) as i32,
                        1,
                    )?;
                    encoder.write_int(this_val.value as u32)?;
                    self.last_diff = 0;
                    self.multi_extreme_counter = 0;
                }
            }
            self.last = this_val;
            Ok(())
        }
    }

    pub struct LasGpsTimeDecompressor {
        last: GpsTime,
        last_diff: i32,
        multi_extreme_counter: i32,
        gps_time_0_diff: ArithmeticModel,
        ic_gps_time: IntegerDecompressor,
    }

    impl Default for LasGpsTimeDecompressor {
        fn default() -> Self {
            Self {
                last: GpsTime::default(),
                last_diff: 0,
                multi_extreme_counter: 0,
                gps_time_0_diff: ArithmeticModelBuilder::new(6).build(),
                ic_gps_time: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(6)
                    .build(),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasGpsTimeDecompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            self.ic_gps_time.init();
            src.read_exact(first_point)?;
            self.last = GpsTime::unpack(first_point);
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let sym = decoder.decode_symbol(&mut self.gps_time_0_diff)?;
            match sym {
                0 => {}
                1 => {
                    self.last_diff = self.ic_gps_time.decompress(decoder, 0, 0)?;
                    self.last.value += i64::from(self.last_diff);
                    self.multi_extreme_counter = 0;
                }
                2 => {
                    let mut value =
                        i64::from(self.ic_gps_time.decompress(decoder, (self.last.value >> 32) as i32, 1)?);
                    value <<= 32;
                    value |= i64::from(decoder.read_int()?);
                    self.last.value = value;
                    self.last_diff = 0;
                    self.multi_extreme_counter = 0;
                }
                _ => {
                    let diff = self.ic_gps_time.decompress(decoder, self.last_diff, 2)?;
                    self.last.value += i64::from(diff);
                    self.last_diff = diff;
                    self.multi_extreme_counter = 0;
                }
            }
            GpsTime::pack(self.last, buf);
            Ok(())
        }
    }
}

pub mod v2 {
    //! Tracks up to 4 interleaved GPS time sequences (for sensors that emit
    //! pulses belonging to distinct timing sequences) and recovers
    //! gracefully from large, non predictable jumps.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::models::{ArithmeticModel, ArithmeticModelBuilder};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::{
        i32_quantize, GpsTime, LASZIP_GPS_TIME_MULTI, LASZIP_GPS_TIME_MULTI_CODE_FULL,
        LASZIP_GPS_TIME_MULTI_MINUS, LASZIP_GPS_TIME_MULTI_UNCHANGED,
    };

    // Common parts for both a compressor and decompressor go here
    struct Common {
        gps_time_multi: ArithmeticModel,
        gps_time_0_diff: ArithmeticModel,
        last: usize,
        next: usize,
        last_gps_times: [GpsTime; 4],
        last_gps_time_diffs: [i32; 4],
        multi_extreme_counters: [i32; 4],
    }

    impl Common {
        pub fn new() -> Self {
            Self {
                gps_time_multi: ArithmeticModelBuilder::new(LASZIP_GPS_TIME_MULTI as u32).build(),
                gps_time_0_diff: ArithmeticModelBuilder::new(6).build(),
                last: 0,
                next: 0,
                last_gps_times: [GpsTime::default(); 4],
                last_gps_time_diffs: [0i32; 4],
                multi_extreme_counters: [0i32; 4],
            }
        }
    }

    pub struct LasGpsTimeCompressor {
        ic_gps_time: IntegerCompressor,
        common: Common,
    }

    impl Default for LasGpsTimeCompressor {
        fn default() -> Self {
            Self {
                ic_gps_time: IntegerCompressorBuilder::new().bits(32).contexts(9).build(),
                common: Common::new(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasGpsTimeCompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.ic_gps_time.init();
            self.common.last_gps_times[0] = GpsTime::unpack(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let this_val = GpsTime::unpack(buf);

            // if last integer different was 0
            if self.common.last_gps_time_diffs[self.common.last] == 0 {
                if this_val.value == self.common.last_gps_times[self.common.last].value {
                    encoder.encode_symbol(&mut self.common.gps_time_0_diff, 0)?;
                } else {
                    // calculate the difference between the two doubles as an integer
                    let curr_gps_time_diff_64 =
                        this_val.value - self.common.last_gps_times[self.common.last].value;
                    let curr_gps_time_diff_32 = curr_gps_time_diff_64 as i32;

                    if curr_gps_time_diff_64 == curr_gps_time_diff_32 as i64 {
                        // this difference is small enough to be represented with 32 bits
                        encoder.encode_symbol(&mut self.common.gps_time_0_diff, 1)?;
                        self.ic_gps_time
                            .compress(encoder, 0, curr_gps_time_diff_32, 0)?;
                        self.common.last_gps_time_diffs[self.common.last] = curr_gps_time_diff_32;
                        self.common.multi_extreme_counters[self.common.last] = 0;
                    } else {
                        // the difference is huge
                        // maybe the double belongs to another time sequence
                        let mut found = false;
                        for i in 1..4 {
                            let other_gps_time_diff_64 = this_val.value
                                - self.common.last_gps_times[((self.common.last + i) & 3)].value;
                            let other_gps_time_diff_32 = other_gps_time_diff_64 as i32;

                            if other_gps_time_diff_64 == other_gps_time_diff_32 as i64 {
                                encoder
                                    .encode_symbol(&mut self.common.gps_time_0_diff, (i + 2) as u32)?;
                                self.common.last = (self.common.last + i) & 3;
                                found = true;
                                break;
                            }
                        }
                        if found {
                            return self.compress_with(encoder, buf);
                        }
                        // no other sequence found. start new sequence.
                        encoder.encode_symbol(&mut self.common.gps_time_0_diff, 2)?;
                        self.ic_gps_time.compress(
                            encoder,
                            (self.common.last_gps_times[self.common.last].value >> 32) as i32,
                            (this_val.value >> 32) as i32,
                            8,
                        )?;

                        encoder.write_int(this_val.value as u32)?;

                        self.common.next = (self.common.next + 1) & 3;
                        self.common.last = self.common.next;
                        self.common.last_gps_time_diffs[self.common.last] = 0;
                        self.common.multi_extreme_counters[self.common.last] = 0;
                    }
                    self.common.last_gps_times[self.common.last] = this_val;
                }
            } else {
                // the last integer difference was *not* zero
                let curr_gps_time_diff_64 =
                    this_val.value - self.common.last_gps_times[self.common.last].value;
                let curr_gps_time_diff_32 = curr_gps_time_diff_64 as i32;

                // if the current gpstime difference can be represented with 32 bits
                if curr_gps_time_diff_64 == curr_gps_time_diff_32 as i64 {
                    // compute multiplier between current and last integer difference
                    let multi_f = curr_gps_time_diff_32 as f32
                        / self.common.last_gps_time_diffs[self.common.last] as f32;
                    let multi = i32_quantize(multi_f);

                    // compress the residual curr_gps_time_diff in dependance on the multiplier
                    if multi == 1 {
                        // this is the case we assume we get most often for regular spaced pulses
                        encoder.encode_symbol(&mut self.common.gps_time_multi, 1)?;
                        self.ic_gps_time.compress(
                            encoder,
                            self.common.last_gps_time_diffs[self.common.last],
                            curr_gps_time_diff_32,
                            1,
                        )?;
                        self.common.multi_extreme_counters[self.common.last] = 0;
                    } else if multi > 0 {
                        if multi < LASZIP_GPS_TIME_MULTI {
                            // positive multipliers up to LASZIP_GPSTIME_MULTI are compressed directly
                            encoder.encode_symbol(&mut self.common.gps_time_multi, multi as u32)?;
                            let context = if multi < 10 { 2u32 } else { 3u32 };
                            self.ic_gps_time.compress(
                                encoder,
                                multi * self.common.last_gps_time_diffs[self.common.last],
                                curr_gps_time_diff_32,
                                context,
                            )?;
                        } else {
                            encoder.encode_symbol(
                                &mut self.common.gps_time_multi,
                                LASZIP_GPS_TIME_MULTI as u32,
                            )?;
                            self.ic_gps_time.compress(
                                encoder,
                                LASZIP_GPS_TIME_MULTI
                                    * self.common.last_gps_time_diffs[self.common.last],
                                curr_gps_time_diff_32,
                                3,
                            )?;
                        }
                    } else if multi < 0 {
                        if multi > LASZIP_GPS_TIME_MULTI_MINUS {
                            // negative multipliers larger than LASZIP_GPSTIME_MULTI_MINUS are compressed directly
                            encoder.encode_symbol(
                                &mut self.common.gps_time_multi,
                                (LASZIP_GPS_TIME_MULTI - multi) as u32,
                            )?;
                            self.ic_gps_time.compress(
                                encoder,
                                multi * self.common.last_gps_time_diffs[self.common.last],
                                curr_gps_time_diff_32,
                                5,
                            )?;
                        } else {
                            encoder.encode_symbol(
                                &mut self.common.gps_time_multi,
                                (LASZIP_GPS_TIME_MULTI - LASZIP_GPS_TIME_MULTI_MINUS) as u32,
                            )?;
                            self.ic_gps_time.compress(
                                encoder,
                                LASZIP_GPS_TIME_MULTI_MINUS
                                    * self.common.last_gps_time_diffs[self.common.last],
                                curr_gps_time_diff_32,
                                6,
                            )?;
                            self.common.multi_extreme_counters[self.common.last] += 1;
                            if self.common.multi_extreme_counters[self.common.last] > 3 {
                                self.common.last_gps_time_diffs[self.common.last] =
                                    curr_gps_time_diff_32;
                                self.common.multi_extreme_counters[self.common.last] = 0;
                            }
                        }
                    } else {
                        encoder.encode_symbol(&mut self.common.gps_time_multi, 0)?;
                        self.ic_gps_time
                            .compress(encoder, 7, curr_gps_time_diff_32, 7)?;
                        self.common.multi_extreme_counters[self.common.last] += 1;
                        if self.common.multi_extreme_counters[self.common.last] > 3 {
                            self.common.last_gps_time_diffs[self.common.last] =
                                curr_gps_time_diff_32;
                            self.common.multi_extreme_counters[self.common.last] = 0;
                        }
                    }
                } else {
                    // the difference is huge
                    // maybe the double belongs to another time sequence
                    let mut found = false;
                    for i in 1..4 {
                        let other_gps_time_diff_64 = this_val.value
                            - self.common.last_gps_times[((self.common.last + i) & 3)].value;
                        let other_gps_time_diff_32 = other_gps_time_diff_64 as i32;

                        if other_gps_time_diff_64 == other_gps_time_diff_32 as i64 {
                            // it belongs to this sequence
                            encoder.encode_symbol(
                                &mut self.common.gps_time_multi,
                                (LASZIP_GPS_TIME_MULTI_CODE_FULL + i as i32) as u32,
                            )?;
                            self.common.last = (self.common.last + i) & 3;
                            found = true;
                            break;
                        }
                    }

                    if found {
                        return self.compress_with(encoder, buf);
                    }

                    // no other sequence found start a new one
                    encoder.encode_symbol(
                        &mut self.common.gps_time_multi,
                        LASZIP_GPS_TIME_MULTI_CODE_FULL as u32,
                    )?;
                    self.ic_gps_time.compress(
                        encoder,
                        (self.common.last_gps_times[self.common.last].value >> 32) as i32,
                        (this_val.value >> 32) as i32,
                        8,
                    )?;

                    encoder.write_int(this_val.value as u32)?;
                    self.common.next = (self.common.next + 1) & 3;
                    self.common.last = self.common.next;
                    self.common.last_gps_time_diffs[self.common.last] = 0;
                    self.common.multi_extreme_counters[self.common.last] = 0;
                }
                self.common.last_gps_times[self.common.last] = this_val;
            }
            Ok(())
        }
    }

    pub struct LasGpsTimeDecompressor {
        common: Common,
        ic_gps_time: IntegerDecompressor,
    }

    impl Default for LasGpsTimeDecompressor {
        fn default() -> Self {
            Self {
                common: Common::new(),
                ic_gps_time: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(9)
                    .build(),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasGpsTimeDecompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            self.ic_gps_time.init();
            src.read_exact(first_point)?;
            self.common.last_gps_times[0] = GpsTime::unpack(first_point);
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let mut multi: i32;

            if self.common.last_gps_time_diffs[self.common.last] == 0 {
                // it the last integer difference was zero
                multi = decoder.decode_symbol(&mut self.common.gps_time_0_diff)? as i32;

                if multi == 1 {
                    // the difference can be represented with 32 bits
                    self.common.last_gps_time_diffs[self.common.last] =
                        self.ic_gps_time.decompress(decoder, 0, 0)?;
                    self.common.last_gps_times[self.common.last].value +=
                        i64::from(self.common.last_gps_time_diffs[self.common.last]);
                    self.common.multi_extreme_counters[self.common.last] = 0;
                } else if multi == 2 {
                    // the difference is huge
                    self.common.next = (self.common.next + 1) & 3;
                    self.common.last_gps_times[self.common.next].value = i64::from(
                        self.ic_gps_time.decompress(
                            decoder,
                            (self.common.last_gps_times[self.common.last].value >> 32) as i32,
                            8,
                        )?,
                    );
                    self.common.last_gps_times[self.common.next].value <<= 32;
                    self.common.last_gps_times[self.common.next].value |=
                        i64::from(decoder.read_int()?);
                    self.common.last = self.common.next;
                    self.common.last_gps_time_diffs[self.common.last] = 0;
                    self.common.multi_extreme_counters[self.common.last] = 0;
                } else if multi > 2 {
                    // we switch to another sequence
                    self.common.last = (self.common.last + multi as usize - 2) & 3;
                    self.decompress_with(decoder, buf)?;
                    return Ok(());
                }
            } else {
                multi = decoder.decode_symbol(&mut self.common.gps_time_multi)? as i32;

                if multi == 1 {
                    self.common.last_gps_times[self.common.last].value += i64::from(
                        self.ic_gps_time.decompress(
                            decoder,
                            self.common.last_gps_time_diffs[self.common.last],
                            1,
                        )?,
                    );
                    self.common.multi_extreme_counters[self.common.last] = 0;
                } else if multi < LASZIP_GPS_TIME_MULTI_UNCHANGED {
                    let gps_time_diff: i32;
                    if multi == 0 {
                        gps_time_diff = self.ic_gps_time.decompress(decoder, 0, 7)?;
                        self.common.multi_extreme_counters[self.common.last] += 1;
                        if self.common.multi_extreme_counters[self.common.last] > 3 {
                            self.common.last_gps_time_diffs[self.common.last] = gps_time_diff;
                            self.common.multi_extreme_counters[self.common.last] = 0;
                        }
                    } else if multi < LASZIP_GPS_TIME_MULTI {
                        let context = if multi < 10 { 2 } else { 3 };
                        gps_time_diff = self.ic_gps_time.decompress(
                            decoder,
                            multi * self.common.last_gps_time_diffs[self.common.last],
                            context,
                        )?;
                    } else if multi == LASZIP_GPS_TIME_MULTI {
                        gps_time_diff = self.ic_gps_time.decompress(
                            decoder,
                            multi * self.common.last_gps_time_diffs[self.common.last],
                            4,
                        )?;
                        self.common.multi_extreme_counters[self.common.last] += 1;
                        if self.common.multi_extreme_counters[self.common.last] > 3 {
                            self.common.last_gps_time_diffs[self.common.last] = gps_time_diff;
                            self.common.multi_extreme_counters[self.common.last] = 0;
                        }
                    } else {
                        multi = LASZIP_GPS_TIME_MULTI - multi;
                        if multi > LASZIP_GPS_TIME_MULTI_MINUS {
                            gps_time_diff = self.ic_gps_time.decompress(
                                decoder,
                                multi * self.common.last_gps_time_diffs[self.common.last],
                                5,
                            )?;
                        } else {
                            gps_time_diff = self.ic_gps_time.decompress(
                                decoder,
                                LASZIP_GPS_TIME_MULTI_MINUS
                                    * self.common.last_gps_time_diffs[self.common.last],
                                6,
                            )?;
                            self.common.multi_extreme_counters[self.common.last] += 1;
                            if self.common.multi_extreme_counters[self.common.last] > 3 {
                                self.common.last_gps_time_diffs[self.common.last] = gps_time_diff;
                                self.common.multi_extreme_counters[self.common.last] = 0;
                            }
                        }
                    }
                    self.common.last_gps_times[self.common.last].value += i64::from(gps_time_diff);
                } else if multi == LASZIP_GPS_TIME_MULTI_CODE_FULL {
                    self.common.next = (self.common.next + 1) & 3;
                    self.common.last_gps_times[self.common.next].value = i64::from(
                        self.ic_gps_time.decompress(
                            decoder,
                            (self.common.last_gps_times[self.common.last].value >> 32) as i32,
                            8,
                        )?,
                    );
                    self.common.last_gps_times[self.common.next].value <<= 32;
                    self.common.last_gps_times[self.common.next].value |=
                        i64::from(decoder.read_int()?);
                    self.common.last = self.common.next;
                    self.common.last_gps_time_diffs[self.common.last] = 0;
                    self.common.multi_extreme_counters[self.common.last] = 0;
                } else if multi > LASZIP_GPS_TIME_MULTI_CODE_FULL {
                    self.common.last = (self.common.last + multi as usize
                        - LASZIP_GPS_TIME_MULTI_CODE_FULL as usize)
                        & 3;
                    self.decompress_with(decoder, buf)?;
                    return Ok(());
                }
            }
            GpsTime::pack(self.common.last_gps_times[self.common.last], buf);
            Ok(())
        }
    }
}
