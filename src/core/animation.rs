//! Streams rendered frames into an animated GIF file.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, ImageResult, RgbaImage,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AnimationParams {
    pub frames_per_second: u32,
    // [1, 30]: 1 = best color quantization, 30 = fastest encoding.
    pub encoder_speed: i32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        AnimationParams {
            frames_per_second: 60,
            encoder_speed: 10,
        }
    }
}

/// Encodes every frame into a looping GIF at `path`.
/// @return: the number of frames written.
pub fn write_gif_animation<I>(
    path: PathBuf,
    params: &AnimationParams,
    frames: I,
) -> ImageResult<u32>
where
    I: IntoIterator<Item = RgbaImage>,
{
    more_asserts::assert_gt!(params.frames_per_second, 0);
    let delay = Delay::from_numer_denom_ms(1000, params.frames_per_second);
    let mut file = BufWriter::new(File::create(&path)?);
    let mut frame_count = 0;
    {
        // The encoder writes the GIF trailer when dropped, so it only borrows the file.
        let mut encoder =
            GifEncoder::new_with_speed(&mut file, params.encoder_speed.clamp(1, 30));
        encoder.set_repeat(Repeat::Infinite)?;
        for image in frames {
            encoder.encode_frame(Frame::from_parts(image, 0, 0, delay))?;
            frame_count += 1;
        }
    }
    file.flush()?;
    println!(
        "INFO:  Wrote animation with {} frames to: {}",
        frame_count,
        path.display()
    );
    Ok(frame_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{codecs::gif::GifDecoder, AnimationDecoder, Rgba};
    use std::{fs, io::BufReader};

    fn solid_frames(count: u8) -> impl Iterator<Item = RgbaImage> {
        (0..count).map(|i| RgbaImage::from_pixel(8, 8, Rgba([20 * i, 0, 255 - 20 * i, 255])))
    }

    #[test]
    fn test_gif_holds_every_frame() {
        let directory: PathBuf = ["out", "unit_tests", "animation"].iter().collect();
        fs::create_dir_all(&directory).unwrap();
        let path = directory.join("solid_frames.gif");

        let frame_count =
            write_gif_animation(path.clone(), &AnimationParams::default(), solid_frames(5))
                .unwrap();
        assert_eq!(frame_count, 5);

        let decoder = GifDecoder::new(BufReader::new(fs::File::open(&path).unwrap())).unwrap();
        assert_eq!(decoder.into_frames().count(), 5);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_full_disk_is_reported() {
        let result = write_gif_animation(
            PathBuf::from("/dev/full"),
            &AnimationParams::default(),
            solid_frames(3),
        );
        assert!(result.is_err());
    }
}
