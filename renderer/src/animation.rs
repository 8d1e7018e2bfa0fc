use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame};
use warp_simulation::{BubbleAnimation, FRAME_INTERVAL_MS};

use crate::export::{write_atomically, ExportError};
use crate::plots::{render_animation_frame, RenderOptions};

/// Quantiser speed handed to the GIF encoder (1 is slowest, 30 fastest).
const GIF_SPEED: i32 = 10;

/// Encode every frame into a looping GIF, one frame in memory at a time.
pub fn write_gif(
    animation: &BubbleAnimation,
    options: &RenderOptions,
    destination: &Path,
) -> Result<(), ExportError> {
    write_atomically(destination, |writer| {
        let mut encoder = GifEncoder::new_with_speed(writer, GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        for frame in animation.frames() {
            let image = render_animation_frame(&frame, options).map_err(ExportError::Render)?;
            let rgba = DynamicImage::ImageRgb8(image).into_rgba8();
            let delay = Delay::from_numer_denom_ms(FRAME_INTERVAL_MS, 1);
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        }
        Ok(())
    })?;
    log::info!(
        "wrote {} frame animation to {}",
        animation.frame_count(),
        destination.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;
    use warp_simulation::DriveParameters;

    #[test]
    fn test_gif_holds_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bubble.gif");
        let animation = BubbleAnimation::new(&DriveParameters::default()).unwrap();
        let options = RenderOptions {
            width: 48,
            height: 32,
            ..RenderOptions::bare()
        };
        write_gif(&animation, &options, &path).unwrap();

        let file = std::io::BufReader::new(std::fs::File::open(&path).unwrap());
        let frames = GifDecoder::new(file).unwrap().into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 100);
        assert_eq!(frames[0].delay().numer_denom_ms(), (50, 1));
        assert_eq!(frames[0].buffer().dimensions(), (48, 32));
    }
}
