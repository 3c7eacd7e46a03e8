//! Image-driven relief fields
//!
//! Converts a 2D raster into a bounded 3D field: the raster intensity is
//! height-mapped over the placement footprint and the field measures the
//! vertical distance to that height surface, minus a base thickness.
//! Decoding is the caller's problem; the field only needs an opaque
//! [`Raster`] with dimensions and a per-pixel intensity.

use std::path::Path;

use glam::Vec3;
use image::{ImageBuffer, Luma};

use super::{Aabb, Field};
use crate::error::{Error, Result};

/// Decode an image file into a grayscale raster usable as a relief source
pub fn open_raster(path: impl AsRef<Path>) -> Result<image::GrayImage> {
    let img = image::open(path)?;
    Ok(img.to_luma8())
}

/// Opaque raster source: dimensions plus normalized intensity lookup
pub trait Raster: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Intensity in `[0, 1]` at pixel `(x, y)`
    fn intensity(&self, x: u32, y: u32) -> f32;
}

impl Raster for image::GrayImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn intensity(&self, x: u32, y: u32) -> f32 {
        f32::from(self.get_pixel(x, y).0[0]) / 255.0
    }
}

/// Relief field built from a raster height map.
///
/// The raster is projected over the XY footprint of `placement`; heights
/// grow from the placement floor along +Z. The field value is
/// `|z_local - height(x, y)| - base_thickness`, so the solid is a sheet
/// of the given thickness following the height surface. Queries outside
/// the footprint see the flat base.
pub struct ImageRelief {
    heights: ImageBuffer<Luma<f32>, Vec<f32>>,
    placement: Aabb,
    black_displacement: f32,
    white_displacement: f32,
    base_thickness: f32,
    base_threshold: f32,
    tile_x: u32,
    tile_y: u32,
}

impl ImageRelief {
    /// Build a relief over `placement` with heights in `[0, depth]`.
    ///
    /// The raster intensities are copied into an internal buffer once;
    /// later sampling never touches the source raster again.
    pub fn new(raster: &dyn Raster, placement: Aabb, depth: f32) -> Result<Self> {
        if !placement.is_finite() || placement.is_empty() {
            return Err(Error::InvalidParameter(
                "relief placement must be a finite, non-empty box".into(),
            ));
        }
        if !depth.is_finite() || depth < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "relief depth must be >= 0, got {depth}"
            )));
        }
        let (w, h) = (raster.width(), raster.height());
        if w == 0 || h == 0 {
            return Err(Error::InvalidParameter("relief raster is empty".into()));
        }
        let heights = ImageBuffer::from_fn(w, h, |x, y| Luma([raster.intensity(x, y)]));
        Ok(Self {
            heights,
            placement,
            black_displacement: 0.0,
            white_displacement: depth,
            base_thickness: 0.0,
            base_threshold: 0.0,
            tile_x: 1,
            tile_y: 1,
        })
    }

    /// Pre-filter the sampled intensities with a Gaussian blur of the
    /// given width (in world units). Applied once, up front.
    pub fn with_blur(mut self, blur_width: f32) -> Result<Self> {
        if !blur_width.is_finite() || blur_width < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "blur width must be >= 0, got {blur_width}"
            )));
        }
        if blur_width > 0.0 {
            let pixel_size =
                self.placement.size().x / (self.heights.width() * self.tile_x) as f32;
            let sigma = blur_width / pixel_size;
            self.heights = image::imageops::blur(&self.heights, sigma);
        }
        Ok(self)
    }

    /// Solid half-thickness around the height surface
    pub fn with_base_thickness(mut self, thickness: f32) -> Result<Self> {
        if !thickness.is_finite() || thickness < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "base thickness must be >= 0, got {thickness}"
            )));
        }
        self.base_thickness = thickness;
        Ok(self)
    }

    /// Intensities below the cutoff collapse to the flat base
    pub fn with_base_threshold(mut self, threshold: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidParameter(format!(
                "base threshold must be in [0, 1], got {threshold}"
            )));
        }
        self.base_threshold = threshold;
        Ok(self)
    }

    /// Map black/white intensity to explicit displacements instead of
    /// the `[0, depth]` height range
    pub fn with_displacement(mut self, black: f32, white: f32) -> Result<Self> {
        if !black.is_finite() || !white.is_finite() {
            return Err(Error::InvalidParameter(
                "displacements must be finite".into(),
            ));
        }
        self.black_displacement = black;
        self.white_displacement = white;
        Ok(self)
    }

    /// Repeat the raster `nx` by `ny` times across the footprint
    pub fn with_tiling(mut self, nx: u32, ny: u32) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(Error::InvalidParameter(
                "tile counts must be at least 1".into(),
            ));
        }
        self.tile_x = nx;
        self.tile_y = ny;
        Ok(self)
    }

    /// Bilinear lookup at continuous pixel coordinates; wraps when tiled,
    /// clamps at the border otherwise
    fn sample(&self, u: f32, v: f32) -> f32 {
        let (w, h) = (self.heights.width() as i64, self.heights.height() as i64);
        let fu = u - 0.5;
        let fv = v - 0.5;
        let x0 = fu.floor();
        let y0 = fv.floor();
        let tx = fu - x0;
        let ty = fv - y0;

        let pick = |x: i64, y: i64| -> f32 {
            let (x, y) = if self.tile_x > 1 || self.tile_y > 1 {
                (x.rem_euclid(w), y.rem_euclid(h))
            } else {
                (x.clamp(0, w - 1), y.clamp(0, h - 1))
            };
            self.heights.get_pixel(x as u32, y as u32).0[0]
        };

        let (x0, y0) = (x0 as i64, y0 as i64);
        let v00 = pick(x0, y0);
        let v10 = pick(x0 + 1, y0);
        let v01 = pick(x0, y0 + 1);
        let v11 = pick(x0 + 1, y0 + 1);
        let top = v00 + (v10 - v00) * tx;
        let bot = v01 + (v11 - v01) * tx;
        top + (bot - top) * ty
    }

    /// Height of the relief surface over footprint-local (x, y), or the
    /// flat base outside the footprint
    fn height_at(&self, local_x: f32, local_y: f32) -> f32 {
        let size = self.placement.size();
        if local_x < 0.0 || local_x > size.x || local_y < 0.0 || local_y > size.y {
            return self.black_displacement;
        }
        let u = local_x / size.x * (self.heights.width() * self.tile_x) as f32;
        let v = local_y / size.y * (self.heights.height() * self.tile_y) as f32;
        let intensity = self.sample(u, v);
        if intensity < self.base_threshold {
            return self.black_displacement;
        }
        self.black_displacement
            + (self.white_displacement - self.black_displacement) * intensity
    }
}

impl Field for ImageRelief {
    fn evaluate(&self, p: Vec3) -> f32 {
        let local = p - self.placement.min;
        let h = self.height_at(local.x, local.y);
        (local.z - h).abs() - self.base_thickness
    }

    fn bounds(&self) -> Aabb {
        let lo = self.black_displacement.min(self.white_displacement).min(0.0);
        let hi = self.black_displacement.max(self.white_displacement).max(0.0);
        Aabb::new(
            Vec3::new(
                self.placement.min.x,
                self.placement.min.y,
                self.placement.min.z + lo - self.base_thickness,
            ),
            Vec3::new(
                self.placement.max.x,
                self.placement.max.y,
                self.placement.min.z + hi + self.base_thickness,
            ),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 2x2 checker: white in the (0,0) and (1,1) pixels
    fn checker() -> image::GrayImage {
        image::GrayImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        })
    }

    fn flat_white(w: u32, h: u32) -> image::GrayImage {
        image::GrayImage::from_pixel(w, h, image::Luma([255]))
    }

    fn placement() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::new(4.0, 4.0, 2.0))
    }

    #[test]
    fn white_pixel_center_reaches_full_depth() {
        let relief = ImageRelief::new(&flat_white(2, 2), placement(), 1.0)
            .unwrap()
            .with_base_thickness(0.1)
            .unwrap();
        // Surface sits at z = 1.0 everywhere inside the footprint
        assert_relative_eq!(relief.evaluate(Vec3::new(1.0, 1.0, 1.0)), -0.1);
        assert_relative_eq!(relief.evaluate(Vec3::new(1.0, 1.0, 1.6)), 0.5);
    }

    #[test]
    fn checker_heights_follow_intensity() {
        let relief = ImageRelief::new(&checker(), placement(), 1.0).unwrap();
        // Center of pixel (0,0): white, height 1. Center of pixel (1,0): black.
        let white_center = Vec3::new(1.0, 1.0, 0.0);
        let black_center = Vec3::new(3.0, 1.0, 0.0);
        assert_relative_eq!(relief.evaluate(white_center), 1.0);
        assert_relative_eq!(relief.evaluate(black_center), 0.0);
    }

    #[test]
    fn outside_footprint_sees_flat_base() {
        let relief = ImageRelief::new(&flat_white(2, 2), placement(), 1.0)
            .unwrap()
            .with_base_thickness(0.25)
            .unwrap();
        // Beyond the footprint the surface is the base plane z = 0
        assert_relative_eq!(relief.evaluate(Vec3::new(10.0, 1.0, 0.0)), -0.25);
        assert_relative_eq!(relief.evaluate(Vec3::new(10.0, 1.0, 1.0)), 0.75);
    }

    #[test]
    fn threshold_flattens_dark_pixels() {
        let mid = image::GrayImage::from_pixel(2, 2, image::Luma([64]));
        let kept = ImageRelief::new(&mid, placement(), 1.0).unwrap();
        let cut = ImageRelief::new(&mid, placement(), 1.0)
            .unwrap()
            .with_base_threshold(0.5)
            .unwrap();
        let p = Vec3::new(1.0, 1.0, 0.0);
        assert_relative_eq!(kept.evaluate(p), 64.0 / 255.0, epsilon = 1e-5);
        assert_relative_eq!(cut.evaluate(p), 0.0);
    }

    #[test]
    fn tiling_wraps_the_sampling_coordinate() {
        let relief = ImageRelief::new(&checker(), placement(), 1.0)
            .unwrap()
            .with_tiling(2, 2)
            .unwrap();
        // With 2x2 tiling each tile covers a 2x2 world patch; the same
        // relative position in adjacent tiles sees the same height
        let a = relief.evaluate(Vec3::new(0.5, 0.5, 0.0));
        let b = relief.evaluate(Vec3::new(2.5, 0.5, 0.0));
        assert_relative_eq!(a, b, epsilon = 1e-5);
    }

    #[test]
    fn displacement_mapping_overrides_depth_range() {
        let relief = ImageRelief::new(&flat_white(2, 2), placement(), 1.0)
            .unwrap()
            .with_displacement(0.2, 0.8)
            .unwrap();
        assert_relative_eq!(relief.evaluate(Vec3::new(1.0, 1.0, 0.8)), 0.0);
    }

    #[test]
    fn blur_keeps_uniform_images_uniform() {
        let relief = ImageRelief::new(&flat_white(8, 8), placement(), 1.0)
            .unwrap()
            .with_blur(0.5)
            .unwrap();
        assert_relative_eq!(relief.evaluate(Vec3::new(2.0, 2.0, 1.0)), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn blur_softens_a_step_edge() {
        // Left half black, right half white
        let img = image::GrayImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        });
        let sharp = ImageRelief::new(&img, placement(), 1.0).unwrap();
        let soft = ImageRelief::new(&img, placement(), 1.0)
            .unwrap()
            .with_blur(0.5)
            .unwrap();
        // Just left of the edge the blurred height rises above the sharp one
        let p = Vec3::new(1.8, 2.0, 0.0);
        assert!(soft.evaluate(p) > sharp.evaluate(p));
    }

    #[test]
    fn bounds_cover_base_and_peak() {
        let relief = ImageRelief::new(&flat_white(2, 2), placement(), 1.0)
            .unwrap()
            .with_base_thickness(0.25)
            .unwrap();
        let b = relief.bounds();
        assert_relative_eq!(b.min.z, -0.25);
        assert_relative_eq!(b.max.z, 1.25);
        assert!(b.is_finite());
    }

    #[test]
    fn invalid_construction_is_rejected() {
        let img = flat_white(2, 2);
        assert!(ImageRelief::new(&img, Aabb::INFINITE, 1.0).is_err());
        assert!(ImageRelief::new(&img, placement(), -1.0).is_err());
        assert!(
            ImageRelief::new(&img, placement(), 1.0)
                .unwrap()
                .with_base_threshold(1.5)
                .is_err()
        );
        assert!(
            ImageRelief::new(&img, placement(), 1.0)
                .unwrap()
                .with_tiling(0, 1)
                .is_err()
        );
    }
}
