//! Scoped figure handles and the registry that counts them.

use crate::error::PlotError;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Counts figures that are currently open. Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct FigureRegistry {
    open: Arc<AtomicUsize>,
}

impl FigureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_figures(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Open a blank `width` x `height` RGB figure.
    pub fn acquire(&self, width: u32, height: u32) -> Figure {
        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(width, height, open, "figure acquired");
        Figure {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
            registry: self.clone(),
        }
    }
}

/// An in-memory RGB canvas. Dropping it releases its registry slot.
pub struct Figure {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    registry: FigureRegistry,
}

impl Figure {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draw onto a white background.
    pub fn draw<F>(&mut self, f: F) -> Result<(), PlotError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), PlotError>,
    {
        let root = BitMapBackend::with_buffer(&mut self.pixels, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        f(&root)?;
        root.present()?;
        Ok(())
    }

    /// Encode the canvas as PNG and close the figure.
    pub fn into_png(self) -> Result<Vec<u8>, PlotError> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(&self.pixels, self.width, self.height, ExtendedColorType::Rgb8)?;
        Ok(png)
    }
}

impl Drop for Figure {
    fn drop(&mut self) {
        let open = self.registry.open.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!(open, "figure released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_figures_are_counted_until_dropped() {
        let registry = FigureRegistry::new();
        let shared = registry.clone();

        let a = registry.acquire(10, 10);
        let b = shared.acquire(20, 10);
        assert_eq!(registry.open_figures(), 2);
        assert_eq!(b.size(), (20, 10));

        drop(a);
        assert_eq!(shared.open_figures(), 1);
        drop(b);
        assert_eq!(registry.open_figures(), 0);
    }

    #[test]
    fn test_failed_draw_still_releases() {
        let registry = FigureRegistry::new();
        {
            let mut figure = registry.acquire(10, 10);
            let result = figure.draw(|_| Err(PlotError::Empty("test")));
            assert!(matches!(result, Err(PlotError::Empty("test"))));
        }
        assert_eq!(registry.open_figures(), 0);
    }

    #[test]
    fn test_into_png() {
        let registry = FigureRegistry::new();
        let mut figure = registry.acquire(8, 4);
        figure
            .draw(|root| {
                root.fill(&RED)?;
                Ok(())
            })
            .unwrap();

        let png = figure.into_png().unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
        assert_eq!(registry.open_figures(), 0);
    }
}
