//! Sticky header offset.
//!
//! Publishes the measured height of the sticky dashboard header as a CSS
//! custom property so panels can offset their own sticky content. Unlike the
//! tab controller this helper has an explicit teardown.

pub const STICKY_OFFSET_PROPERTY: &str = "--dashboard-sticky-offset";

pub trait StickyOffsetHost {
    /// Current header height in CSS pixels, if the header exists.
    fn header_height(&self) -> Option<f64>;
    fn set_property(&self, name: &str, value: &str);
    fn remove_property(&self, name: &str);
}

/// Whole-pixel offset for a measured height. Missing, negative or
/// non-finite heights map to zero.
pub fn offset_px(height: Option<f64>) -> u32 {
    match height {
        Some(height) if height.is_finite() && height > 0.0 => {
            height.ceil().min(f64::from(u32::MAX)) as u32
        }
        _ => 0,
    }
}

#[derive(Debug)]
pub struct StickyOffset<H: StickyOffsetHost> {
    host: H,
    property: String,
    applied_px: Option<u32>,
}

impl<H: StickyOffsetHost> StickyOffset<H> {
    /// Measure and publish immediately.
    pub fn install(host: H, property: impl Into<String>) -> Self {
        let mut offset = Self {
            host,
            property: property.into(),
            applied_px: None,
        };
        offset.refresh();
        offset
    }

    /// Re-measure; writes only when the pixel value changed.
    pub fn refresh(&mut self) -> u32 {
        let px = offset_px(self.host.header_height());
        if self.applied_px != Some(px) {
            self.host.set_property(&self.property, &format!("{px}px"));
            self.applied_px = Some(px);
        }
        px
    }

    pub fn applied_px(&self) -> Option<u32> {
        self.applied_px
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    /// Remove the property and hand the host back for listener teardown.
    pub fn cleanup(self) -> H {
        self.host.remove_property(&self.property);
        tracing::debug!(property = %self.property, "sticky offset removed");
        self.host
    }
}
