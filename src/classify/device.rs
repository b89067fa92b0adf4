use serde::{Deserialize, Serialize};

/// Viewports narrower than this are phones.
pub const TABLET_MIN_WIDTH: u32 = 768;
/// Viewports at least this wide are desktops.
pub const DESKTOP_MIN_WIDTH: u32 = 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
        }
    }

    pub fn from_width(width: u32) -> Self {
        if width < TABLET_MIN_WIDTH {
            DeviceType::Mobile
        } else if width < DESKTOP_MIN_WIDTH {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        }
    }

    /// Classifies a raw viewport measurement as reported by the host, after
    /// the same pixel conversion [`viewport_px`] applies to the stored width.
    pub fn from_viewport(width: f64) -> Self {
        Self::from_width(viewport_px(width))
    }
}

/// Converts a host-reported viewport width to whole pixels. NaN and
/// negative widths become 0; `+inf` saturates.
pub fn viewport_px(width: f64) -> u32 {
    if width.is_nan() || width <= 0.0 {
        return 0;
    }
    width.min(u32::MAX as f64).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(DeviceType::from_width(767), DeviceType::Mobile);
        assert_eq!(DeviceType::from_width(768), DeviceType::Tablet);
        assert_eq!(DeviceType::from_width(1023), DeviceType::Tablet);
        assert_eq!(DeviceType::from_width(1024), DeviceType::Desktop);
    }

    #[test]
    fn every_width_maps_to_one_label() {
        for width in 0..=100_000u32 {
            let expected = if width < 768 {
                DeviceType::Mobile
            } else if width < 1024 {
                DeviceType::Tablet
            } else {
                DeviceType::Desktop
            };
            assert_eq!(DeviceType::from_width(width), expected, "width {width}");
        }
    }

    #[test]
    fn degenerate_viewports() {
        assert_eq!(DeviceType::from_viewport(f64::NAN), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport(f64::NEG_INFINITY), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport(f64::INFINITY), DeviceType::Desktop);
        assert_eq!(viewport_px(f64::INFINITY), u32::MAX);
        assert_eq!(DeviceType::from_viewport(-20.0), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport(767.9), DeviceType::Mobile);
        assert_eq!(viewport_px(1440.0), 1440);
        assert_eq!(viewport_px(f64::NAN), 0);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&DeviceType::Tablet).unwrap();
        assert_eq!(json, "\"tablet\"");
    }
}
