use crate::foundation::core::Point;
use smallvec::SmallVec;

/// Stroke phase carried by every sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// First sample of a stroke.
    Begin,
    /// Intermediate sample.
    Update,
    /// Last sample of a stroke.
    End,
}

/// Physical kind of pointing device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Mouse or trackpad.
    Mouse,
    /// Pen / stylus.
    Stylus,
    /// Finger on a touch screen.
    Touch,
}

impl DeviceClass {
    /// Short label used in logs and stroke provenance.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Stylus => "pen",
            Self::Touch => "touch",
        }
    }
}

/// Opaque identity of one pointing device, compared by value.
///
/// Tokens never reference the host's device objects, so a token outliving its device is harmless.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DeviceToken {
    /// Device kind.
    pub class: DeviceClass,
    /// Host-assigned identifier, unique per class.
    pub id: u64,
}

impl DeviceToken {
    /// The system mouse.
    pub const MOUSE: Self = Self {
        class: DeviceClass::Mouse,
        id: 0,
    };

    /// Stylus instance `id`.
    pub fn stylus(id: u64) -> Self {
        Self {
            class: DeviceClass::Stylus,
            id,
        }
    }

    /// Touch contact `id`.
    pub fn touch(id: u64) -> Self {
        Self {
            class: DeviceClass::Touch,
            id,
        }
    }
}

/// One pointer sample fed to the geometry pipeline. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputSample {
    /// Position in device pixels.
    pub position: Point,
    /// Stroke phase.
    pub phase: Phase,
    /// Monotonic timestamp in microseconds.
    pub timestamp_us: i64,
    /// Normalized pressure in `[0,1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<f32>,
    /// Pen altitude angle in radians (`PI/2` is perpendicular to the surface).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f32>,
    /// Pen azimuth angle in radians, `[0, 2*PI)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f32>,
}

impl InputSample {
    /// Sample without pressure or tilt.
    pub fn new(x: f64, y: f64, phase: Phase, timestamp_us: i64) -> Self {
        Self {
            position: Point::new(x, y),
            phase,
            timestamp_us,
            force: None,
            altitude: None,
            azimuth: None,
        }
    }
}

/// One OS-level point inside a pointer event batch.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RawPoint {
    /// X in device pixels.
    pub x: f64,
    /// Y in device pixels.
    pub y: f64,
    /// Normalized pressure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<f32>,
    /// Raw tilt along X, in the device's own units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_x: Option<i32>,
    /// Raw tilt along Y, in the device's own units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_y: Option<i32>,
}

impl RawPoint {
    /// Point with position only.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// Inclusive raw range reported for one stylus axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AxisRange {
    /// Smallest raw value.
    pub min: i32,
    /// Largest raw value.
    pub max: i32,
}

/// Capabilities a stylus reports when a stroke begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct StylusDescription {
    /// Raw tilt-X range, when the stylus reports tilt.
    #[serde(default)]
    pub tilt_x: Option<AxisRange>,
    /// Raw tilt-Y range, when the stylus reports tilt.
    #[serde(default)]
    pub tilt_y: Option<AxisRange>,
}

const TARGET_TILT_MIN: f32 = -90.0;
const TARGET_TILT_MAX: f32 = 90.0;

/// Maps raw tilt values into degrees in `[-90, 90]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TiltMapper {
    min_x: i64,
    min_y: i64,
    scale_x: f64,
    scale_y: f64,
}

impl TiltMapper {
    /// `None` unless both tilt axes are described with a non-empty range.
    pub(crate) fn from_description(desc: &StylusDescription) -> Option<Self> {
        let (x, y) = (desc.tilt_x?, desc.tilt_y?);
        if x.max <= x.min || y.max <= y.min {
            return None;
        }
        let span = f64::from(TARGET_TILT_MAX - TARGET_TILT_MIN);
        Some(Self {
            min_x: i64::from(x.min),
            min_y: i64::from(y.min),
            scale_x: span / (i64::from(x.max) - i64::from(x.min)) as f64,
            scale_y: span / (i64::from(y.max) - i64::from(y.min)) as f64,
        })
    }

    pub(crate) fn degrees(&self, tilt_x: i32, tilt_y: i32) -> (f32, f32) {
        let map = |raw: i32, min: i64, scale: f64| {
            (f64::from(TARGET_TILT_MIN) + (i64::from(raw) - min) as f64 * scale) as f32
        };
        (
            map(tilt_x, self.min_x, self.scale_x),
            map(tilt_y, self.min_y, self.scale_y),
        )
    }
}

/// Convert tilt angles (degrees) into `(altitude, azimuth)` radians.
pub fn altitude_azimuth_from_tilt(tilt_x_deg: f32, tilt_y_deg: f32) -> (f32, f32) {
    let tx = tilt_x_deg.to_radians().tan();
    let ty = tilt_y_deg.to_radians().tan();
    let planar = (tx * tx + ty * ty).sqrt();
    if planar <= f32::EPSILON {
        return (std::f32::consts::FRAC_PI_2, 0.0);
    }
    let altitude = (1.0 / planar).atan();
    let mut azimuth = ty.atan2(tx);
    if azimuth < 0.0 {
        azimuth += std::f32::consts::TAU;
    }
    (altitude, azimuth)
}

/// A host pointer event: one device, one phase, one or more raw points.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointerEvent {
    /// Originating device.
    pub device: DeviceToken,
    /// Phase of the event.
    pub phase: Phase,
    /// Event time in microseconds.
    pub timestamp_us: i64,
    /// Points delivered with the event, oldest first.
    pub points: SmallVec<[RawPoint; 4]>,
    /// Stylus capabilities, meaningful on `Begin`.
    #[serde(default)]
    pub stylus: Option<StylusDescription>,
    /// Mouse event synthesized by the host from stylus or touch input.
    #[serde(default)]
    pub synthetic: bool,
}

impl PointerEvent {
    /// Event carrying `points`, oldest first.
    pub fn batch(
        device: DeviceToken,
        phase: Phase,
        timestamp_us: i64,
        points: impl IntoIterator<Item = RawPoint>,
    ) -> Self {
        Self {
            device,
            phase,
            timestamp_us,
            points: points.into_iter().collect(),
            stylus: None,
            synthetic: false,
        }
    }

    /// Event carrying a single point.
    pub fn single(device: DeviceToken, phase: Phase, timestamp_us: i64, point: RawPoint) -> Self {
        let mut points = SmallVec::new();
        points.push(point);
        Self {
            device,
            phase,
            timestamp_us,
            points,
            stylus: None,
            synthetic: false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/sample.rs"]
mod tests;
