pub mod coordinates;
pub mod geometry;
pub mod interpolation;
pub mod primitives;
pub mod scale;
pub mod types;

pub use coordinates::CoordinateConverter;
pub use geometry::{
    BoxBounds, ClippedLine, Line, Segment, clip_polygon, distance_to_polyline, extend_and_clip,
    intersect_line_and_box, intersect_ray_and_box, intersect_segment_and_box, intersect_segments,
    point_in_polygon,
};
pub use interpolation::{LogicalTimeInterpolation, logical_index_from_time, time_from_logical_index};
pub use scale::LinearScale;
pub use types::{Point, ScreenPoint, Viewport, ViewportBounds};
