use chart_overlay::core::{Point, ViewportBounds};
use chart_overlay::culling::{CullingOptions, CullingState, ExtendOptions, SinglePointOrientation, culling_state};
use proptest::prelude::*;

fn bounds() -> ViewportBounds {
    ViewportBounds::new(1_000.0, 2_000.0, 100.0, 110.0)
}

fn any_point() -> impl Strategy<Value = Point> {
    (-5_000.0f64..8_000.0, -500.0f64..700.0).prop_map(|(timestamp, price)| Point::new(timestamp, price))
}

fn inside_point() -> impl Strategy<Value = Point> {
    (1_000.0f64..=2_000.0, 100.0f64..=110.0).prop_map(|(timestamp, price)| Point::new(timestamp, price))
}

proptest! {
    #[test]
    fn any_shape_with_a_point_inside_is_visible(
        inside in inside_point(),
        others in prop::collection::vec(any_point(), 0..4)
    ) {
        let mut points = vec![inside];
        points.extend(others);
        prop_assert_eq!(culling_state(&points, bounds(), &CullingOptions::default()), CullingState::Visible);
    }

    #[test]
    fn two_point_culling_ignores_draw_order(
        first in any_point(),
        second in any_point(),
        left in any::<bool>(),
        right in any::<bool>()
    ) {
        let options = CullingOptions::default().with_extend(ExtendOptions::new(left, right));
        prop_assert_eq!(
            culling_state(&[first, second], bounds(), &options),
            culling_state(&[second, first], bounds(), &options)
        );
    }

    #[test]
    fn extending_never_hides_a_segment_with_an_endpoint_inside(
        inside in inside_point(),
        other in any_point(),
        left in any::<bool>(),
        right in any::<bool>()
    ) {
        let extended = CullingOptions::default().with_extend(ExtendOptions::new(left, right));
        prop_assert_eq!(culling_state(&[inside, other], bounds(), &extended), CullingState::Visible);
        prop_assert_eq!(culling_state(&[other, inside], bounds(), &extended), CullingState::Visible);
    }

    #[test]
    fn full_horizontal_line_visibility_depends_only_on_price(point in any_point()) {
        let options = CullingOptions::default().with_single_point(SinglePointOrientation::horizontal(true, true));
        let state = culling_state(&[point], bounds(), &options);
        prop_assert_eq!(state.is_visible(), (100.0..=110.0).contains(&point.price));
    }

    #[test]
    fn off_screen_point_reports_price_direction_before_time(point in any_point()) {
        let state = culling_state(&[point], bounds(), &CullingOptions::default());
        if point.price > 110.0 {
            prop_assert_eq!(state, CullingState::OffScreenTop);
        } else if point.price < 100.0 {
            prop_assert_eq!(state, CullingState::OffScreenBottom);
        }
    }
}
